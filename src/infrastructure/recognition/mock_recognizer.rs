use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::{
    LoadError, Recognizer, RecognizerError, RecognizerLoader,
};
use crate::domain::{CanonicalAudio, Transcript};

/// Deterministic stand-in backend for tests and offline runs.
pub struct MockRecognizer {
    pub text: String,
    pub language: String,
    pub confidence: f32,
}

impl Default for MockRecognizer {
    fn default() -> Self {
        Self {
            text: "mock transcript".to_string(),
            language: "he".to_string(),
            confidence: 0.92,
        }
    }
}

#[async_trait]
impl Recognizer for MockRecognizer {
    async fn recognize(&self, audio: &CanonicalAudio) -> Result<Transcript, RecognizerError> {
        if audio.is_empty() {
            return Err(RecognizerError::RecognitionFailed(
                "no audio samples".to_string(),
            ));
        }
        Ok(Transcript::new(
            self.text.clone(),
            self.language.clone(),
            self.confidence,
        ))
    }
}

/// Loader with an observable load count and controllable behavior, for
/// exercising the cache's single-flight and TTL semantics.
pub struct MockRecognizerLoader {
    load_count: AtomicUsize,
    load_delay: Duration,
    fail: bool,
}

impl MockRecognizerLoader {
    pub fn new() -> Self {
        Self {
            load_count: AtomicUsize::new(0),
            load_delay: Duration::ZERO,
            fail: false,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn load_count(&self) -> usize {
        self.load_count.load(Ordering::SeqCst)
    }
}

impl Default for MockRecognizerLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecognizerLoader for MockRecognizerLoader {
    async fn load(&self) -> Result<Arc<dyn Recognizer>, LoadError> {
        self.load_count.fetch_add(1, Ordering::SeqCst);
        if !self.load_delay.is_zero() {
            tokio::time::sleep(self.load_delay).await;
        }
        if self.fail {
            return Err(LoadError("mock load failure".to_string()));
        }
        Ok(Arc::new(MockRecognizer::default()) as Arc<dyn Recognizer>)
    }
}
