use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::{CanonicalAudio, Transcript};

/// A loaded speech-recognition backend. Effectively immutable once
/// constructed; shared read-only across concurrent requests.
#[async_trait]
pub trait Recognizer: Send + Sync {
    async fn recognize(&self, audio: &CanonicalAudio) -> Result<Transcript, RecognizerError>;
}

/// Performs the slow, one-off construction of a [`Recognizer`].
///
/// Invoked by the model cache, at most once per flight.
#[async_trait]
pub trait RecognizerLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn Recognizer>, LoadError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RecognizerError {
    #[error("recognition failed: {0}")]
    RecognitionFailed(String),
}

/// Clone so a single flight's failure can be handed to every waiter.
#[derive(Debug, Clone, thiserror::Error)]
#[error("model loading failed: {0}")]
pub struct LoadError(pub String);
