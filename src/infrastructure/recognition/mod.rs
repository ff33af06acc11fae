mod candle_whisper;
mod mock_recognizer;

use std::sync::Arc;

pub use candle_whisper::{CandleWhisperLoader, CandleWhisperRecognizer};
pub use mock_recognizer::{MockRecognizer, MockRecognizerLoader};

use crate::application::ports::RecognizerLoader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecognizerProvider {
    Local,
    Mock,
}

pub fn create_loader(
    provider: RecognizerProvider,
    model_id: &str,
    language: &str,
) -> Arc<dyn RecognizerLoader> {
    match provider {
        RecognizerProvider::Local => Arc::new(CandleWhisperLoader::new(
            model_id.to_string(),
            language.to_string(),
        )),
        RecognizerProvider::Mock => Arc::new(MockRecognizerLoader::new()),
    }
}
