mod audio_decoder;
mod recognizer;

pub use audio_decoder::{AudioDecoder, AudioDecoderError};
pub use recognizer::{LoadError, Recognizer, RecognizerError, RecognizerLoader};
