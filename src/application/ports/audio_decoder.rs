use crate::domain::CanonicalAudio;

/// Decodes an uploaded container/codec payload into canonical PCM.
///
/// Implementations must be deterministic: the same input bytes yield
/// bit-identical output.
pub trait AudioDecoder: Send + Sync {
    fn decode(&self, data: &[u8]) -> Result<CanonicalAudio, AudioDecoderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AudioDecoderError {
    #[error("unsupported audio format: {0}")]
    UnsupportedFormat(String),
    #[error("corrupt audio data: {0}")]
    CorruptData(String),
    #[error("audio contains no samples")]
    EmptyAudio,
}
