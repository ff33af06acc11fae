use std::sync::Arc;

use crate::application::ports::{
    AudioDecoder, AudioDecoderError, LoadError, RecognizerError,
};
use crate::application::services::model_cache::ModelCache;
use crate::application::services::upload_validator::{UploadValidator, ValidationError};
use crate::domain::{RawUpload, Transcript};

/// Sequences one transcription request: validate, decode, acquire the model,
/// recognize. The first failing stage short-circuits the rest; there is no
/// partial recovery and no handle reuse across requests.
pub struct TranscriptionService {
    validator: UploadValidator,
    decoder: Arc<dyn AudioDecoder>,
    cache: Arc<ModelCache>,
}

#[derive(Debug, thiserror::Error)]
pub enum TranscribeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Ingest(#[from] AudioDecoderError),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Recognition(#[from] RecognizerError),
    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

impl TranscriptionService {
    pub fn new(
        validator: UploadValidator,
        decoder: Arc<dyn AudioDecoder>,
        cache: Arc<ModelCache>,
    ) -> Self {
        Self {
            validator,
            decoder,
            cache,
        }
    }

    #[tracing::instrument(skip(self, upload), fields(filename = upload.filename.as_deref().unwrap_or("-")))]
    pub async fn transcribe(&self, upload: RawUpload) -> Result<Transcript, TranscribeError> {
        let outcome = self.validator.validate(&upload)?;
        tracing::debug!(
            bytes = upload.data.len(),
            detected_mime = outcome.detected_mime.as_deref().unwrap_or("unknown"),
            "Upload accepted"
        );

        // Decoding is CPU-bound; keep it off the async workers.
        let decoder = Arc::clone(&self.decoder);
        let audio = tokio::task::spawn_blocking(move || decoder.decode(&upload.data))
            .await
            .map_err(|e| TranscribeError::Unexpected(format!("decode task failed: {}", e)))??;

        tracing::debug!(
            samples = audio.samples.len(),
            duration_secs = audio.duration_secs(),
            source_channels = audio.source_channels,
            source_sample_rate = audio.source_sample_rate,
            "Audio normalized to canonical PCM"
        );

        let recognizer = self.cache.acquire().await?;

        // A failed recognition call does not invalidate the cached handle:
        // the failure may be input-specific rather than resource-specific.
        let transcript = recognizer.recognize(&audio).await?;

        tracing::info!(
            chars = transcript.text.len(),
            language = %transcript.language,
            confidence = transcript.confidence,
            "Transcription completed"
        );

        Ok(transcript)
    }
}
