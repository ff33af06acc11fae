mod model_cache;
mod transcription_service;
mod upload_validator;

pub use model_cache::ModelCache;
pub use transcription_service::{TranscribeError, TranscriptionService};
pub use upload_validator::{
    UploadValidator, ValidationError, ValidationOutcome, DEFAULT_ALLOWED_MIME_TYPES,
    DEFAULT_MAX_UPLOAD_BYTES,
};
