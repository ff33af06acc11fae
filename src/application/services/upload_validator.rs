use std::collections::HashSet;

use crate::domain::RawUpload;

pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

pub const DEFAULT_ALLOWED_MIME_TYPES: &[&str] = &[
    "audio/wav",
    "audio/x-wav",
    "audio/wave",
    "audio/mpeg",
    "audio/mp4",
    "audio/m4a",
    "audio/x-m4a",
    "audio/aac",
    "audio/ogg",
    "audio/flac",
    "audio/webm",
];

/// Cheap screening of uploads before any decoding work.
pub struct UploadValidator {
    max_bytes: u64,
    allowed_mime: HashSet<String>,
}

/// Acceptance verdict; the detected type is kept for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    pub detected_mime: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("no filename was provided")]
    MissingFilename,
    #[error("uploaded file is empty")]
    EmptyUpload,
    #[error("file is {size_bytes} bytes, which exceeds the {max_bytes} byte limit")]
    TooLarge { size_bytes: u64, max_bytes: u64 },
    #[error("content type {0} is not an accepted audio type")]
    DisallowedType(String),
    #[error("file content looks like {sniffed}, not the declared {declared}")]
    DeclaredTypeMismatch { declared: String, sniffed: String },
}

impl UploadValidator {
    pub fn new(max_bytes: u64, allowed_mime: impl IntoIterator<Item = String>) -> Self {
        Self {
            max_bytes,
            allowed_mime: allowed_mime.into_iter().collect(),
        }
    }

    pub fn validate(&self, upload: &RawUpload) -> Result<ValidationOutcome, ValidationError> {
        if upload.filename.as_deref().map_or(true, str::is_empty) {
            return Err(ValidationError::MissingFilename);
        }

        if upload.data.is_empty() {
            return Err(ValidationError::EmptyUpload);
        }

        if upload.size_bytes() > self.max_bytes {
            return Err(ValidationError::TooLarge {
                size_bytes: upload.size_bytes(),
                max_bytes: self.max_bytes,
            });
        }

        let declared = upload
            .declared_mime
            .as_deref()
            .unwrap_or("application/octet-stream");
        if !self.allowed_mime.contains(declared) {
            return Err(ValidationError::DisallowedType(declared.to_string()));
        }

        // The declared type comes from the client and cannot be trusted; when
        // the magic bytes identify the content, the sniffed type wins.
        let sniffed = infer::get(&upload.data).map(|t| t.mime_type().to_string());
        if let Some(sniffed) = &sniffed {
            if !self.allowed_mime.contains(sniffed) {
                return Err(ValidationError::DeclaredTypeMismatch {
                    declared: declared.to_string(),
                    sniffed: sniffed.clone(),
                });
            }
        }

        Ok(ValidationOutcome {
            detected_mime: sniffed.or_else(|| Some(declared.to_string())),
        })
    }
}

impl Default for UploadValidator {
    fn default() -> Self {
        Self::new(
            DEFAULT_MAX_UPLOAD_BYTES,
            DEFAULT_ALLOWED_MIME_TYPES.iter().map(|s| s.to_string()),
        )
    }
}
