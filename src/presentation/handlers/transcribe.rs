use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::application::services::TranscribeError;
use crate::domain::RawUpload;
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct TranscribeResponse {
    pub transcription: String,
    pub language: String,
    pub confidence: f32,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }
}

#[tracing::instrument(skip(state, multipart))]
pub async fn transcribe_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> impl IntoResponse {
    let field = match multipart.next_field().await {
        Ok(Some(f)) => f,
        Ok(None) => {
            tracing::warn!("Transcription request with no file part");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new("No audio file was uploaded")),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to read multipart");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(format!("Failed to read upload: {}", e))),
            )
                .into_response();
        }
    };

    let filename = field.file_name().map(str::to_string);
    let declared_mime = field.content_type().map(str::to_string);

    tracing::debug!(
        filename = filename.as_deref().unwrap_or("-"),
        content_type = declared_mime.as_deref().unwrap_or("-"),
        "Processing audio upload"
    );

    let data = match field.bytes().await {
        Ok(d) => d,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read file bytes");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(format!("Failed to read file: {}", e))),
            )
                .into_response();
        }
    };

    let upload = RawUpload::new(filename, declared_mime, data.to_vec());

    match state.transcription_service.transcribe(upload).await {
        Ok(transcript) => (
            StatusCode::OK,
            Json(TranscribeResponse {
                transcription: transcript.text,
                language: transcript.language,
                confidence: transcript.confidence,
            }),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// Validation and ingestion failures are the caller's to fix; everything
/// downstream of them is a server-side failure. Internal detail stays in the
/// logs, not in the response body.
fn error_response(err: TranscribeError) -> axum::response::Response {
    match &err {
        TranscribeError::Validation(e) => {
            tracing::warn!(error = %e, "Upload rejected by validation");
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(e.to_string())),
            )
                .into_response()
        }
        TranscribeError::Ingest(e) => {
            tracing::warn!(error = %e, "Audio ingestion failed");
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(e.to_string())),
            )
                .into_response()
        }
        TranscribeError::Load(e) => {
            tracing::error!(error = %e, "Recognition model failed to load");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Failed to load the transcription model")),
            )
                .into_response()
        }
        TranscribeError::Recognition(e) => {
            tracing::error!(error = %e, "Recognition call failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Transcription failed")),
            )
                .into_response()
        }
        TranscribeError::Unexpected(e) => {
            tracing::error!(error = %e, "Unexpected transcription failure");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Unexpected server error".to_string(),
                    details: Some(e.clone()),
                }),
            )
                .into_response()
        }
    }
}
