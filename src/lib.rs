//! Audio transcription server.
//!
//! Uploads are screened, decoded into canonical mono 16 kHz PCM, and fed to a
//! speech-recognition backend whose expensive in-memory handle is owned by a
//! TTL-bounded, single-flight model cache. The HTTP layer is thin: it resolves
//! a multipart upload into a [`domain::RawUpload`] and maps the classified
//! error taxonomy onto status codes.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
