use tamlil::application::services::{UploadValidator, ValidationError};
use tamlil::domain::RawUpload;

fn wav_upload(size: usize) -> RawUpload {
    // Minimal RIFF/WAVE header so MIME sniffing recognizes the content.
    let mut data = Vec::with_capacity(size.max(12));
    data.extend_from_slice(b"RIFF");
    data.extend_from_slice(&(size as u32).to_le_bytes());
    data.extend_from_slice(b"WAVE");
    data.resize(size.max(12), 0);
    RawUpload::new(
        Some("clip.wav".to_string()),
        Some("audio/wav".to_string()),
        data,
    )
}

#[test]
fn given_valid_wav_upload_when_validating_then_accepted_with_detected_type() {
    let validator = UploadValidator::default();

    let outcome = validator.validate(&wav_upload(1024)).expect("should pass");

    assert_eq!(outcome.detected_mime.as_deref(), Some("audio/x-wav"));
}

#[test]
fn given_upload_one_byte_over_limit_when_validating_then_rejected_for_size() {
    let max = 1024;
    let validator = UploadValidator::new(max, ["audio/wav".to_string()]);

    let result = validator.validate(&wav_upload(max as usize + 1));

    match result {
        Err(ValidationError::TooLarge {
            size_bytes,
            max_bytes,
        }) => {
            assert_eq!(size_bytes, max + 1);
            assert_eq!(max_bytes, max);
        }
        other => panic!("expected size rejection, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn given_upload_at_exact_limit_when_validating_then_accepted() {
    let validator = UploadValidator::new(1024, ["audio/wav".to_string(), "audio/x-wav".to_string()]);

    assert!(validator.validate(&wav_upload(1024)).is_ok());
}

#[test]
fn given_disallowed_content_type_when_validating_then_rejected_naming_the_type() {
    let validator = UploadValidator::default();
    let upload = RawUpload::new(
        Some("notes.txt".to_string()),
        Some("text/plain".to_string()),
        b"hello".to_vec(),
    );

    let result = validator.validate(&upload);

    match result {
        Err(ValidationError::DisallowedType(mime)) => assert_eq!(mime, "text/plain"),
        other => panic!("expected type rejection, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn given_empty_body_when_validating_then_rejected() {
    let validator = UploadValidator::default();
    let upload = RawUpload::new(
        Some("clip.wav".to_string()),
        Some("audio/wav".to_string()),
        Vec::new(),
    );

    assert!(matches!(
        validator.validate(&upload),
        Err(ValidationError::EmptyUpload)
    ));
}

#[test]
fn given_missing_filename_when_validating_then_rejected() {
    let validator = UploadValidator::default();
    let upload = RawUpload::new(None, Some("audio/wav".to_string()), vec![0u8; 16]);

    assert!(matches!(
        validator.validate(&upload),
        Err(ValidationError::MissingFilename)
    ));
}

#[test]
fn given_image_bytes_declared_as_audio_when_validating_then_rejected_with_sniffed_type() {
    let validator = UploadValidator::default();
    // PNG magic bytes behind an audio content type: the sniffed type wins.
    let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    data.resize(64, 0);
    let upload = RawUpload::new(
        Some("fake.wav".to_string()),
        Some("audio/wav".to_string()),
        data,
    );

    let result = validator.validate(&upload);

    match result {
        Err(ValidationError::DeclaredTypeMismatch { declared, sniffed }) => {
            assert_eq!(declared, "audio/wav");
            assert_eq!(sniffed, "image/png");
        }
        other => panic!("expected mismatch rejection, got {:?}", other.map(|_| ())),
    }
}
