mod canonical_audio;
mod transcript;
mod upload;

pub use canonical_audio::CanonicalAudio;
pub use transcript::Transcript;
pub use upload::RawUpload;
