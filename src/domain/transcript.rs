/// The outcome of one recognition call. Immutable, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub text: String,
    pub language: String,
    /// Supplied by the recognition backend (typically its language
    /// probability); the core never substitutes a constant.
    pub confidence: f32,
}

impl Transcript {
    pub fn new(text: String, language: String, confidence: f32) -> Self {
        Self {
            text,
            language,
            confidence,
        }
    }
}
