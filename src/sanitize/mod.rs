pub mod hindi;
pub mod kannada;

pub use hindi::HindiSanitizer;
pub use kannada::KannadaSanitizer;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Kannada,
    Hindi,
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Language::Kannada => write!(f, "kannada"),
            Language::Hindi => write!(f, "hindi"),
        }
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "kn" | "kannada" => Ok(Language::Kannada),
            "hi" | "hindi" => Ok(Language::Hindi),
            _ => Err(format!("Unknown language: {}. Use 'kn' or 'hi'", s)),
        }
    }
}

/// Script-specific transcription validator.
///
/// `sanitize` trims the input, rejects text that is empty after trimming,
/// rejects text containing characters outside the language whitelist, and
/// otherwise returns the trimmed text unchanged.
pub trait TranscriptionSanitizer: Send + Sync {
    fn sanitize(&self, transcription: &str) -> Result<String>;
    fn language(&self) -> &'static str;
}

pub fn create_sanitizer(language: Language) -> Box<dyn TranscriptionSanitizer> {
    match language {
        Language::Kannada => Box::new(KannadaSanitizer::new()),
        Language::Hindi => Box::new(HindiSanitizer::new()),
    }
}
