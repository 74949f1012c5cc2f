use regex::Regex;
use tracing::debug;

use crate::error::{PrepError, Result};

use super::TranscriptionSanitizer;

/// Maximal runs of characters allowed in Hindi transcriptions: Devanagari
/// letters, signs, and digits plus space. Punctuation (danda, double danda,
/// abbreviation sign) is excluded.
const ALLOWED_RUNS: &str = "[ ऀ-ॏॐ-ॣ०-९ॱ-ॿ]+";

pub struct HindiSanitizer {
    allowed: Regex,
}

impl HindiSanitizer {
    pub fn new() -> Self {
        Self {
            allowed: Regex::new(ALLOWED_RUNS).expect("whitelist pattern is valid"),
        }
    }

    fn should_reject(&self, transcription: &str) -> bool {
        let rejected = self.allowed.replace_all(transcription, "");
        !rejected.trim().is_empty()
    }
}

impl Default for HindiSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptionSanitizer for HindiSanitizer {
    fn sanitize(&self, transcription: &str) -> Result<String> {
        debug!("Sanitizing transcription: {}", transcription);
        let transcription = transcription.trim();

        if transcription.is_empty() {
            return Err(PrepError::Sanitization(
                "transcription is empty".to_string(),
            ));
        }

        if self.should_reject(transcription) {
            return Err(PrepError::Sanitization(
                "transcription has char which is not in ऀ-ॏॐ-ॣ०-९ॱ-ॿ".to_string(),
            ));
        }

        Ok(transcription.to_string())
    }

    fn language(&self) -> &'static str {
        "hindi"
    }
}
