use regex::Regex;
use tracing::debug;

use crate::error::{PrepError, Result};

use super::TranscriptionSanitizer;

/// Maximal runs of characters allowed in Kannada transcriptions.
const ALLOWED_RUNS: &str = "[ ಂ-ಃಅ-ಋಎ-ಐಒ-ನಪ-ರಲ-ಳವ-ಹಾ-ೄೆ-ೈೊ-್ೲ]+";

pub struct KannadaSanitizer {
    allowed: Regex,
}

impl KannadaSanitizer {
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

impl Default for KannadaSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptionSanitizer for KannadaSanitizer {
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
                "transcription has char which is not in ಂ-ಃಅ-ಋಎ-ಐಒ-ನಪ-ರಲ-ಳವ-ಹಾ-ೄೆ-ೈೊ-್ೲ"
                    .to_string(),
            ));
        }

        Ok(transcription.to_string())
    }

    fn language(&self) -> &'static str {
        "kannada"
    }
}
