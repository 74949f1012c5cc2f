//! Integration tests for speechprep
//!
//! These tests validate the catalog migration invariants, the sanitizer
//! contracts, and the configuration rules without external services.

use chrono::{DateTime, TimeZone, Utc};
use speechprep::catalog::{Catalog, StagingRecord};
use speechprep::config::Config;
use speechprep::error::PrepError;
use speechprep::sanitize::{create_sanitizer, Language};

fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

fn staged(audio_id: &str, speaker: &str, load: DateTime<Utc>) -> StagingRecord {
    StagingRecord {
        audio_id: audio_id.to_string(),
        raw_file_name: format!("{audio_id}.mp3"),
        duration: 60.0,
        source: "src1".to_string(),
        speaker_name: speaker.to_string(),
        load_datetime: load,
        ..Default::default()
    }
}

// ============================================================================
// Catalog Migration Tests
// ============================================================================

mod catalog_tests {
    use super::*;

    #[test]
    fn test_migration_respects_watermark() {
        let catalog = Catalog::open_in_memory().unwrap();
        for (id, load) in [("A1", 100), ("A2", 200), ("A3", 300)] {
            catalog.stage_media(&staged(id, "asha", ts(load))).unwrap();
        }

        // Only rows strictly newer than the watermark are copied
        let copied = catalog.migrate_new_media(Some(ts(200))).unwrap();
        assert_eq!(copied, 1);
        assert!(catalog.load_time_for_audio("A1").unwrap().is_none());
        assert!(catalog.load_time_for_audio("A2").unwrap().is_none());
        assert_eq!(catalog.load_time_for_audio("A3").unwrap(), Some(ts(300)));
    }

    #[test]
    fn test_repeated_migration_is_idempotent() {
        let catalog = Catalog::open_in_memory().unwrap();
        catalog.stage_media(&staged("A1", "asha", ts(100))).unwrap();
        catalog.stage_media(&staged("A2", "ravi", ts(200))).unwrap();

        assert_eq!(catalog.migrate_new_media(None).unwrap(), 2);

        // Re-running with the fresh watermark copies nothing
        let watermark = catalog.media_watermark().unwrap();
        assert_eq!(watermark, Some(ts(200)));
        assert_eq!(catalog.migrate_new_media(watermark).unwrap(), 0);
    }

    #[test]
    fn test_incremental_batches_stack() {
        let catalog = Catalog::open_in_memory().unwrap();
        catalog.stage_media(&staged("A1", "asha", ts(100))).unwrap();
        catalog.migrate_new_media(None).unwrap();

        // A later ingestion lands, only the new row moves
        catalog.stage_media(&staged("A2", "ravi", ts(200))).unwrap();
        let watermark = catalog.media_watermark().unwrap();
        assert_eq!(catalog.migrate_new_media(watermark).unwrap(), 1);

        let ids = catalog.list_new_audio_ids(None).unwrap();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_speaker_dedup_is_append_only() {
        let catalog = Catalog::open_in_memory().unwrap();
        catalog.stage_media(&staged("A1", "asha", ts(100))).unwrap();
        catalog.stage_media(&staged("A2", "asha", ts(200))).unwrap();
        catalog.stage_media(&staged("A3", "ravi", ts(300))).unwrap();

        assert_eq!(catalog.dedupe_speakers().unwrap(), 2);
        // A second pass finds every name already present
        assert_eq!(catalog.dedupe_speakers().unwrap(), 0);
    }

    #[test]
    fn test_speaker_lookup_for_staged_audio() {
        let catalog = Catalog::open_in_memory().unwrap();
        catalog.stage_media(&staged("A1", "asha", ts(100))).unwrap();
        catalog.dedupe_speakers().unwrap();

        let asha = catalog.speaker_id_for_audio("A1").unwrap();
        assert!(asha.is_some());
        assert!(catalog.speaker_id_for_audio("unknown").unwrap().is_none());
    }

    #[test]
    fn test_new_audio_ids_follow_mapping_watermark() {
        let catalog = Catalog::open_in_memory().unwrap();
        catalog.stage_media(&staged("A1", "asha", ts(100))).unwrap();
        catalog.stage_media(&staged("A2", "ravi", ts(200))).unwrap();
        catalog.migrate_new_media(None).unwrap();

        // Nothing mapped yet, so the mapping watermark is empty and every
        // migrated id is new
        let watermark = catalog.mapping_watermark().unwrap();
        assert!(watermark.is_none());
        let mut ids = catalog.list_new_audio_ids(watermark).unwrap();
        ids.sort();
        assert_eq!(ids, vec!["A1".to_string(), "A2".to_string()]);
    }
}

// ============================================================================
// Sanitizer Tests
// ============================================================================

mod sanitizer_tests {
    use super::*;

    #[test]
    fn test_kannada_text_passes_through_trimmed() {
        let sanitizer = create_sanitizer(Language::Kannada);
        assert_eq!(
            sanitizer.sanitize("  ನಮಸ್ಕಾರ ಎಲ್ಲರಿಗೂ \n").unwrap(),
            "ನಮಸ್ಕಾರ ಎಲ್ಲರಿಗೂ"
        );
    }

    #[test]
    fn test_empty_transcription_is_rejected() {
        let sanitizer = create_sanitizer(Language::Kannada);
        for input in ["", "   "] {
            match sanitizer.sanitize(input) {
                Err(PrepError::Sanitization(msg)) => assert!(msg.contains("empty")),
                other => panic!("Expected sanitization error, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_mixed_script_is_rejected() {
        let sanitizer = create_sanitizer(Language::Kannada);
        let result = sanitizer.sanitize("ನಮಸ್ಕಾರ abc");
        match result {
            Err(PrepError::Sanitization(msg)) => assert!(msg.contains("not in")),
            other => panic!("Expected sanitization error, got {other:?}"),
        }
    }

    #[test]
    fn test_hindi_variant_uses_devanagari_whitelist() {
        let sanitizer = create_sanitizer(Language::Hindi);
        assert_eq!(sanitizer.sanitize(" नमस्ते ").unwrap(), "नमस्ते");
        assert!(sanitizer.sanitize("नमस्ते abc").is_err());
        // Kannada text is not valid Hindi
        assert!(sanitizer.sanitize("ನಮಸ್ಕಾರ").is_err());
    }

    #[test]
    fn test_language_codes_round_trip() {
        assert_eq!("kn".parse::<Language>().unwrap(), Language::Kannada);
        assert_eq!("hi".parse::<Language>().unwrap(), Language::Hindi);
        assert_eq!(Language::Kannada.to_string(), "kannada");
    }
}

// ============================================================================
// Config Tests
// ============================================================================

mod config_tests {
    use super::*;

    #[test]
    fn test_default_aggressiveness_is_two() {
        let config = Config::default();
        assert_eq!(config.chunking_aggressiveness().unwrap(), 2);
    }

    #[test]
    fn test_non_integer_aggressiveness_values_fail() {
        for block in [
            r#"aggressiveness = "high""#,
            "aggressiveness = 2.5",
            "aggressiveness = true",
        ] {
            let config: Config = toml::from_str(&format!(
                "[audio_processor.chunking]\n{block}"
            ))
            .unwrap();
            assert!(
                config.chunking_aggressiveness().is_err(),
                "expected failure for block: {block}"
            );
        }
    }

    #[test]
    fn test_integer_aggressiveness_is_accepted() {
        let config: Config =
            toml::from_str("[audio_processor.chunking]\naggressiveness = 0").unwrap();
        assert_eq!(config.chunking_aggressiveness().unwrap(), 0);
    }
}
