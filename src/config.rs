use crate::error::{PrepError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default VAD aggressiveness when no chunking block is configured.
pub const DEFAULT_AGGRESSIVENESS: i64 = 2;

/// Default root for raw audio downloads and derived artifacts.
pub const DEFAULT_DOWNLOAD_ROOT: &str = "/tmp/audio_processing_raw";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioProcessorSection {
    /// Raw chunking block. Kept untyped so a non-integer `aggressiveness`
    /// is rejected with a config error instead of a deserialization failure.
    pub chunking: Option<toml::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Local root under which `{source}/{audio_id}` working dirs are created.
    pub download_root: PathBuf,
    /// Object-store bucket holding raw audio.
    pub bucket: String,
    /// Remote prefix prepended to `{source}/{audio_id}`.
    pub remote_prefix: String,
    /// Base URL for the HTTP object store. When unset, a local store is used.
    pub storage_base_url: Option<String>,
    /// Root directory for the local object store.
    pub local_store_root: Option<PathBuf>,
    /// Path to the metadata catalog database.
    pub db_path: Option<PathBuf>,
    pub audio_processor: AudioProcessorSection,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            download_root: PathBuf::from(DEFAULT_DOWNLOAD_ROOT),
            bucket: String::new(),
            remote_prefix: "raw_landing".to_string(),
            storage_base_url: None,
            local_store_root: None,
            db_path: None,
            audio_processor: AudioProcessorSection::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::default();

        // Load from config file if it exists
        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                let contents = std::fs::read_to_string(&config_path)?;
                config = toml::from_str(&contents)
                    .map_err(|e| PrepError::Config(format!("Invalid config file: {e}")))?;
            }
        }

        // Override with environment variables
        if let Ok(root) = std::env::var("SPEECHPREP_DOWNLOAD_ROOT") {
            config.download_root = PathBuf::from(root);
        }
        if let Ok(bucket) = std::env::var("SPEECHPREP_BUCKET") {
            config.bucket = bucket;
        }
        if let Ok(prefix) = std::env::var("SPEECHPREP_REMOTE_PREFIX") {
            config.remote_prefix = prefix;
        }
        if let Ok(url) = std::env::var("SPEECHPREP_STORAGE_URL") {
            config.storage_base_url = Some(url);
        }
        if let Ok(path) = std::env::var("SPEECHPREP_DB_PATH") {
            config.db_path = Some(PathBuf::from(path));
        }

        Ok(config)
    }

    /// Resolve the VAD aggressiveness from the chunking block.
    ///
    /// A missing block defaults to [`DEFAULT_AGGRESSIVENESS`]; a block whose
    /// `aggressiveness` is absent or not an integer is rejected.
    pub fn chunking_aggressiveness(&self) -> Result<i64> {
        resolve_aggressiveness(self.audio_processor.chunking.as_ref())
    }

    pub fn validate_storage(&self) -> Result<()> {
        if self.bucket.is_empty() {
            return Err(PrepError::Config(
                "Bucket not set. Set SPEECHPREP_BUCKET or the `bucket` config key".to_string(),
            ));
        }
        if self.remote_prefix.is_empty() {
            return Err(PrepError::Config(
                "Remote prefix must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("speechprep").join("config.toml"))
    }
}

/// Shared aggressiveness lookup for any chunking block.
pub fn resolve_aggressiveness(block: Option<&toml::Value>) -> Result<i64> {
    let Some(block) = block else {
        return Ok(DEFAULT_AGGRESSIVENESS);
    };

    match block.get("aggressiveness") {
        Some(toml::Value::Integer(n)) => Ok(*n),
        other => Err(PrepError::Config(format!(
            "aggressiveness must be an integer, got {:?}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.download_root, PathBuf::from(DEFAULT_DOWNLOAD_ROOT));
        assert!(config.db_path.is_none());
        assert!(config.audio_processor.chunking.is_none());
    }

    #[test]
    fn test_aggressiveness_defaults_when_block_absent() {
        let config = Config::default();
        assert_eq!(config.chunking_aggressiveness().unwrap(), 2);
    }

    #[test]
    fn test_aggressiveness_integer() {
        let config: Config = toml::from_str(
            r#"
            [audio_processor.chunking]
            aggressiveness = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.chunking_aggressiveness().unwrap(), 3);
    }

    #[test]
    fn test_aggressiveness_rejects_float() {
        let config: Config = toml::from_str(
            r#"
            [audio_processor.chunking]
            aggressiveness = 2.5
            "#,
        )
        .unwrap();
        assert!(config.chunking_aggressiveness().is_err());
    }

    #[test]
    fn test_aggressiveness_rejects_string() {
        let config: Config = toml::from_str(
            r#"
            [audio_processor.chunking]
            aggressiveness = "high"
            "#,
        )
        .unwrap();
        assert!(config.chunking_aggressiveness().is_err());
    }

    #[test]
    fn test_aggressiveness_rejects_block_without_key() {
        let config: Config = toml::from_str(
            r#"
            [audio_processor.chunking]
            window = 30
            "#,
        )
        .unwrap();
        assert!(config.chunking_aggressiveness().is_err());
    }

    #[test]
    fn test_validate_storage_requires_bucket() {
        let config = Config::default();
        assert!(config.validate_storage().is_err());

        let mut config = Config::default();
        config.bucket = "speech-raw".to_string();
        assert!(config.validate_storage().is_ok());
    }
}
