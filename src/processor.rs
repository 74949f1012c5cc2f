use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use crate::audio::{AudioToolkit, SnrFilter};
use crate::config::{self, Config};
use crate::error::{PrepError, Result};
use crate::storage::ObjectStore;

/// Settings the processor needs for a batch.
#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// Local root under which `{source}/{audio_id}` working dirs live.
    pub download_root: PathBuf,
    /// Object-store bucket holding raw audio.
    pub bucket: String,
    /// Remote prefix prepended to `{source}/{audio_id}`.
    pub remote_prefix: String,
    /// Raw chunking block; validated when the chunking step runs.
    pub chunking: Option<toml::Value>,
}

impl ProcessorConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            download_root: config.download_root.clone(),
            bucket: config.bucket.clone(),
            remote_prefix: config.remote_prefix.clone(),
            chunking: config.audio_processor.chunking.clone(),
        }
    }

    fn aggressiveness(&self) -> Result<i64> {
        config::resolve_aggressiveness(self.chunking.as_ref())
    }
}

/// Downloads raw audio, converts it to canonical WAV, segments it into
/// speech clips, and runs the SNR filter over the result.
///
/// Ids are processed sequentially; the first failure aborts the batch.
pub struct AudioProcessor {
    store: Arc<dyn ObjectStore>,
    toolkit: Arc<dyn AudioToolkit>,
    snr: Arc<dyn SnrFilter>,
    config: ProcessorConfig,
    show_progress: bool,
}

impl AudioProcessor {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        toolkit: Arc<dyn AudioToolkit>,
        snr: Arc<dyn SnrFilter>,
        config: ProcessorConfig,
    ) -> Self {
        Self {
            store,
            toolkit,
            snr,
            config,
            show_progress: true,
        }
    }

    /// Enable or disable progress bar display.
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Process a batch of audio ids from one source.
    pub async fn process(&self, audio_ids: &[String], source: &str, extension: &str) -> Result<()> {
        info!("Processing {} audio ids from {}", audio_ids.len(), source);

        let progress_bar = if self.show_progress {
            let pb = ProgressBar::new(audio_ids.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} audio ids")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        for audio_id in audio_ids {
            info!("Processing audio id {}", audio_id);
            self.process_audio_id(audio_id, source, extension).await?;
            if let Some(pb) = &progress_bar {
                pb.inc(1);
            }
        }

        if let Some(pb) = progress_bar {
            pb.finish_with_message("Batch complete");
        }
        Ok(())
    }

    async fn process_audio_id(&self, audio_id: &str, source: &str, extension: &str) -> Result<()> {
        let local_dir = self.config.download_root.join(source).join(audio_id);
        ensure_path(&local_dir)?;
        debug!("Working directory {}", local_dir.display());

        let remote_path = format!("{}/{}/{}", self.config.remote_prefix, source, audio_id);
        let raw_path = local_dir.join(format!("{audio_id}.{extension}"));
        self.store
            .download_to_local(&self.config.bucket, &remote_path, &raw_path, true)
            .await?;

        let wav_dir = local_dir.join("wav");
        ensure_path(&wav_dir)?;
        let wav_path = self
            .toolkit
            .convert_to_wav(&local_dir, &wav_dir, extension)
            .await?;
        info!("Converted {} to {}", audio_id, wav_path.display());

        // Validate the chunking block before touching the collaborator
        let aggressiveness = self.config.aggressiveness()?;

        let chunk_dir = local_dir.join("chunks");
        let vad_dir = local_dir.join("vad");
        ensure_path(&chunk_dir)?;
        ensure_path(&vad_dir)?;

        let file_name = wav_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| {
                PrepError::Conversion(format!("{} has no file name", wav_path.display()))
            })?;

        let summary = self
            .toolkit
            .create_audio_clips(aggressiveness, &wav_path, &chunk_dir, &vad_dir, &file_name)
            .await?;
        info!("Created {} clips for {}", summary.chunks.len(), audio_id);

        let report = self.snr.filter(&summary.chunks)?;
        info!(
            "SNR filter ({}) accepted {} / rejected {} clips for {}",
            self.snr.name(),
            report.accepted.len(),
            report.rejected.len(),
            audio_id
        );

        Ok(())
    }
}

/// Create a working directory idempotently, leaving existing contents alone.
fn ensure_path(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path)?;
    Ok(())
}
