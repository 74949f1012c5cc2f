pub mod clips;
pub mod convert;
pub mod vad;

pub use clips::ClipSummary;
pub use convert::{check_ffmpeg, convert_to_wav};
pub use vad::{detect_speech_regions, VadConfig};

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// A region of speech detected in audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRegion {
    pub start: Duration,
    pub end: Duration,
}

impl SpeechRegion {
    pub fn duration(&self) -> Duration {
        self.end.saturating_sub(self.start)
    }
}

/// Conversion and chunking collaborator for the audio processor.
#[async_trait]
pub trait AudioToolkit: Send + Sync {
    /// Convert the raw file with the given extension found in `input_dir`
    /// into a canonical WAV in `output_dir`, returning the output path.
    async fn convert_to_wav(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        ext: &str,
    ) -> Result<PathBuf>;

    /// Segment `wav_path` into speech clips under `chunk_dir` and write VAD
    /// markers under `vad_dir`, keyed by `file_name`'s stem.
    async fn create_audio_clips(
        &self,
        aggressiveness: i64,
        wav_path: &Path,
        chunk_dir: &Path,
        vad_dir: &Path,
        file_name: &str,
    ) -> Result<ClipSummary>;

    fn name(&self) -> &'static str;
}

/// Partition of chunk files by signal quality.
#[derive(Debug, Default)]
pub struct SnrReport {
    pub accepted: Vec<PathBuf>,
    pub rejected: Vec<PathBuf>,
}

/// Quality filter applied to produced chunks.
pub trait SnrFilter: Send + Sync {
    fn filter(&self, chunks: &[PathBuf]) -> Result<SnrReport>;
    fn name(&self) -> &'static str;
}

/// Filter that accepts every chunk. The SNR acceptance contract is not yet
/// defined; this keeps the pipeline seam in place until it is.
pub struct NoopSnrFilter;

impl SnrFilter for NoopSnrFilter {
    fn filter(&self, chunks: &[PathBuf]) -> Result<SnrReport> {
        Ok(SnrReport {
            accepted: chunks.to_vec(),
            rejected: Vec::new(),
        })
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}

/// Production toolkit: FFmpeg for transcoding, energy VAD over hound-read
/// samples for clip creation.
pub struct FfmpegToolkit;

impl FfmpegToolkit {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FfmpegToolkit {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioToolkit for FfmpegToolkit {
    async fn convert_to_wav(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        ext: &str,
    ) -> Result<PathBuf> {
        convert::convert_to_wav(input_dir, output_dir, ext)
    }

    async fn create_audio_clips(
        &self,
        aggressiveness: i64,
        wav_path: &Path,
        chunk_dir: &Path,
        vad_dir: &Path,
        file_name: &str,
    ) -> Result<ClipSummary> {
        clips::create_audio_clips(aggressiveness, wav_path, chunk_dir, vad_dir, file_name)
    }

    fn name(&self) -> &'static str {
        "ffmpeg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speech_region_duration() {
        let region = SpeechRegion {
            start: Duration::from_secs(2),
            end: Duration::from_secs(5),
        };
        assert_eq!(region.duration(), Duration::from_secs(3));
    }

    #[test]
    fn test_noop_snr_accepts_everything() {
        let chunks = vec![PathBuf::from("/tmp/a.wav"), PathBuf::from("/tmp/b.wav")];
        let report = NoopSnrFilter.filter(&chunks).unwrap();
        assert_eq!(report.accepted, chunks);
        assert!(report.rejected.is_empty());
    }
}
