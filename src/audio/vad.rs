use std::time::Duration;

use tracing::debug;

use crate::error::{PrepError, Result};

use super::SpeechRegion;

/// RMS energy thresholds indexed by aggressiveness level 0-3.
/// Higher levels demand more energy before a frame counts as speech.
const ENERGY_THRESHOLDS: [f32; 4] = [0.005, 0.01, 0.02, 0.04];

/// Configuration for Voice Activity Detection.
#[derive(Debug, Clone)]
pub struct VadConfig {
    /// RMS energy threshold for speech detection (0.0 to 1.0).
    pub energy_threshold: f32,

    /// Minimum duration of speech to be considered a valid region.
    pub min_speech_duration: Duration,

    /// Minimum duration of silence to split regions.
    pub min_silence_duration: Duration,

    /// Size of analysis window in samples.
    pub window_size: usize,

    /// Hop size between windows in samples.
    pub hop_size: usize,
}

impl VadConfig {
    /// Build a config for an aggressiveness level in 0..=3.
    pub fn for_aggressiveness(level: i64) -> Result<Self> {
        let threshold = usize::try_from(level)
            .ok()
            .and_then(|i| ENERGY_THRESHOLDS.get(i))
            .ok_or_else(|| {
                PrepError::Config(format!(
                    "aggressiveness must be between 0 and 3, got {level}"
                ))
            })?;

        Ok(Self {
            energy_threshold: *threshold,
            min_speech_duration: Duration::from_millis(250),
            min_silence_duration: Duration::from_millis(500),
            window_size: 1600,
            hop_size: 800,
        })
    }
}

/// RMS energy of a sample window, normalized to 0.0..=1.0.
fn window_rms(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = samples
        .iter()
        .map(|&s| {
            let normalized = s as f64 / i16::MAX as f64;
            normalized * normalized
        })
        .sum();

    (sum_squares / samples.len() as f64).sqrt() as f32
}

/// Detect speech regions in a run of PCM samples.
pub fn detect_speech_regions(
    samples: &[i16],
    sample_rate: u32,
    config: &VadConfig,
) -> Vec<SpeechRegion> {
    if samples.is_empty() {
        return vec![];
    }

    let mut speech_frames = Vec::new();
    let mut pos = 0;
    while pos + config.window_size <= samples.len() {
        let rms = window_rms(&samples[pos..pos + config.window_size]);
        speech_frames.push(rms >= config.energy_threshold);
        pos += config.hop_size;
    }

    debug!(
        "VAD over {} samples produced {} frames",
        samples.len(),
        speech_frames.len()
    );

    frames_to_regions(
        &speech_frames,
        sample_rate,
        config.hop_size,
        config.min_speech_duration,
        config.min_silence_duration,
    )
}

/// Convert speech frames to time regions with merging and filtering.
fn frames_to_regions(
    speech_frames: &[bool],
    sample_rate: u32,
    hop_size: usize,
    min_speech_duration: Duration,
    min_silence_duration: Duration,
) -> Vec<SpeechRegion> {
    if speech_frames.is_empty() {
        return vec![];
    }

    let frame_duration = hop_size as f64 / sample_rate as f64;
    let min_speech_frames = (min_speech_duration.as_secs_f64() / frame_duration).ceil() as usize;
    let min_silence_frames = (min_silence_duration.as_secs_f64() / frame_duration).ceil() as usize;

    let mut raw_regions: Vec<(usize, usize)> = Vec::new();
    let mut in_speech = false;
    let mut start_frame = 0;

    for (i, &is_speech) in speech_frames.iter().enumerate() {
        if is_speech && !in_speech {
            in_speech = true;
            start_frame = i;
        } else if !is_speech && in_speech {
            in_speech = false;
            raw_regions.push((start_frame, i));
        }
    }

    if in_speech {
        raw_regions.push((start_frame, speech_frames.len()));
    }

    // Merge regions separated by short silences
    let mut merged: Vec<(usize, usize)> = Vec::new();
    for (start, end) in raw_regions {
        if let Some((_, last_end)) = merged.last_mut() {
            if start.saturating_sub(*last_end) < min_silence_frames {
                *last_end = end;
                continue;
            }
        }
        merged.push((start, end));
    }

    merged
        .into_iter()
        .filter(|(start, end)| end - start >= min_speech_frames)
        .map(|(start, end)| SpeechRegion {
            start: Duration::from_secs_f64(start as f64 * frame_duration),
            end: Duration::from_secs_f64(end as f64 * frame_duration),
        })
        .collect()
}
