use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use hound::{WavReader, WavWriter};
use tracing::{debug, info};

use crate::error::{PrepError, Result};

use super::vad::{detect_speech_regions, VadConfig};
use super::SpeechRegion;

/// Artifacts produced by clip creation for one WAV file.
#[derive(Debug)]
pub struct ClipSummary {
    pub chunks: Vec<PathBuf>,
    pub vad_file: PathBuf,
    pub regions: Vec<SpeechRegion>,
}

/// Segment `wav_path` into one WAV per detected speech region.
///
/// Clips land in `chunk_dir` named `{stem}_chunk_NNNN.wav`; a marker file
/// with tab-separated start/end seconds per region lands in `vad_dir`.
pub fn create_audio_clips(
    aggressiveness: i64,
    wav_path: &Path,
    chunk_dir: &Path,
    vad_dir: &Path,
    file_name: &str,
) -> Result<ClipSummary> {
    let vad_config = VadConfig::for_aggressiveness(aggressiveness)?;

    let reader = WavReader::open(wav_path)
        .map_err(|e| PrepError::Chunking(format!("Failed to open WAV file: {e}")))?;
    let spec = reader.spec();

    let samples: Vec<i16> = match spec.sample_format {
        hound::SampleFormat::Int => reader
            .into_samples::<i16>()
            .map(|s| s.unwrap_or(0))
            .collect(),
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| (s.unwrap_or(0.0) * i16::MAX as f32) as i16)
            .collect(),
    };

    let channels = spec.channels.max(1) as usize;
    let frames = samples.len() / channels;

    // VAD needs one sample per frame; average the channels down so region
    // times are not inflated by the interleaving.
    let regions = if channels > 1 {
        let mono: Vec<i16> = samples
            .chunks_exact(channels)
            .map(|frame| {
                (frame.iter().map(|&s| s as i32).sum::<i32>() / channels as i32) as i16
            })
            .collect();
        detect_speech_regions(&mono, spec.sample_rate, &vad_config)
    } else {
        detect_speech_regions(&samples, spec.sample_rate, &vad_config)
    };
    info!(
        "Detected {} speech regions in {} at aggressiveness {}",
        regions.len(),
        wav_path.display(),
        aggressiveness
    );

    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .ok_or_else(|| PrepError::Chunking(format!("invalid file name: {file_name}")))?;
    let mut chunks = Vec::with_capacity(regions.len());

    for (index, region) in regions.iter().enumerate() {
        let start_frame =
            ((region.start.as_secs_f64() * spec.sample_rate as f64) as usize).min(frames);
        let end_frame =
            ((region.end.as_secs_f64() * spec.sample_rate as f64) as usize).min(frames);

        let chunk_path = chunk_dir.join(format!("{stem}_chunk_{index:04}.wav"));
        debug!(
            "Writing chunk {}: {:?} to {:?}",
            index, region.start, region.end
        );

        let mut writer = WavWriter::create(&chunk_path, spec)
            .map_err(|e| PrepError::Chunking(format!("Failed to create chunk file: {e}")))?;
        for sample in &samples[start_frame * channels..end_frame * channels] {
            writer
                .write_sample(*sample)
                .map_err(|e| PrepError::Chunking(format!("Failed to write chunk: {e}")))?;
        }
        writer
            .finalize()
            .map_err(|e| PrepError::Chunking(format!("Failed to finalize chunk: {e}")))?;

        chunks.push(chunk_path);
    }

    let mut markers = String::new();
    for region in &regions {
        let _ = writeln!(
            markers,
            "{:.3}\t{:.3}",
            region.start.as_secs_f64(),
            region.end.as_secs_f64()
        );
    }
    let vad_file = vad_dir.join(format!("{stem}.vad"));
    std::fs::write(&vad_file, markers)?;

    info!(
        "Wrote {} clips and markers to {}",
        chunks.len(),
        vad_file.display()
    );

    Ok(ClipSummary {
        chunks,
        vad_file,
        regions,
    })
}
