use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};

use crate::error::{PrepError, Result};

/// Check if FFmpeg is installed and accessible.
pub fn check_ffmpeg() -> Result<()> {
    let output = Command::new("ffmpeg").arg("-version").output().map_err(|e| {
        PrepError::Conversion(format!(
            "FFmpeg not found. Please install FFmpeg and ensure it's in your PATH. Error: {e}"
        ))
    })?;

    if !output.status.success() {
        return Err(PrepError::Conversion("FFmpeg check failed".to_string()));
    }

    debug!("FFmpeg is available");
    Ok(())
}

/// Locate the raw audio file with the given extension in `input_dir`.
fn find_raw_file(input_dir: &Path, ext: &str) -> Result<PathBuf> {
    let entries = std::fs::read_dir(input_dir)?;

    for entry in entries {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case(ext))
            .unwrap_or(false);
        if matches {
            return Ok(path);
        }
    }

    Err(PrepError::FileNotFound(format!(
        "no .{} file in {}",
        ext,
        input_dir.display()
    )))
}

/// Convert the raw file in `input_dir` to 16kHz mono 16-bit PCM WAV.
///
/// Returns the path of the converted file, named after the input's stem.
pub fn convert_to_wav(input_dir: &Path, output_dir: &Path, ext: &str) -> Result<PathBuf> {
    check_ffmpeg()?;

    let input = find_raw_file(input_dir, ext)?;
    let stem = input
        .file_stem()
        .ok_or_else(|| PrepError::Conversion(format!("{} has no file stem", input.display())))?;
    let output = output_dir.join(format!("{}.wav", stem.to_string_lossy()));

    info!(
        "Converting {} to {}",
        input.display(),
        output.display()
    );

    let status = Command::new("ffmpeg")
        .args(["-y", "-i"])
        .arg(&input)
        .args(["-vn", "-acodec", "pcm_s16le", "-ar", "16000", "-ac", "1"])
        .arg(&output)
        .status()
        .map_err(|e| PrepError::Conversion(format!("Failed to run FFmpeg: {e}")))?;

    if !status.success() {
        return Err(PrepError::Conversion(
            "FFmpeg audio conversion failed".to_string(),
        ));
    }

    if !output.exists() {
        return Err(PrepError::Conversion(
            "Output file was not created".to_string(),
        ));
    }

    debug!("Converted {}", output.display());
    Ok(output)
}
