use log::{debug, error};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

use crate::assembly::ClipSource;
use crate::errors::AssemblyError;

/// Upper bound for one ffprobe call
const PROBE_TIMEOUT: Duration = Duration::from_secs(60);

/// Run ffprobe with the given arguments followed by `path` and return stdout
async fn run_ffprobe(args: &[&str], path: &Path) -> Result<String, AssemblyError> {
    if !path.exists() {
        return Err(AssemblyError::MissingAsset(path.to_path_buf()));
    }

    let ffprobe_future = Command::new("ffprobe")
        .args(args)
        .arg(path)
        .output();

    let output = tokio::select! {
        result = ffprobe_future => {
            result.map_err(|e| AssemblyError::Probe(format!("Failed to execute ffprobe command: {}", e)))?
        },
        _ = tokio::time::sleep(PROBE_TIMEOUT) => {
            return Err(AssemblyError::Probe(format!(
                "ffprobe timed out after {} seconds on {}",
                PROBE_TIMEOUT.as_secs(),
                path.display()
            )));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        error!("ffprobe failed on {}: {}", path.display(), stderr.trim());
        return Err(AssemblyError::Probe(format!(
            "ffprobe failed for {}: {}",
            path.display(),
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Container duration in seconds
pub async fn probe_duration(path: &Path) -> Result<f64, AssemblyError> {
    let stdout = run_ffprobe(
        &[
            "-v", "error",
            "-show_entries", "format=duration",
            "-of", "default=noprint_wrappers=1:nokey=1",
        ],
        path,
    )
    .await?;

    parse_duration(&stdout).ok_or_else(|| {
        AssemblyError::Probe(format!(
            "Unreadable duration '{}' for {}",
            stdout,
            path.display()
        ))
    })
}

/// Width and height of the first video stream
pub async fn probe_dimensions(path: &Path) -> Result<(u32, u32), AssemblyError> {
    let stdout = run_ffprobe(
        &[
            "-v", "error",
            "-select_streams", "v:0",
            "-show_entries", "stream=width,height",
            "-of", "csv=s=x:p=0",
        ],
        path,
    )
    .await?;

    parse_dimensions(&stdout).ok_or_else(|| {
        AssemblyError::Probe(format!(
            "Unreadable dimensions '{}' for {}",
            stdout,
            path.display()
        ))
    })
}

/// Probe one footage file into a timeline candidate
pub async fn probe_clip(path: &Path) -> Result<ClipSource, AssemblyError> {
    let duration = probe_duration(path).await?;
    let (width, height) = probe_dimensions(path).await?;
    debug!("Probed {}: {:.2}s {}x{}", path.display(), duration, width, height);
    Ok(ClipSource::new(path, duration, width, height))
}

/// Probe footage files one after another, preserving order
pub async fn probe_clips(paths: &[PathBuf]) -> Result<Vec<ClipSource>, AssemblyError> {
    let mut clips = Vec::with_capacity(paths.len());
    for path in paths {
        clips.push(probe_clip(path).await?);
    }
    Ok(clips)
}

/// Parse ffprobe's `format=duration` output
pub fn parse_duration(output: &str) -> Option<f64> {
    output
        .lines()
        .next()
        .and_then(|line| line.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
}

/// Parse ffprobe's `WIDTHxHEIGHT` csv output
pub fn parse_dimensions(output: &str) -> Option<(u32, u32)> {
    let line = output.lines().next()?.trim();
    // Some containers report a trailing separator, e.g. "1920x1080x"
    let mut parts = line.split('x').filter(|p| !p.is_empty());
    let width = parts.next()?.parse::<u32>().ok()?;
    let height = parts.next()?.parse::<u32>().ok()?;
    Some((width, height))
}

/// Filter ffmpeg stderr to only show meaningful error lines, stripping the
/// version banner, build configuration, and stream metadata noise.
pub fn filter_ffmpeg_stderr(stderr: &str) -> String {
    let noise_prefixes = [
        "ffmpeg version",
        "built with",
        "configuration:",
        "lib",
        "Input #",
        "Metadata:",
        "Duration:",
        "Stream #",
        "Output #",
        "Stream mapping:",
        "Press [q]",
        "encoder",
        "major_brand",
        "minor_version",
        "compatible_brands",
        "creation_time",
        "handler_name",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                return false;
            }
            !noise_prefixes.iter().any(|p| trimmed.starts_with(p))
        })
        .collect();

    if meaningful.is_empty() {
        "unknown ffmpeg error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}
