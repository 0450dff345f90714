use log::debug;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::Resolution;
use crate::errors::AssemblyError;

/// Remaining time below this is treated as fully covered
pub const TIME_EPSILON: f64 = 1e-6;

/// Probed candidate footage file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipSource {
    /// Local file path
    pub path: PathBuf,

    /// Playable length in seconds
    pub duration: f64,

    /// Frame width in pixels
    pub width: u32,

    /// Frame height in pixels
    pub height: u32,
}

impl ClipSource {
    pub fn new(path: impl Into<PathBuf>, duration: f64, width: u32, height: u32) -> Self {
        Self {
            path: path.into(),
            duration,
            width,
            height,
        }
    }
}

/// Scale-then-crop window that fills the target frame with no borders.
///
/// The source is scaled to `scaled_width x scaled_height`, then the
/// `width x height` window at `(x, y)` is kept. `width x height` is always
/// the target resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropRect {
    pub scaled_width: u32,
    pub scaled_height: u32,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    /// Crop-to-fill for a source of the given size.
    ///
    /// A source wider than the target is scaled to the target height and
    /// center-cropped horizontally; anything else is scaled to the target
    /// width and center-cropped vertically. Edge content is lost, the frame
    /// is never letterboxed.
    pub fn fill(source_width: u32, source_height: u32, target: Resolution) -> Self {
        let source_ratio = source_width as f64 / source_height as f64;

        if source_ratio > target.aspect_ratio() {
            let scaled_width = ((source_width as f64 * target.height as f64 / source_height as f64)
                .round() as u32)
                .max(target.width);
            Self {
                scaled_width,
                scaled_height: target.height,
                x: (scaled_width - target.width) / 2,
                y: 0,
                width: target.width,
                height: target.height,
            }
        } else {
            let scaled_height = ((source_height as f64 * target.width as f64 / source_width as f64)
                .round() as u32)
                .max(target.height);
            Self {
                scaled_width: target.width,
                scaled_height,
                x: 0,
                y: (scaled_height - target.height) / 2,
                width: target.width,
                height: target.height,
            }
        }
    }
}

/// One footage file placed on the output timeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BRollSegment {
    /// Footage file
    pub source_path: PathBuf,

    /// Trim window start inside the source, seconds
    pub trim_start: f64,

    /// Trim window end inside the source, seconds
    pub trim_end: f64,

    /// Output timeline start, seconds
    pub display_start: f64,

    /// Output timeline end (exclusive), seconds
    pub display_end: f64,

    /// Scale and crop applied to every frame
    pub crop_rect: CropRect,
}

impl BRollSegment {
    /// On-screen length, equal to the trim window length
    pub fn duration(&self) -> f64 {
        self.display_end - self.display_start
    }
}

/// Sum of display durations across a timeline
pub fn total_display_duration(segments: &[BRollSegment]) -> f64 {
    segments.iter().map(BRollSegment::duration).sum()
}

/// Tile `candidate_clips` over `[0, total_duration)`.
///
/// Clips are used round-robin via `index % len`. Each segment lasts
/// `min(segment_duration, remaining, clip duration)` and always trims from
/// the start of its source. The returned segments are contiguous, do not
/// overlap and end exactly at `total_duration`.
pub fn build_timeline(
    total_duration: f64,
    candidate_clips: &[ClipSource],
    segment_duration: f64,
    target: Resolution,
) -> Result<Vec<BRollSegment>, AssemblyError> {
    if candidate_clips.is_empty() {
        return Err(AssemblyError::NoAssets);
    }
    if !total_duration.is_finite() || total_duration <= 0.0 {
        return Err(AssemblyError::InvalidDuration(total_duration));
    }
    if !segment_duration.is_finite() || segment_duration <= 0.0 {
        return Err(AssemblyError::InvalidDuration(segment_duration));
    }

    let mut segments = Vec::new();
    let mut current_time = 0.0;
    let mut clip_index = 0usize;

    while total_duration - current_time > TIME_EPSILON {
        let clip = &candidate_clips[clip_index % candidate_clips.len()];
        validate_clip(clip)?;

        let remaining = total_duration - current_time;
        let length = segment_duration.min(remaining).min(clip.duration);

        // Snap the last segment so floating point drift never leaves a sliver
        let display_end = if remaining - length <= TIME_EPSILON {
            total_duration
        } else {
            current_time + length
        };

        let segment = BRollSegment {
            source_path: clip.path.clone(),
            trim_start: 0.0,
            trim_end: display_end - current_time,
            display_start: current_time,
            display_end,
            crop_rect: CropRect::fill(clip.width, clip.height, target),
        };

        debug!(
            "Segment {}: {:?} [{:.3}s, {:.3}s)",
            segments.len(),
            segment.source_path,
            segment.display_start,
            segment.display_end
        );

        segments.push(segment);
        current_time = display_end;
        clip_index += 1;
    }

    Ok(segments)
}

fn validate_clip(clip: &ClipSource) -> Result<(), AssemblyError> {
    if !clip.path.exists() {
        return Err(AssemblyError::MissingAsset(clip.path.clone()));
    }
    if !clip.duration.is_finite() || clip.duration <= TIME_EPSILON {
        return Err(AssemblyError::InvalidAsset {
            path: clip.path.clone(),
            reason: format!("duration {} is not positive", clip.duration),
        });
    }
    if clip.width == 0 || clip.height == 0 {
        return Err(AssemblyError::InvalidAsset {
            path: clip.path.clone(),
            reason: format!("frame size {}x{} is empty", clip.width, clip.height),
        });
    }
    Ok(())
}
