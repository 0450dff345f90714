/*!
 * Video assembly: timeline tiling, subtitle placement and final compositing.
 *
 * The three stages are deliberately independent:
 * - `timeline`: tiles B-roll clips over the narration duration with crop-to-fill
 * - `subtitles`: turns word timings into overlay events
 * - `compositor`: compiles both plus the voiceover into one ffmpeg render
 */

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod compositor;
pub mod subtitles;
pub mod timeline;

pub use compositor::{render, AudioTrack, Compositor, FfmpegInvocation};
pub use subtitles::{place_cues, OverlayEvent, ScreenPosition, TextStyle, WordCue};
pub use timeline::{build_timeline, total_display_duration, BRollSegment, ClipSource, CropRect};

/// Output frame size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width divided by height
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Render settings, built once from the application config and never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    /// Output resolution
    pub resolution: Resolution,
    /// Output frame rate
    pub fps: u32,
    /// Subtitle font family
    pub font: String,
    /// Subtitle font size in pixels
    pub font_size: u32,
    /// Subtitle fill color
    pub fill_color: String,
    /// Subtitle outline color
    pub stroke_color: String,
    /// Subtitle outline width
    pub stroke_width: u32,
    /// Words per subtitle chunk (not used for grouping, see `subtitles::place_cues`)
    pub max_words_per_chunk: usize,
    /// ffmpeg video encoder
    pub video_codec: String,
    /// ffmpeg audio encoder
    pub audio_codec: String,
    /// Allowed drift between picture and voiceover, in seconds
    pub duration_tolerance: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            resolution: Resolution::new(1080, 1920),
            fps: 30,
            font: "DejaVu Sans".to_string(),
            font_size: 90,
            fill_color: "white".to_string(),
            stroke_color: "black".to_string(),
            stroke_width: 2,
            max_words_per_chunk: 3,
            video_codec: "libx264".to_string(),
            audio_codec: "aac".to_string(),
            duration_tolerance: 0.1,
        }
    }
}
