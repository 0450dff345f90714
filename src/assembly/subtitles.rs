use log::warn;
use serde::{Deserialize, Serialize};

use super::RenderConfig;

/// Horizontal margin kept free on each side of a subtitle line
const SUBTITLE_SIDE_MARGIN: u32 = 50;

/// Rough advance width of one glyph relative to the font size
const GLYPH_WIDTH_FACTOR: f64 = 0.6;

/// One transcribed word with its time bounds in seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordCue {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

impl WordCue {
    pub fn new(word: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            word: word.into(),
            start,
            end,
        }
    }
}

/// Where an overlay sits in the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenPosition {
    Center,
}

/// Fixed text styling shared by every overlay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub font: String,
    pub font_size: u32,
    pub fill_color: String,
    pub stroke_color: String,
    pub stroke_width: u32,
    /// Widest a line may get before the font is shrunk
    pub max_text_width: u32,
}

impl TextStyle {
    pub fn from_render_config(config: &RenderConfig) -> Self {
        Self {
            font: config.font.clone(),
            font_size: config.font_size,
            fill_color: config.fill_color.clone(),
            stroke_color: config.stroke_color.clone(),
            stroke_width: config.stroke_width,
            max_text_width: config
                .resolution
                .width
                .saturating_sub(SUBTITLE_SIDE_MARGIN * 2)
                .max(1),
        }
    }

    /// Font size that keeps `text` inside `max_text_width`.
    ///
    /// drawtext never wraps, so long words get a smaller size instead.
    pub fn font_size_for(&self, text: &str) -> u32 {
        let chars = text.chars().count().max(1) as f64;
        let estimated_width = chars * self.font_size as f64 * GLYPH_WIDTH_FACTOR;
        if estimated_width <= self.max_text_width as f64 {
            return self.font_size;
        }
        let fitted = self.max_text_width as f64 / (chars * GLYPH_WIDTH_FACTOR);
        (fitted.floor() as u32).clamp(1, self.font_size)
    }
}

/// A subtitle visible on [start, end)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayEvent {
    pub text: String,
    pub start: f64,
    pub end: f64,
    pub position: ScreenPosition,
    pub style: TextStyle,
}

/// Turn word timings into overlay events, one per word.
///
/// Order and count are preserved exactly. Cues are not sorted or merged, so
/// overlapping words stay overlapping; out-of-order or empty-interval cues
/// are reported with a warning and passed through.
pub fn place_cues(word_cues: &[WordCue], config: &RenderConfig) -> Vec<OverlayEvent> {
    let style = TextStyle::from_render_config(config);
    let mut previous_start = f64::NEG_INFINITY;

    word_cues
        .iter()
        .enumerate()
        .map(|(index, cue)| {
            if cue.start < previous_start {
                warn!(
                    "Word cue {} ('{}') starts at {:.3}s, before the previous cue at {:.3}s",
                    index, cue.word, cue.start, previous_start
                );
            }
            if cue.end <= cue.start {
                warn!(
                    "Word cue {} ('{}') has an empty interval [{:.3}s, {:.3}s) and will not be visible",
                    index, cue.word, cue.start, cue.end
                );
            }
            previous_start = cue.start;

            OverlayEvent {
                text: cue.word.clone(),
                start: cue.start,
                end: cue.end,
                position: ScreenPosition::Center,
                style: style.clone(),
            }
        })
        .collect()
}
