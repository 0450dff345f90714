use log::{debug, error, info};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use super::subtitles::OverlayEvent;
use super::timeline::{total_display_duration, BRollSegment};
use super::RenderConfig;
use crate::errors::AssemblyError;
use crate::file_utils::FileManager;
use crate::media_probe::filter_ffmpeg_stderr;

const FFMPEG: &str = "ffmpeg";

/// Voiceover handed over by the voiceover generator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioTrack {
    pub path: PathBuf,
    /// Authoritative program length in seconds
    pub duration: f64,
}

impl AudioTrack {
    pub fn new(path: impl Into<PathBuf>, duration: f64) -> Self {
        Self {
            path: path.into(),
            duration,
        }
    }
}

/// A compiled ffmpeg command line and the filter graph it reads
#[derive(Debug, Clone)]
pub struct FfmpegInvocation {
    pub args: Vec<String>,
    pub filter_graph: String,
}

/// Renders a timeline, overlays and voiceover into one file
#[derive(Debug, Clone)]
pub struct Compositor {
    render_config: RenderConfig,
}

impl Compositor {
    pub fn new(render_config: RenderConfig) -> Self {
        Self { render_config }
    }

    pub fn render_config(&self) -> &RenderConfig {
        &self.render_config
    }

    /// Reject inputs that cannot produce a correct render.
    ///
    /// Runs before any encode work: every source must exist and the picture
    /// must last as long as the voiceover, within the configured tolerance.
    pub fn check_inputs(
        &self,
        segments: &[BRollSegment],
        audio: &AudioTrack,
    ) -> Result<(), AssemblyError> {
        if segments.is_empty() {
            return Err(AssemblyError::Render("timeline has no segments".to_string()));
        }
        if !audio.path.exists() {
            return Err(AssemblyError::MissingAsset(audio.path.clone()));
        }
        if !audio.duration.is_finite() || audio.duration <= 0.0 {
            return Err(AssemblyError::InvalidDuration(audio.duration));
        }
        if let Some(missing) = segments.iter().find(|s| !s.source_path.exists()) {
            return Err(AssemblyError::MissingAsset(missing.source_path.clone()));
        }

        let visual_duration = total_display_duration(segments);
        let drift = (visual_duration - audio.duration).abs();
        if drift > self.render_config.duration_tolerance {
            return Err(AssemblyError::Render(format!(
                "visual timeline lasts {:.3}s but the voiceover lasts {:.3}s (tolerance {:.3}s)",
                visual_duration, audio.duration, self.render_config.duration_tolerance
            )));
        }

        Ok(())
    }

    /// Build the ffmpeg arguments without running anything.
    ///
    /// Input `i` is segment `i`; the voiceover is the last input. The filter
    /// graph is read from `filter_script`, which the caller must write.
    pub fn compile(
        &self,
        segments: &[BRollSegment],
        events: &[OverlayEvent],
        audio: &AudioTrack,
        output: &Path,
        filter_script: &Path,
    ) -> Result<FfmpegInvocation, AssemblyError> {
        self.check_inputs(segments, audio)?;

        let mut args: Vec<String> = vec![
            "-y".into(),
            "-hide_banner".into(),
            "-loglevel".into(),
            "error".into(),
        ];

        for segment in segments {
            args.push("-ss".into());
            args.push(format_time(segment.trim_start));
            args.push("-t".into());
            args.push(format_time(segment.trim_end - segment.trim_start));
            args.push("-i".into());
            args.push(segment.source_path.to_string_lossy().into_owned());
        }

        let audio_index = segments.len();
        args.push("-i".into());
        args.push(audio.path.to_string_lossy().into_owned());

        let filter_graph = self.build_filter_graph(segments, events);
        args.push("-filter_complex_script".into());
        args.push(filter_script.to_string_lossy().into_owned());

        args.push("-map".into());
        args.push("[outv]".into());
        args.push("-map".into());
        args.push(format!("{}:a:0", audio_index));

        args.extend([
            "-c:v".to_string(),
            self.render_config.video_codec.clone(),
            "-preset".to_string(),
            "medium".to_string(),
            "-crf".to_string(),
            "20".to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            "-r".to_string(),
            self.render_config.fps.to_string(),
            "-c:a".to_string(),
            self.render_config.audio_codec.clone(),
            "-b:a".to_string(),
            "192k".to_string(),
            "-t".to_string(),
            format_time(audio.duration),
            "-movflags".to_string(),
            "+faststart".to_string(),
        ]);
        args.push(output.to_string_lossy().into_owned());

        Ok(FfmpegInvocation { args, filter_graph })
    }

    /// Filter graph: normalize every segment, concatenate, then draw subtitles.
    pub fn build_filter_graph(&self, segments: &[BRollSegment], events: &[OverlayEvent]) -> String {
        let mut filters = Vec::with_capacity(segments.len() + 2);
        let mut concat_inputs = String::new();

        for (idx, segment) in segments.iter().enumerate() {
            let crop = &segment.crop_rect;
            filters.push(format!(
                "[{input}:v]trim=duration={dur},setpts=PTS-STARTPTS,scale={sw}:{sh}:flags=lanczos,crop={w}:{h}:{x}:{y},setsar=1,fps={fps},format=yuv420p[v{idx}]",
                input = idx,
                dur = format_time(segment.duration()),
                sw = crop.scaled_width,
                sh = crop.scaled_height,
                w = crop.width,
                h = crop.height,
                x = crop.x,
                y = crop.y,
                fps = self.render_config.fps,
                idx = idx,
            ));
            concat_inputs.push_str(&format!("[v{}]", idx));
        }

        filters.push(format!(
            "{inputs}concat=n={count}:v=1:a=0[base]",
            inputs = concat_inputs,
            count = segments.len()
        ));

        if events.is_empty() {
            filters.push("[base]copy[outv]".to_string());
        } else {
            let drawtexts: Vec<String> = events.iter().map(build_drawtext_filter).collect();
            filters.push(format!("[base]{}[outv]", drawtexts.join(",")));
        }

        filters.join(";\n")
    }

    /// Render the final video.
    ///
    /// Inputs are checked first, so a missing file or a duration mismatch
    /// fails before ffmpeg is started.
    pub async fn render(
        &self,
        segments: &[BRollSegment],
        events: &[OverlayEvent],
        audio: &AudioTrack,
        output: &Path,
    ) -> Result<PathBuf, AssemblyError> {
        self.check_inputs(segments, audio)?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            FileManager::ensure_dir(parent)
                .map_err(|e| AssemblyError::Render(format!("{:#}", e)))?;
        }

        let mut script = tempfile::Builder::new()
            .prefix("autoshorts-filter-")
            .suffix(".txt")
            .tempfile()
            .map_err(|e| AssemblyError::Render(format!("Failed to create filter script: {}", e)))?;

        let invocation = self.compile(segments, events, audio, output, script.path())?;
        script
            .write_all(invocation.filter_graph.as_bytes())
            .and_then(|_| script.flush())
            .map_err(|e| AssemblyError::Render(format!("Failed to write filter script: {}", e)))?;

        info!(
            "Rendering {} segments and {} subtitles to {}",
            segments.len(),
            events.len(),
            output.display()
        );
        debug!("ffmpeg {}", invocation.args.join(" "));

        let result = Command::new(FFMPEG)
            .args(&invocation.args)
            .output()
            .await
            .map_err(|e| AssemblyError::Render(format!("Failed to execute {}: {}", FFMPEG, e)))?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let filtered = filter_ffmpeg_stderr(&stderr);
            error!("Render failed: {}", filtered);
            return Err(AssemblyError::Render(filtered));
        }

        if !output.exists() {
            return Err(AssemblyError::Render(format!(
                "ffmpeg exited successfully but {} was not written",
                output.display()
            )));
        }

        Ok(output.to_path_buf())
    }
}

/// Render with a one-off compositor
pub async fn render(
    segments: &[BRollSegment],
    events: &[OverlayEvent],
    audio: &AudioTrack,
    render_config: &RenderConfig,
    output: &Path,
) -> Result<PathBuf, AssemblyError> {
    Compositor::new(render_config.clone())
        .render(segments, events, audio, output)
        .await
}

fn build_drawtext_filter(event: &OverlayEvent) -> String {
    let style = &event.style;
    format!(
        "drawtext=font={font}:text={text}:expansion=none:fontsize={size}:fontcolor={fill}:bordercolor={stroke}:borderw={border}:x=(w-text_w)/2:y=(h-text_h)/2:enable='gte(t,{start})*lt(t,{end})'",
        font = escape_drawtext(&style.font),
        text = escape_drawtext(&event.text),
        size = style.font_size_for(&event.text),
        fill = style.fill_color,
        stroke = style.stroke_color,
        border = style.stroke_width,
        start = format_time(event.start),
        end = format_time(event.end),
    )
}

// Option separators and quoting inside one filter's arguments
const OPTION_SPECIAL_CHARS: &[char] = &['\\', '\'', ':'];

// Filter and link separators of the graph itself
const GRAPH_SPECIAL_CHARS: &[char] = &['\\', '\'', '[', ']', ',', ';'];

/// Escape a drawtext option value placed in a filter graph.
///
/// ffmpeg unescapes the value twice: once while splitting the graph into
/// filters and once while splitting a filter's arguments into options. The
/// value is backslash-escaped for the option level first, then the result is
/// escaped again for the graph level.
pub fn escape_drawtext(value: &str) -> String {
    let flattened = value.replace(['\n', '\r'], " ");
    let option_level = backslash_escape(&flattened, OPTION_SPECIAL_CHARS);
    backslash_escape(&option_level, GRAPH_SPECIAL_CHARS)
}

fn backslash_escape(value: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if special.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Fixed-precision seconds for ffmpeg arguments
pub fn format_time(value: f64) -> String {
    format!("{value:.6}")
}
