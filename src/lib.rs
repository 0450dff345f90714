/*!
 * # autoshorts - short-form narrated video generator
 *
 * Turns a topic into a narrated short video: an LLM writes scenes, a TTS
 * engine reads them, stock footage is fetched per scene, Whisper aligns the
 * words, and ffmpeg composites footage, word-by-word subtitles and voiceover.
 *
 * ## Architecture
 *
 * - `assembly`: the core, free of network access:
 *   - `assembly::timeline`: B-roll timeline construction and crop math
 *   - `assembly::subtitles`: word cues to timed overlay events
 *   - `assembly::compositor`: ffmpeg filter graph and final render
 * - `media_probe`: ffprobe duration and dimension queries
 * - `script`: scene generation through `providers`
 * - `providers`: LLM clients (Gemini, Ollama, mock)
 * - `voiceover`: edge-tts narration
 * - `footage`: Pexels search and download cache
 * - `alignment`: Whisper word timestamps
 * - `drive`: Google Drive project upload
 * - `file_utils`: project layout and file system helpers
 * - `app_controller`: the script / render / upload workflow
 * - `app_config`: configuration management
 * - `errors`: custom error types
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod alignment;
pub mod app_config;
pub mod app_controller;
pub mod assembly;
pub mod drive;
pub mod errors;
pub mod file_utils;
pub mod footage;
pub mod media_probe;
pub mod providers;
pub mod script;
pub mod voiceover;

// Re-export main types for easier usage
pub use app_config::Config;
pub use assembly::{
    build_timeline, place_cues, render, AudioTrack, BRollSegment, ClipSource, OverlayEvent,
    RenderConfig, Resolution, WordCue,
};
pub use errors::{AppError, AssemblyError, ProviderError};
pub use script::Scene;
