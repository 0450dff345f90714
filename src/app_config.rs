use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::PathBuf;

use crate::assembly::{RenderConfig, Resolution};

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and deriving the render settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Output video settings
    #[serde(default)]
    pub video: VideoSettings,

    /// B-roll pacing
    #[serde(default)]
    pub pacing: PacingConfig,

    /// Burned-in subtitle styling
    #[serde(default)]
    pub subtitles: SubtitleStyleConfig,

    /// Voiceover synthesis settings
    #[serde(default)]
    pub voice: VoiceConfig,

    /// Script generation config
    #[serde(default)]
    pub script: ScriptConfig,

    /// Stock footage settings
    #[serde(default)]
    pub footage: FootageConfig,

    /// Speech alignment settings
    #[serde(default)]
    pub alignment: AlignmentConfig,

    /// Cloud upload settings
    #[serde(default)]
    pub drive: DriveConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Output frame orientation
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum VideoFormat {
    // @format: 1080x1920 shorts
    #[default]
    Vertical,
    // @format: 1920x1080
    Horizontal,
}

impl VideoFormat {
    // @returns: Canonical resolution for the format
    pub fn resolution(&self) -> [u32; 2] {
        match self {
            Self::Vertical => [1080, 1920],
            Self::Horizontal => [1920, 1080],
        }
    }
}

/// Output video settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VideoSettings {
    /// Width and height in pixels
    #[serde(default = "default_resolution")]
    pub resolution: [u32; 2],

    /// Output frame rate
    #[serde(default = "default_fps")]
    pub fps: u32,

    /// Approximate narration length requested from the script writer
    #[serde(default = "default_target_duration_seconds")]
    pub target_duration_seconds: u32,

    /// Video encoder passed to ffmpeg
    #[serde(default = "default_video_codec")]
    pub video_codec: String,

    /// Audio encoder passed to ffmpeg
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,

    /// Where project folders are created
    #[serde(default = "default_projects_dir")]
    pub projects_dir: PathBuf,

    /// Allowed drift between picture and voiceover, in seconds
    #[serde(default = "default_duration_tolerance")]
    pub duration_tolerance: f64,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            resolution: default_resolution(),
            fps: default_fps(),
            target_duration_seconds: default_target_duration_seconds(),
            video_codec: default_video_codec(),
            audio_codec: default_audio_codec(),
            projects_dir: default_projects_dir(),
            duration_tolerance: default_duration_tolerance(),
        }
    }
}

/// B-roll pacing
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PacingConfig {
    /// Maximum on-screen time of one B-roll clip
    #[serde(default = "default_b_roll_duration_seconds")]
    pub b_roll_duration_seconds: f64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            b_roll_duration_seconds: default_b_roll_duration_seconds(),
        }
    }
}

/// Burned-in subtitle styling
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SubtitleStyleConfig {
    /// Font family resolved through fontconfig
    #[serde(default = "default_font_family")]
    pub font_family: String,

    /// Font size in pixels
    #[serde(default = "default_font_size")]
    pub font_size: u32,

    /// Text fill color
    #[serde(default = "default_fill_color")]
    pub fill_color: String,

    /// Outline color
    #[serde(default = "default_stroke_color")]
    pub stroke_color: String,

    /// Outline width in pixels
    #[serde(default = "default_stroke_width")]
    pub stroke_width: u32,

    /// Words per subtitle line. Carried for compatibility; cues are placed one word at a time.
    #[serde(default = "default_max_words_per_line")]
    pub max_words_per_line: usize,
}

impl Default for SubtitleStyleConfig {
    fn default() -> Self {
        Self {
            font_family: default_font_family(),
            font_size: default_font_size(),
            fill_color: default_fill_color(),
            stroke_color: default_stroke_color(),
            stroke_width: default_stroke_width(),
            max_words_per_line: default_max_words_per_line(),
        }
    }
}

/// Voiceover synthesis settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VoiceConfig {
    /// edge-tts voice name
    #[serde(default = "default_voice_model")]
    pub voice_model: String,

    /// Speaking rate adjustment, e.g. "+10%"
    #[serde(default = "default_tts_rate")]
    pub tts_rate: String,

    /// Pitch adjustment, e.g. "-5Hz"
    #[serde(default = "default_tts_pitch")]
    pub tts_pitch: String,

    /// Executable to run
    #[serde(default = "default_tts_executable")]
    pub executable: String,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            voice_model: default_voice_model(),
            tts_rate: default_tts_rate(),
            tts_pitch: default_tts_pitch(),
            executable: default_tts_executable(),
        }
    }
}

/// Script provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScriptProvider {
    // @provider: Google Gemini
    #[default]
    Gemini,
    // @provider: Ollama
    Ollama,
}

impl ScriptProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Gemini => "Gemini",
            Self::Ollama => "Ollama",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Gemini => "gemini".to_string(),
            Self::Ollama => "ollama".to_string(),
        }
    }
}

impl std::fmt::Display for ScriptProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for ScriptProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: ScriptProvider) -> Self {
        match provider_type {
            ScriptProvider::Gemini => Self {
                provider_type: "gemini".to_string(),
                model: default_gemini_model(),
                api_key: String::new(),
                endpoint: default_gemini_endpoint(),
                timeout_secs: default_timeout_secs(),
            },
            ScriptProvider::Ollama => Self {
                provider_type: "ollama".to_string(),
                model: default_ollama_model(),
                api_key: String::new(),
                endpoint: default_ollama_endpoint(),
                timeout_secs: default_timeout_secs(),
            },
        }
    }
}

/// Script generation configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ScriptConfig {
    /// Provider to use
    #[serde(default)]
    pub provider: ScriptProvider,

    /// Available providers
    #[serde(default = "default_available_providers")]
    pub available_providers: Vec<ProviderConfig>,

    /// System prompt prepended to the topic
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Temperature parameter for text generation (0.0 to 1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for ScriptConfig {
    fn default() -> Self {
        Self {
            provider: ScriptProvider::default(),
            available_providers: default_available_providers(),
            system_prompt: default_system_prompt(),
            temperature: default_temperature(),
        }
    }
}

impl ScriptConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        match self.provider {
            ScriptProvider::Gemini => default_gemini_model(),
            ScriptProvider::Ollama => default_ollama_model(),
        }
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.api_key.is_empty() {
                return provider_config.api_key.clone();
            }
        }

        // Ollama doesn't use API keys
        String::new()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        match self.provider {
            ScriptProvider::Gemini => default_gemini_endpoint(),
            ScriptProvider::Ollama => default_ollama_endpoint(),
        }
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        self.get_active_provider_config()
            .map(|p| p.timeout_secs)
            .filter(|t| *t > 0)
            .unwrap_or_else(default_timeout_secs)
    }
}

/// Stock footage settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FootageConfig {
    /// Pexels API key
    #[serde(default = "String::new")]
    pub api_key: String,

    /// Pexels API base URL
    #[serde(default = "default_pexels_endpoint")]
    pub endpoint: String,

    /// Minimum video size class ("large", "medium", "small")
    #[serde(default = "default_footage_size")]
    pub size: String,

    /// How many search results to choose from
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

impl Default for FootageConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_pexels_endpoint(),
            size: default_footage_size(),
            per_page: default_per_page(),
        }
    }
}

/// Speech alignment settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AlignmentConfig {
    /// Whisper CLI executable
    #[serde(default = "default_whisper_executable")]
    pub executable: String,

    /// Whisper model name
    #[serde(default = "default_whisper_model")]
    pub model: String,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            executable: default_whisper_executable(),
            model: default_whisper_model(),
        }
    }
}

/// Cloud upload settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DriveConfig {
    /// OAuth access token; acquiring it is left to the user
    #[serde(default = "String::new")]
    pub access_token: String,

    /// Top-level folder that receives one subfolder per project
    #[serde(default = "default_drive_root_folder")]
    pub root_folder: String,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            root_folder: default_drive_root_folder(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

fn default_resolution() -> [u32; 2] {
    VideoFormat::Vertical.resolution()
}

fn default_fps() -> u32 {
    30
}

fn default_target_duration_seconds() -> u32 {
    60
}

fn default_video_codec() -> String {
    "libx264".to_string()
}

fn default_audio_codec() -> String {
    "aac".to_string()
}

fn default_projects_dir() -> PathBuf {
    PathBuf::from("projects")
}

fn default_duration_tolerance() -> f64 {
    0.1
}

fn default_b_roll_duration_seconds() -> f64 {
    4.0
}

fn default_font_family() -> String {
    "DejaVu Sans".to_string()
}

fn default_font_size() -> u32 {
    90
}

fn default_fill_color() -> String {
    "white".to_string()
}

fn default_stroke_color() -> String {
    "black".to_string()
}

fn default_stroke_width() -> u32 {
    2
}

fn default_max_words_per_line() -> usize {
    3
}

fn default_voice_model() -> String {
    "en-US-ChristopherNeural".to_string()
}

fn default_tts_rate() -> String {
    "+0%".to_string()
}

fn default_tts_pitch() -> String {
    "+0Hz".to_string()
}

fn default_tts_executable() -> String {
    "edge-tts".to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_gemini_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.5-pro".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:3b".to_string()
}

fn default_available_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig::new(ScriptProvider::Gemini),
        ProviderConfig::new(ScriptProvider::Ollama),
    ]
}

fn default_system_prompt() -> String {
    "You are a scriptwriter for short vertical videos. Write a punchy narration about the topic, split into short scenes. For each scene give the narration text and a concrete stock-footage search query describing what should be on screen.".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_pexels_endpoint() -> String {
    "https://api.pexels.com".to_string()
}

fn default_footage_size() -> String {
    "medium".to_string()
}

fn default_per_page() -> u32 {
    5
}

fn default_whisper_executable() -> String {
    "whisper".to_string()
}

fn default_whisper_model() -> String {
    "base".to_string()
}

fn default_drive_root_folder() -> String {
    "youtube-video-generator".to_string()
}

impl Config {
    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        self.validate_render()?;

        if !(0.0..=1.0).contains(&self.script.temperature) {
            return Err(anyhow!("Temperature must be between 0.0 and 1.0"));
        }

        if self.script.provider == ScriptProvider::Gemini && self.script.get_api_key().is_empty() {
            return Err(anyhow!("API key is required for Gemini provider (set it in the config or GEMINI_API_KEY)"));
        }

        Ok(())
    }

    /// Validate only what rendering and uploading depend on
    pub fn validate_render(&self) -> Result<()> {
        let [width, height] = self.video.resolution;
        if width == 0 || height == 0 {
            return Err(anyhow!("Resolution must be non-zero, got {}x{}", width, height));
        }
        // yuv420p needs even dimensions
        if width % 2 != 0 || height % 2 != 0 {
            return Err(anyhow!("Resolution must have even dimensions, got {}x{}", width, height));
        }

        if self.video.fps == 0 {
            return Err(anyhow!("Frame rate must be positive"));
        }

        let segment = self.pacing.b_roll_duration_seconds;
        if !segment.is_finite() || segment <= 0.0 {
            return Err(anyhow!("B-roll duration must be positive, got {}", segment));
        }

        Ok(())
    }

    /// Fill empty secrets from the environment
    pub fn apply_env_overrides(&mut self) {
        if let Some(gemini) = self.script.available_providers.iter_mut()
            .find(|p| p.provider_type == "gemini")
        {
            if gemini.api_key.is_empty() {
                if let Ok(key) = std::env::var("GEMINI_API_KEY") {
                    gemini.api_key = key;
                }
            }
        }

        if self.footage.api_key.is_empty() {
            if let Ok(key) = std::env::var("PEXELS_API_KEY") {
                self.footage.api_key = key;
            }
        }

        if self.drive.access_token.is_empty() {
            if let Ok(token) = std::env::var("GOOGLE_DRIVE_TOKEN") {
                self.drive.access_token = token;
            }
        }
    }

    /// Switch to the canonical resolution of a format
    pub fn set_format(&mut self, format: VideoFormat) {
        self.video.resolution = format.resolution();
    }

    // @returns: Orientation keyword understood by stock footage search
    pub fn footage_orientation(&self) -> &'static str {
        let [width, height] = self.video.resolution;
        if height > width { "portrait" } else { "landscape" }
    }

    /// Derive the immutable render settings
    pub fn render_config(&self) -> RenderConfig {
        let [width, height] = self.video.resolution;
        RenderConfig {
            resolution: Resolution::new(width, height),
            fps: self.video.fps,
            font: self.subtitles.font_family.clone(),
            font_size: self.subtitles.font_size,
            fill_color: self.subtitles.fill_color.clone(),
            stroke_color: self.subtitles.stroke_color.clone(),
            stroke_width: self.subtitles.stroke_width,
            max_words_per_chunk: self.subtitles.max_words_per_line,
            video_codec: self.video.video_codec.clone(),
            audio_codec: self.video.audio_codec.clone(),
            duration_tolerance: self.video.duration_tolerance,
        }
    }
}
