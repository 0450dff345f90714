/*!
 * Tests for application configuration functionality
 */

use autoshorts::app_config::{Config, LogLevel, ScriptProvider, VideoFormat};
use autoshorts::assembly::Resolution;
use std::str::FromStr;

fn config_with_key() -> Config {
    let mut config = Config::default();
    for provider in &mut config.script.available_providers {
        if provider.provider_type == "gemini" {
            provider.api_key = "test-key".to_string();
        }
    }
    config
}

/// Test default configuration values
#[test]
fn test_defaultConfig_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.video.resolution, [1080, 1920]);
    assert_eq!(config.video.fps, 30);
    assert_eq!(config.video.target_duration_seconds, 60);
    assert_eq!(config.video.video_codec, "libx264");
    assert_eq!(config.video.audio_codec, "aac");
    assert_eq!(config.pacing.b_roll_duration_seconds, 4.0);
    assert_eq!(config.subtitles.font_size, 90);
    assert_eq!(config.subtitles.stroke_width, 2);
    assert_eq!(config.voice.voice_model, "en-US-ChristopherNeural");
    assert_eq!(config.script.provider, ScriptProvider::Gemini);
    assert_eq!(config.script.temperature, 0.7);
    assert_eq!(config.script.get_model(), "gemini-2.5-pro");
    assert_eq!(config.footage.per_page, 5);
    assert_eq!(config.alignment.model, "base");
    assert_eq!(config.drive.root_folder, "youtube-video-generator");
    assert_eq!(config.log_level, LogLevel::Info);
}

/// Test configuration validation
#[test]
fn test_configValidation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = config_with_key();
    assert!(config.validate().is_ok());

    config.video.resolution = [1081, 1920];
    assert!(config.validate().is_err());
    config.video.resolution = [0, 1920];
    assert!(config.validate().is_err());
    config.video.resolution = [1080, 1920];

    config.video.fps = 0;
    assert!(config.validate().is_err());
    config.video.fps = 30;

    config.pacing.b_roll_duration_seconds = 0.0;
    assert!(config.validate().is_err());
    config.pacing.b_roll_duration_seconds = 4.0;

    config.script.temperature = 1.5;
    assert!(config.validate().is_err());
    config.script.temperature = 0.7;

    assert!(config.validate().is_ok());
}

#[test]
fn test_validate_withGeminiAndNoKey_shouldFailButRenderValidationPasses() {
    let config = Config::default();
    assert!(config.validate().is_err());
    assert!(config.validate_render().is_ok());
}

#[test]
fn test_validate_withOllama_shouldNotNeedKey() {
    let mut config = Config::default();
    config.script.provider = ScriptProvider::Ollama;
    assert!(config.validate().is_ok());
    assert_eq!(config.script.get_endpoint(), "http://localhost:11434");
}

#[test]
fn test_setFormat_shouldSwitchResolutionAndOrientation() {
    let mut config = Config::default();
    assert_eq!(config.footage_orientation(), "portrait");

    config.set_format(VideoFormat::Horizontal);
    assert_eq!(config.video.resolution, [1920, 1080]);
    assert_eq!(config.footage_orientation(), "landscape");
}

#[test]
fn test_renderConfig_shouldMirrorSettings() {
    let mut config = Config::default();
    config.subtitles.font_family = "Impact".to_string();
    config.video.fps = 25;

    let render = config.render_config();
    assert_eq!(render.resolution, Resolution::new(1080, 1920));
    assert_eq!(render.fps, 25);
    assert_eq!(render.font, "Impact");
    assert_eq!(render.max_words_per_chunk, 3);
    assert_eq!(render.duration_tolerance, 0.1);
}

#[test]
fn test_configDeserialize_withPartialJson_shouldFillDefaults() {
    let json = r#"{
        "video": { "fps": 24 },
        "script": { "provider": "ollama" },
        "log_level": "debug"
    }"#;
    let config: Config = serde_json::from_str(json).unwrap();

    assert_eq!(config.video.fps, 24);
    assert_eq!(config.video.resolution, [1080, 1920]);
    assert_eq!(config.script.provider, ScriptProvider::Ollama);
    assert_eq!(config.log_level, LogLevel::Debug);
    assert_eq!(config.subtitles.fill_color, "white");
}

#[test]
fn test_scriptProvider_fromStr_shouldBeCaseInsensitive() {
    assert_eq!(ScriptProvider::from_str("Gemini").unwrap(), ScriptProvider::Gemini);
    assert_eq!(ScriptProvider::from_str("OLLAMA").unwrap(), ScriptProvider::Ollama);
    assert!(ScriptProvider::from_str("openai").is_err());
}
