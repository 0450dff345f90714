use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::{debug, info};
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

use crate::app_config::VoiceConfig;
use crate::assembly::AudioTrack;
use crate::file_utils::FileManager;
use crate::media_probe::{filter_ffmpeg_stderr, probe_duration};

/// Upper bound for one synthesis run
const TTS_TIMEOUT: Duration = Duration::from_secs(300);

/// Turns narration text into an audio file
#[async_trait]
pub trait VoiceSynthesizer: Send + Sync {
    /// Write speech for `text` to `output` and return the resulting track
    async fn synthesize(&self, text: &str, output: &Path) -> Result<AudioTrack>;
}

/// Neural voices through the `edge-tts` command line tool
#[derive(Debug, Clone)]
pub struct EdgeTts {
    executable: String,
    voice: String,
    rate: String,
    pitch: String,
}

impl EdgeTts {
    pub fn new(
        executable: impl Into<String>,
        voice: impl Into<String>,
        rate: impl Into<String>,
        pitch: impl Into<String>,
    ) -> Self {
        Self {
            executable: executable.into(),
            voice: voice.into(),
            rate: rate.into(),
            pitch: pitch.into(),
        }
    }

    pub fn from_config(config: &VoiceConfig) -> Self {
        Self::new(
            config.executable.clone(),
            config.voice_model.clone(),
            config.tts_rate.clone(),
            config.tts_pitch.clone(),
        )
    }

    /// Command line arguments for one run
    pub fn build_args(&self, text: &str, output: &Path) -> Vec<String> {
        // `=` form keeps values like "-5%" from being read as flags
        vec![
            format!("--voice={}", self.voice),
            format!("--rate={}", self.rate),
            format!("--pitch={}", self.pitch),
            "--text".to_string(),
            text.to_string(),
            "--write-media".to_string(),
            output.to_string_lossy().to_string(),
        ]
    }
}

#[async_trait]
impl VoiceSynthesizer for EdgeTts {
    async fn synthesize(&self, text: &str, output: &Path) -> Result<AudioTrack> {
        if text.trim().is_empty() {
            return Err(anyhow!("Narration text is empty"));
        }
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            FileManager::ensure_dir(parent)?;
        }

        info!("Synthesizing voiceover with {} ({} chars)", self.voice, text.chars().count());

        let tts_future = Command::new(&self.executable)
            .args(self.build_args(text, output))
            .output();

        let result = tokio::select! {
            result = tts_future => {
                result.with_context(|| format!("Failed to execute {}", self.executable))?
            },
            _ = tokio::time::sleep(TTS_TIMEOUT) => {
                return Err(anyhow!("{} timed out after {} seconds", self.executable, TTS_TIMEOUT.as_secs()));
            }
        };

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(anyhow!(
                "{} failed: {}",
                self.executable,
                filter_ffmpeg_stderr(&stderr)
            ));
        }

        if !FileManager::file_exists(output) {
            return Err(anyhow!("Voiceover was not written to {:?}", output));
        }

        let duration = probe_duration(output).await?;
        debug!("Voiceover duration: {:.3}s", duration);
        Ok(AudioTrack::new(output, duration))
    }
}
