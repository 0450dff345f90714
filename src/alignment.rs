use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::process::Command;

use crate::app_config::AlignmentConfig;
use crate::assembly::WordCue;
use crate::file_utils::FileManager;
use crate::media_probe::filter_ffmpeg_stderr;

/// Subdirectory of the user cache that receives Whisper transcripts
const WORK_DIRNAME: &str = "autoshorts/whisper";

/// Produces word timings for a narration track
#[async_trait]
pub trait WordAligner: Send + Sync {
    /// Transcribe `audio` into cues in spoken order
    async fn align(&self, audio: &Path) -> Result<Vec<WordCue>>;
}

/// Whisper transcript as written by `--output_format json`
#[derive(Debug, Deserialize)]
pub struct WhisperTranscript {
    #[serde(default)]
    pub segments: Vec<WhisperSegment>,
}

#[derive(Debug, Deserialize)]
pub struct WhisperSegment {
    #[serde(default)]
    pub words: Vec<WhisperWord>,
}

#[derive(Debug, Deserialize)]
pub struct WhisperWord {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

/// Runs the Whisper command line tool with word timestamps enabled
#[derive(Debug, Clone)]
pub struct WhisperAligner {
    executable: String,
    model: String,
    work_dir: PathBuf,
}

impl WhisperAligner {
    pub fn new(executable: impl Into<String>, model: impl Into<String>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            model: model.into(),
            work_dir: work_dir.into(),
        }
    }

    pub fn from_config(config: &AlignmentConfig, work_dir: impl Into<PathBuf>) -> Self {
        Self::new(config.executable.clone(), config.model.clone(), work_dir)
    }

    /// Transcript directory under the user cache, if one can be determined
    pub fn default_work_dir() -> Result<PathBuf> {
        let base_dir = dirs::cache_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
            .ok_or_else(|| anyhow!("Could not determine cache directory"))?;
        Ok(base_dir.join(WORK_DIRNAME))
    }

    /// Command line arguments for one transcription
    pub fn build_args(&self, audio: &Path) -> Vec<String> {
        vec![
            audio.to_string_lossy().to_string(),
            "--model".to_string(),
            self.model.clone(),
            "--word_timestamps".to_string(),
            "True".to_string(),
            "--output_format".to_string(),
            "json".to_string(),
            "--output_dir".to_string(),
            self.work_dir.to_string_lossy().to_string(),
        ]
    }

    /// Where Whisper writes the transcript for `audio`
    pub fn transcript_path(&self, audio: &Path) -> PathBuf {
        let stem = audio.file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio".to_string());
        self.work_dir.join(format!("{}.json", stem))
    }
}

#[async_trait]
impl WordAligner for WhisperAligner {
    async fn align(&self, audio: &Path) -> Result<Vec<WordCue>> {
        if !FileManager::file_exists(audio) {
            return Err(anyhow!("Audio file does not exist: {:?}", audio));
        }
        FileManager::ensure_dir(&self.work_dir)?;

        info!("Aligning words with whisper model '{}'", self.model);
        let output = Command::new(&self.executable)
            .args(self.build_args(audio))
            .output()
            .await
            .with_context(|| format!("Failed to execute {}", self.executable))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!("{} failed: {}", self.executable, filter_ffmpeg_stderr(&stderr)));
        }

        let transcript = self.transcript_path(audio);
        let json = FileManager::read_to_string(&transcript)?;
        let cues = parse_whisper_json(&json)?;
        debug!("Aligned {} words", cues.len());
        Ok(cues)
    }
}

/// Flatten `segments[].words[]` into cues, trimming words and dropping empty ones
pub fn parse_whisper_json(json: &str) -> Result<Vec<WordCue>> {
    let transcript: WhisperTranscript = serde_json::from_str(json)
        .context("Failed to parse whisper transcript")?;

    let cues = transcript.segments.into_iter()
        .flat_map(|segment| segment.words)
        .filter_map(|w| {
            let word = w.word.trim();
            if word.is_empty() {
                None
            } else {
                Some(WordCue::new(word, w.start, w.end))
            }
        })
        .collect::<Vec<_>>();

    if cues.is_empty() {
        warn!("Transcript contains no words");
    }
    Ok(cues)
}

/// Write cues into the project folder next to the voiceover they time
pub fn save_words<P: AsRef<Path>>(path: P, cues: &[WordCue]) -> Result<()> {
    let json = serde_json::to_string_pretty(cues).context("Failed to serialize word cues")?;
    FileManager::write_to_file(path, &json)
}
