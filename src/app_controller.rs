use anyhow::{Context, Result};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::alignment::{save_words, WhisperAligner, WordAligner};
use crate::app_config::Config;
use crate::assembly::{build_timeline, place_cues, Compositor};
use crate::drive::{DriveFile, DriveUploader};
use crate::errors::AssemblyError;
use crate::file_utils::{FileManager, ProjectPaths};
use crate::footage::{FootageSource, PexelsClient};
use crate::media_probe::probe_clips;
use crate::script::{load_script, save_script, Script, ScriptGenerator};
use crate::voiceover::{EdgeTts, VoiceSynthesizer};

// @module: Application controller for the project workflow

// @const: Render stages shown on the progress bar
const RENDER_STAGES: u64 = 6;

/// Main application controller: script, render and upload of projects
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: LLM-backed scene writer
    script_generator: ScriptGenerator,
    voice: Arc<dyn VoiceSynthesizer>,
    footage: Arc<dyn FootageSource>,
    aligner: Arc<dyn WordAligner>,
}

impl Controller {
    // @method: Create a controller with collaborators built from the configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let script_generator = ScriptGenerator::from_config(&config.script);
        let voice = Arc::new(EdgeTts::from_config(&config.voice));
        let footage = Arc::new(PexelsClient::from_config(&config.footage, config.footage_orientation()));
        let work_dir = WhisperAligner::default_work_dir()
            .unwrap_or_else(|_| config.video.projects_dir.join(".whisper"));
        let aligner = Arc::new(WhisperAligner::from_config(&config.alignment, work_dir));

        Ok(Self::with_components(config, script_generator, voice, footage, aligner))
    }

    /// Create a controller with explicit collaborators
    pub fn with_components(
        config: Config,
        script_generator: ScriptGenerator,
        voice: Arc<dyn VoiceSynthesizer>,
        footage: Arc<dyn FootageSource>,
        aligner: Arc<dyn WordAligner>,
    ) -> Self {
        Self {
            config,
            script_generator,
            voice,
            footage,
            aligner,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Project folder for a topic
    pub fn project_for_topic(&self, topic: &str) -> ProjectPaths {
        ProjectPaths::for_topic(&self.config.video.projects_dir, topic)
    }

    /// Generate a script for `topic` and save it into a fresh project folder
    pub async fn create_script(&self, topic: &str) -> Result<ProjectPaths> {
        let paths = self.project_for_topic(topic);
        if paths.slug.is_empty() {
            return Err(anyhow::anyhow!("Topic '{}' produces an empty project name", topic));
        }
        paths.ensure()?;

        let scenes = self.script_generator
            .generate(topic, self.config.video.target_duration_seconds)
            .await?;
        save_script(paths.script(), &scenes)?;

        info!("Script saved to {}", paths.script().display());
        Ok(paths)
    }

    /// Render the final video of an existing project folder
    pub async fn render_project(&self, project_dir: &Path) -> Result<PathBuf> {
        let start_time = std::time::Instant::now();
        if !FileManager::dir_exists(project_dir) {
            return Err(anyhow::anyhow!("Project directory does not exist: {:?}", project_dir));
        }
        let paths = ProjectPaths::from_dir(project_dir);
        paths.ensure()?;

        let progress = ProgressBar::new(RENDER_STAGES);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} stages {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress.set_style(style.progress_chars("█▓▒░"));

        let result = self.render_stages(&paths, &progress).await;
        match &result {
            Ok(_) => progress.finish_with_message("done"),
            Err(_) => progress.abandon_with_message("failed"),
        }
        let output = result?;

        info!("Rendered {} in {}", output.display(), Self::format_duration(start_time.elapsed()));
        Ok(output)
    }

    async fn render_stages(&self, paths: &ProjectPaths, progress: &ProgressBar) -> Result<PathBuf> {
        progress.set_message("script");
        let scenes = load_script(paths.script())?;
        progress.inc(1);

        progress.set_message("voiceover");
        let narration = Script::narration(&scenes);
        let audio = self.voice.synthesize(&narration, &paths.voiceover()).await
            .context("Voiceover generation failed")?;
        progress.inc(1);

        progress.set_message("footage");
        let footage_dir = paths.footage_dir();
        let downloads = join_all(
            scenes.iter().map(|scene| self.footage.fetch(&scene.visual_query, &footage_dir)),
        )
        .await;
        let footage_paths: Vec<PathBuf> = downloads.into_iter().flatten().collect();
        if footage_paths.is_empty() {
            return Err(AssemblyError::NoAssets.into());
        }
        if footage_paths.len() < scenes.len() {
            warn!("Footage found for {} of {} scenes", footage_paths.len(), scenes.len());
        }
        let clips = probe_clips(&footage_paths).await?;
        progress.inc(1);

        progress.set_message("alignment");
        let cues = self.aligner.align(&audio.path).await
            .context("Word alignment failed")?;
        save_words(paths.words(), &cues)?;
        progress.inc(1);

        progress.set_message("timeline");
        let render_config = self.config.render_config();
        let segments = build_timeline(
            audio.duration,
            &clips,
            self.config.pacing.b_roll_duration_seconds,
            render_config.resolution,
        )?;
        let events = place_cues(&cues, &render_config);
        progress.inc(1);

        progress.set_message("encoding");
        let compositor = Compositor::new(render_config);
        let output = compositor.render(&segments, &events, &audio, &paths.final_video()).await?;
        progress.inc(1);

        Ok(output)
    }

    /// Script and render in one go
    pub async fn run(&self, topic: &str) -> Result<PathBuf> {
        let paths = self.create_script(topic).await?;
        self.render_project(&paths.root).await
    }

    /// Upload a project folder to Drive; skipped when no token is configured
    pub async fn upload(&self, project_dir: &Path) -> Result<Vec<DriveFile>> {
        if !FileManager::dir_exists(project_dir) {
            return Err(anyhow::anyhow!("Project directory does not exist: {:?}", project_dir));
        }
        let Some(uploader) = DriveUploader::from_config(&self.config.drive) else {
            warn!("No Drive access token configured; skipping upload");
            return Ok(Vec::new());
        };

        let paths = ProjectPaths::from_dir(project_dir);
        let uploaded = uploader
            .upload_project_folder(&paths.root, &self.config.drive.root_folder, &paths.slug)
            .await?;
        info!("Uploaded {} files to {}/{}", uploaded.len(), self.config.drive.root_folder, paths.slug);
        Ok(uploaded)
    }

    // Format duration in a human-readable format
    fn format_duration(duration: std::time::Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
