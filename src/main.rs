// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use autoshorts::app_config::{self, Config, VideoFormat};
use autoshorts::app_controller::Controller;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for VideoFormat to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliVideoFormat {
    /// 1080x1920, for Shorts and Reels
    Vertical,
    /// 1920x1080
    Horizontal,
}

impl From<CliVideoFormat> for VideoFormat {
    fn from(format: CliVideoFormat) -> Self {
        match format {
            CliVideoFormat::Vertical => VideoFormat::Vertical,
            CliVideoFormat::Horizontal => VideoFormat::Horizontal,
        }
    }
}

/// Options shared by the commands that write a script
#[derive(Args, Debug)]
struct ScriptArgs {
    /// Topic of the video
    #[arg(value_name = "TOPIC")]
    topic: String,

    /// Output format
    #[arg(long, value_enum)]
    format: Option<CliVideoFormat>,

    /// Approximate narration length in seconds
    #[arg(long)]
    duration: Option<u32>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a script for a topic and save it for review
    Script(ScriptArgs),

    /// Render the video of an existing project folder
    Render {
        /// Project folder containing script.json
        #[arg(value_name = "PROJECT_DIR")]
        project_dir: PathBuf,
    },

    /// Generate a script and render it without a review pause
    Run(ScriptArgs),

    /// Upload a project folder to Google Drive
    Upload {
        /// Project folder to upload
        #[arg(value_name = "PROJECT_DIR")]
        project_dir: PathBuf,
    },

    /// Generate shell completions for autoshorts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// autoshorts - narrated short videos from a topic
#[derive(Parser, Debug)]
#[command(name = "autoshorts")]
#[command(version)]
#[command(about = "Narrated short-form video generator")]
#[command(long_about = "autoshorts writes a script for a topic, narrates it, fetches stock footage,
and renders a video with word-by-word subtitles.

EXAMPLES:
    autoshorts script \"Why is the sea salty\"         # Write projects/why_is_the_sea_salty/script.json
    autoshorts render projects/why_is_the_sea_salty  # Render after reviewing the script
    autoshorts run --format horizontal \"Black holes\" # Script and render in one go
    autoshorts upload projects/black_holes           # Upload the project folder to Drive
    autoshorts completions bash > autoshorts.bash    # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically. API keys may also come from GEMINI_API_KEY,
    PEXELS_API_KEY and GOOGLE_DRIVE_TOKEN.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config: String,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI color for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "{}{} {} {}\x1B[0m",
                Self::get_color_for_level(record.level()),
                now,
                Self::get_emoji_for_level(record.level()),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &app_config::LogLevel) -> LevelFilter {
    match level {
        app_config::LogLevel::Error => LevelFilter::Error,
        app_config::LogLevel::Warn => LevelFilter::Warn,
        app_config::LogLevel::Info => LevelFilter::Info,
        app_config::LogLevel::Debug => LevelFilter::Debug,
        app_config::LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Accept everything here; the effective level is applied once the config is known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "autoshorts", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(cmd_log_level) = &cli.log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level_filter(&config_log_level));
    }

    let mut config = load_or_create_config(&cli.config, cli.log_level.clone())?;
    config.apply_env_overrides();

    // If log level was not set via command line, update it from config now
    if cli.log_level.is_none() {
        log::set_max_level(level_filter(&config.log_level));
    }

    match cli.command {
        Commands::Script(args) => {
            apply_script_args(&mut config, &args);
            config.validate().context("Configuration validation failed")?;
            let controller = Controller::with_config(config)?;
            let paths = controller.create_script(&args.topic).await?;
            info!("Review and edit {} before rendering", paths.script().display());
            println!("{}", paths.script().display());
        }
        Commands::Render { project_dir } => {
            config.validate_render().context("Configuration validation failed")?;
            let controller = Controller::with_config(config)?;
            let output = controller.render_project(&project_dir).await?;
            println!("{}", output.display());
        }
        Commands::Run(args) => {
            apply_script_args(&mut config, &args);
            config.validate().context("Configuration validation failed")?;
            let controller = Controller::with_config(config)?;
            let output = controller.run(&args.topic).await?;
            println!("{}", output.display());
        }
        Commands::Upload { project_dir } => {
            let controller = Controller::with_config(config)?;
            let uploaded = controller.upload(&project_dir).await?;
            for file in uploaded {
                println!("{}\t{}", file.id, file.name);
            }
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}

fn apply_script_args(config: &mut Config, args: &ScriptArgs) {
    if let Some(format) = &args.format {
        config.set_format(format.clone().into());
    }
    if let Some(duration) = args.duration {
        config.video.target_duration_seconds = duration;
    }
}

/// Load the config file, or write the default one when it is missing
fn load_or_create_config(config_path: &str, log_level: Option<CliLogLevel>) -> Result<Config> {
    let mut config = if Path::new(config_path).exists() {
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    // Update log level in config if specified via command line
    if let Some(log_level) = log_level {
        config.log_level = log_level.into();
    }

    Ok(config)
}
