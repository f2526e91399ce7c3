// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{error, info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use bisub::app_config::{self, Config};
use bisub::app_controller::{self, Controller, MergeRequest, RunStatus};

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

#[derive(Subcommand, Debug)]
enum Commands {
    /// Merge two SubRip files into one bilingual track
    Merge(MergeArgs),

    /// Rewrite a SubRip file without inline markup tags
    Strip(StripArgs),

    /// Generate shell completions for bisub
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct MergeArgs {
    /// Subtitle file shown first (on top) in every merged cue
    #[arg(value_name = "UPPER")]
    upper: PathBuf,

    /// Subtitle file shown second in every merged cue
    #[arg(value_name = "LOWER")]
    lower: PathBuf,

    /// Output file (default: <upper>.<languages>.srt next to the upper file)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Strip inline markup tags from the merged text
    #[arg(long)]
    plain_text: bool,

    /// Language code of the upper track (e.g., 'en', 'eng')
    #[arg(long)]
    upper_language: Option<String>,

    /// Language code of the lower track (e.g., 'fr', 'fre')
    #[arg(long)]
    lower_language: Option<String>,

    /// Write the merged track as JSON instead of SubRip
    #[arg(long)]
    json: bool,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,
}

#[derive(Parser, Debug)]
struct StripArgs {
    /// Subtitle file to clean
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file (default: <input>.plain.srt)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,
}

/// bisub - bilingual subtitle merger
///
/// Combines two independently timed SubRip tracks into one track that shows
/// both languages at once.
#[derive(Parser, Debug)]
#[command(name = "bisub")]
#[command(version)]
#[command(about = "Merge two subtitle tracks into one bilingual track")]
#[command(long_about = "bisub merges two SubRip (.srt) files onto one timeline so both languages are displayed together.

EXAMPLES:
    bisub merge movie.en.srt movie.fr.srt                         # Writes movie.en.merged.srt
    bisub merge --upper-language en --lower-language fr a.srt b.srt  # Writes a.en-fr.srt
    bisub merge -o out.srt --plain-text a.srt b.srt               # Drop <i>, <font> and similar tags
    bisub strip movie.en.srt                                      # Writes movie.en.plain.srt
    bisub completions bash > bisub.bash                           # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: String,

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

    // @returns: ANSI colour and emoji for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "❌ "),
            Level::Warn => ("1;33", "🚧 "),
            Level::Info => ("1;32", " "),
            Level::Debug => ("1;36", "🔍 "),
            Level::Trace => ("1;35", "📋 "),
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
            let (colour, emoji) = Self::style_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "\x1B[{}m{} {} {}\x1B[0m", colour, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; log::set_max_level does the filtering
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "bisub", &mut std::io::stdout());
        return Ok(());
    }

    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &cli.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&cli.config_path)?;

    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    }
    if let Commands::Merge(args) = &cli.command {
        if let Some(lang) = &args.upper_language {
            config.upper_language = lang.clone();
        }
        if let Some(lang) = &args.lower_language {
            config.lower_language = lang.clone();
        }
        if args.plain_text {
            config.plain_text = true;
        }
    }

    log::set_max_level(config.log_level.to_level_filter());

    let controller = Controller::with_config(config)?;

    let result = match cli.command {
        Commands::Merge(args) => {
            controller.run_merge(MergeRequest {
                upper_path: args.upper,
                lower_path: args.lower,
                output_path: args.output,
                force_overwrite: args.force_overwrite,
                json: args.json,
            }).await
        }
        Commands::Strip(args) => controller.run_strip(&args.input, args.output, args.force_overwrite),
        Commands::Completions { .. } => return Ok(()),
    };

    match result {
        Ok(RunStatus::Written(path)) => {
            info!("Success: {:?}", path);
            Ok(())
        }
        Ok(RunStatus::Skipped(_)) => Ok(()),
        Ok(RunStatus::Cancelled) => Err(anyhow!("Merge cancelled")),
        Err(e) => {
            if let Some(format_error) = app_controller::format_error(&e) {
                error!("Not a valid subtitle file: {}", format_error);
            }
            Err(e)
        }
    }
}
