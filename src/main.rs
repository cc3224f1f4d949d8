// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::app_config::{Config, LogLevel, TranslationProvider};
use crate::credentials::Credential;
use crate::file_utils::FileManager;
use crate::translation::Orchestrator;

mod app_config;
mod credentials;
mod document;
mod errors;
mod file_utils;
mod providers;
mod translation;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Gemini,
    OpenAI,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Gemini => TranslationProvider::Gemini,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate localization files (default command)
    #[command(alias = "translate")]
    Translate(TranslateArgs),

    /// Generate shell completions for lintra
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug, Clone)]
struct TranslateArgs {
    /// Input file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: PathBuf,

    /// API keys to spread the work across (repeatable)
    #[arg(short = 'k', long = "api-key", value_name = "KEY")]
    api_keys: Vec<String>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Output format label sent to the model (inferred from the extension by default)
    #[arg(short, long)]
    format: Option<String>,

    /// File extension to pick up in directory mode
    #[arg(short, long, default_value = "yml")]
    extension: String,

    /// Target language name (e.g. 'Vietnamese', 'French')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// lintra - resilient chunked translation for localization files
///
/// Splits large localization documents into line-respecting chunks,
/// translates them concurrently across several API keys with retry and
/// fallback, and writes output that keeps the original line structure
/// and formatting tokens intact.
#[derive(Parser, Debug)]
#[command(name = "lintra")]
#[command(version = "1.0.0")]
#[command(about = "AI-powered localization file translation")]
#[command(long_about = "lintra translates localization files chunk by chunk across multiple API keys.

EXAMPLES:
    lintra messages.yml -k $KEY                 # Translate one file
    lintra lang/ -e properties -k $K1 -k $K2    # Translate a directory with two keys
    lintra config.yml -p openai -k $KEY         # Use a specific provider
    lintra messages.yml -t French -k $KEY       # Override the target language
    lintra completions bash > lintra.bash       # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. Defaults apply when the file doesn't exist.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input file or directory to process
    #[arg(value_name = "INPUT_PATH")]
    input_path: Option<PathBuf>,

    /// API keys to spread the work across (repeatable)
    #[arg(short = 'k', long = "api-key", value_name = "KEY")]
    api_keys: Vec<String>,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Output format label sent to the model (inferred from the extension by default)
    #[arg(short, long)]
    format: Option<String>,

    /// File extension to pick up in directory mode
    #[arg(short, long, default_value = "yml")]
    extension: String,

    /// Target language name (e.g. 'Vietnamese', 'French')
    #[arg(short, long)]
    target_language: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
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

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;90m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let color = Self::color_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {:5} {}\x1B[0m", color, now, record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

/// Map a file extension to the output format label sent to the model
fn format_hint_for_extension(path: &Path) -> String {
    match path.extension().and_then(|e| e.to_str()).unwrap_or("").to_lowercase().as_str() {
        "yml" | "yaml" => "yaml".to_string(),
        "json" => "json".to_string(),
        "properties" | "lang" => "properties".to_string(),
        "cfg" | "conf" | "config" | "ini" => "config".to_string(),
        "sk" => "sk".to_string(),
        _ => "text".to_string(),
    }
}

/// Translate one file and write the result next to it
async fn translate_file(
    orchestrator: &Orchestrator,
    credentials: &[Credential],
    input: &Path,
    format_override: Option<&str>,
) -> Result<()> {
    let content = FileManager::read_to_string(input)?;
    let size_kb = content.len() / 1024;
    info!("Processing file: {:?} ({} KB)", input.file_name().unwrap_or_default(), size_kb);

    let format_hint = format_override
        .map(|f| f.to_string())
        .unwrap_or_else(|| format_hint_for_extension(input));

    let progress_bar = ProgressBar::new(0);
    progress_bar.set_style(
        ProgressStyle::with_template("{spinner} [{bar:30.cyan/blue}] {pos}/{len} chunks {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );

    let bar = progress_bar.clone();
    let translated = orchestrator
        .translate(&content, &format_hint, credentials, move |completed, total| {
            bar.set_length(total as u64);
            bar.set_position(completed as u64);
        })
        .await
        .with_context(|| format!("Failed to translate {:?}", input))?;
    progress_bar.finish_and_clear();

    let output_path =
        FileManager::generate_output_path(input, &orchestrator.config.target_language);
    FileManager::write_to_file(&output_path, &translated)?;
    info!("Wrote translation to {:?}", output_path);
    Ok(())
}

async fn run_translate(args: TranslateArgs) -> Result<()> {
    // Load configuration, falling back to defaults when the file is absent
    let mut config = if FileManager::file_exists(&args.config_path) {
        Config::from_file(&args.config_path)?
    } else {
        info!("Config file {} not found, using defaults", args.config_path);
        Config::default()
    };

    if let Some(provider) = args.provider {
        config.translation.provider = provider.into();
    }
    if let Some(target_language) = args.target_language {
        config.target_language = target_language;
    }
    config.validate()?;

    // Credentials come exclusively from the command line, as an ordered list
    if args.api_keys.is_empty() {
        return Err(anyhow!("At least one --api-key is required"));
    }
    let credentials: Vec<Credential> = args
        .api_keys
        .iter()
        .enumerate()
        .map(|(i, key)| Credential::new(format!("key-{}", i + 1), key))
        .collect();
    info!(
        "Using {} credentials with provider {}",
        credentials.len(),
        config.translation.provider.display_name()
    );

    let orchestrator = Orchestrator::new(config)?;

    if FileManager::dir_exists(&args.input_path) {
        let files = FileManager::find_files(&args.input_path, &args.extension)?;
        if files.is_empty() {
            warn!("No .{} files found in {:?}", args.extension, args.input_path);
            return Ok(());
        }
        info!("Found {} files to translate", files.len());
        for file in &files {
            translate_file(&orchestrator, &credentials, file, args.format.as_deref()).await?;
        }
    } else if FileManager::file_exists(&args.input_path) {
        translate_file(&orchestrator, &credentials, &args.input_path, args.format.as_deref())
            .await?;
    } else {
        return Err(anyhow!("Input path does not exist: {:?}", args.input_path));
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let options = CommandLineOptions::parse();

    match options.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "lintra", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Translate(args)) => {
            init_logging(&args)?;
            run_translate(args).await
        }
        None => {
            let args = TranslateArgs {
                input_path: options
                    .input_path
                    .ok_or_else(|| anyhow!("An input path is required; see lintra --help"))?,
                api_keys: options.api_keys,
                provider: options.provider,
                format: options.format,
                extension: options.extension,
                target_language: options.target_language,
                config_path: options.config_path,
                log_level: options.log_level,
            };
            init_logging(&args)?;
            run_translate(args).await
        }
    }
}

fn init_logging(args: &TranslateArgs) -> Result<()> {
    let level = args
        .log_level
        .clone()
        .map(LogLevel::from)
        .unwrap_or_default()
        .to_level_filter();
    CustomLogger::init(level).map_err(|e| anyhow!("Failed to initialize logger: {}", e))
}
