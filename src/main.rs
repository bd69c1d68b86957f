// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use pdf_translate::app_config::{self, Config, TranslateRequest};
use pdf_translate::app_controller::default_output_path;
use pdf_translate::Controller;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    #[value(name = "openai")]
    OpenAI,
    Ollama,
}

impl CliTranslationProvider {
    fn key(&self) -> &'static str {
        match self {
            CliTranslationProvider::OpenAI => "openai",
            CliTranslationProvider::Ollama => "ollama",
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
    /// Translate a PDF document
    Translate(TranslateArgs),

    /// Generate shell completions for pdf-translate
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Write a default configuration file
    InitConfig {
        /// Configuration file path
        #[arg(short, long, default_value = "conf.json")]
        config_path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Input PDF file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Target language code (e.g., 'fr', 'ja', 'zh-Hans')
    #[arg(short, long)]
    target_language: String,

    /// Source language code; omitted means the model detects it
    #[arg(short, long)]
    source_language: Option<String>,

    /// Translation provider to use (requires llm.allow_provider_override)
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use (requires llm.allow_model_override)
    #[arg(short, long)]
    model: Option<String>,

    /// Extra instructions appended to the system prompt (requires llm.allow_custom_prompt)
    #[arg(long)]
    prompt: Option<String>,

    /// Render the original text above each translation
    #[arg(long)]
    include_original: bool,

    /// Font size of the output text
    #[arg(long, default_value_t = 12.0)]
    font_size: f32,

    /// Directory with the TrueType fonts (NotoSansSC-Regular.ttf, ...); overrides font_directory
    #[arg(long, value_name = "DIR")]
    font_dir: Option<PathBuf>,

    /// Output PDF file [default: <INPUT stem>_translated.pdf]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// pdf-translate - PDF translation with LLMs
///
/// Extracts the text of every page of a PDF, translates it through an
/// OpenAI-compatible or Ollama endpoint and writes a new PDF with the
/// translated text.
#[derive(Parser, Debug)]
#[command(name = "pdf-translate")]
#[command(version)]
#[command(about = "LLM-powered PDF translation tool")]
#[command(long_about = "pdf-translate extracts the text of a PDF and translates it using an LLM provider.

EXAMPLES:
    pdf-translate translate report.pdf -t fr                  # Translate into French
    pdf-translate translate report.pdf -t ja -s en -o out.pdf # English to Japanese, explicit output
    pdf-translate translate report.pdf -t de --include-original
    pdf-translate translate report.pdf -t zh --font-dir ./fonts    # Embed NotoSansSC-Regular.ttf
    pdf-translate init-config                                 # Write a default conf.json
    pdf-translate completions bash > pdf-translate.bash       # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. Translation must be enabled in the llm block.

SUPPORTED PROVIDERS:
    openai - OpenAI or any OpenAI-compatible server (LM Studio, vLLM, ...)
    ollama - Local Ollama server (default: http://localhost:11434)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
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

    // @returns: ANSI colour for log level
    fn color_for_level(level: Level) -> &'static str {
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
                "{}{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set with set_max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "pdf-translate", &mut std::io::stdout());
            Ok(())
        }
        Commands::InitConfig { config_path, force } => init_config(&config_path, force),
        Commands::Translate(args) => run_translate(args).await,
    }
}

fn init_config(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        warn!(
            "Config file already exists at '{}' (use --force to overwrite)",
            config_path.display()
        );
        return Ok(());
    }
    Config::default().save_to_file(config_path)?;
    info!("Wrote default config to '{}'", config_path.display());
    Ok(())
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let config_path = &options.config_path;
    let mut config = if config_path.exists() {
        Config::from_file(config_path)?
    } else {
        warn!(
            "Config file not found at '{}', using defaults. Run 'pdf-translate init-config' to create one.",
            config_path.display()
        );
        Config::default()
    };

    if let Some(font_dir) = &options.font_dir {
        config.font_directory = Some(font_dir.clone());
    }
    config.validate().context("Configuration validation failed")?;

    // If log level was not set via command line, update it from config now
    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let request = TranslateRequest {
        target_language: options.target_language.clone(),
        source_language: options.source_language.clone(),
        provider: options.provider.as_ref().map(|p| p.key().to_string()),
        model: options.model.clone(),
        custom_prompt: options.prompt.clone(),
        include_original_text: options.include_original,
        font_size: options.font_size,
    };

    let output = options
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&options.input));

    let controller = Controller::with_config(config)?.with_progress(true);
    controller.translate_file(&options.input, &output, &request).await?;

    Ok(())
}
