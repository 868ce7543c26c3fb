// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, Context};
use log::{warn, info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::PathBuf;
use std::io::Write;
use clap::{Args, Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use yadtwai::app_config::{self, Config, TranslationProvider};
use yadtwai::app_controller::Controller;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Ollama,
    #[value(name = "openai")]
    OpenAI,
    Anthropic,
    #[value(name = "lmstudio")]
    LMStudio,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
            CliTranslationProvider::OpenAI => TranslationProvider::OpenAI,
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
            CliTranslationProvider::LMStudio => TranslationProvider::LMStudio,
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

/// Options shared by the commands that load the configuration
#[derive(Args, Debug, Clone)]
struct CommonArgs {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: PathBuf,

    /// Target language code (e.g., 'fr', 'de', 'pt-BR')
    #[arg(short = 'L', long)]
    language_code: Option<String>,

    /// Target language name used in prompts (derived from the code by default)
    #[arg(long)]
    language: Option<String>,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Args, Debug)]
struct TranslateArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// Translate the files already in the store without listing the source
    #[arg(long)]
    no_fetch: bool,

    /// Translate again the sections whose translation failed validation
    #[arg(long)]
    retry_failed: bool,

    /// Maximum number of files translated at the same time
    #[arg(short = 'j', long)]
    max_concurrent_files: Option<usize>,
}

#[derive(Args, Debug)]
struct BuildArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Output directory of the translated documentation
    #[arg(short, long)]
    output_path: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch the documentation and translate every pending section
    Translate(TranslateArgs),

    /// Render the translated documentation into the output directory
    Build(BuildArgs),

    /// Show the translation progress of every file
    Status(CommonArgs),

    /// Generate shell completions for yadtwai
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// YADTwAI - Yet Another Documentation Translator with AI
///
/// Translates markdown documentation section by section with AI providers,
/// keeping headings, code blocks and links intact.
#[derive(Parser, Debug)]
#[command(name = "yadtwai")]
#[command(version)]
#[command(about = "AI-powered markdown documentation translation tool")]
#[command(long_about = "YADTwAI translates a tree of markdown documentation with AI providers.
Progress is saved after every file, so an interrupted run resumes where it stopped.

EXAMPLES:
    yadtwai translate                          # Fetch and translate using conf.json
    yadtwai translate -L de --no-fetch         # Translate stored files into German
    yadtwai translate --retry-failed           # Retry sections that failed validation
    yadtwai build -o ./site/docs/fr            # Write the translated markdown
    yadtwai status                             # Show per-file progress
    yadtwai completions bash > yadtwai.bash    # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

SUPPORTED PROVIDERS:
    openai    - OpenAI API (requires API key or OPENAI_API_KEY)
    anthropic - Anthropic Claude API (requires API key or ANTHROPIC_API_KEY)
    ollama    - Local Ollama server
    lmstudio  - LM Studio local server (OpenAI-compatible on http://localhost:1234/v1)")]
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

    // @returns: ANSI color of a log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
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
                "\x1B[{}m{} {:<5} {}\x1B[0m",
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
    // Accept everything here; the effective level is set once the config is loaded
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "yadtwai", &mut std::io::stdout());
            Ok(())
        }
        Commands::Translate(args) => run_translate(args).await,
        Commands::Build(args) => run_build(args).await,
        Commands::Status(args) => run_status(args).await,
    }
}

/// Load or create the configuration, then apply the shared CLI overrides
fn load_config(options: &CommonArgs) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level((&level).into());
    }

    let config_path = options.config_path.as_path();
    let mut config = if config_path.exists() {
        Config::from_file(config_path)?
    } else {
        warn!("Config file not found at {:?}, creating default config.", config_path);
        let config = Config::default();
        config.save(config_path)?;
        config
    };

    if let Some(language_code) = &options.language_code {
        config.language_code = language_code.clone();
        // A name given for another language no longer applies
        if options.language.is_none() {
            config.language = None;
        }
    }
    if let Some(language) = &options.language {
        config.language = Some(language.clone());
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    } else {
        log::set_max_level((&config.log_level).into());
    }

    Ok(config)
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    let mut config = load_config(&options.common)?;

    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }
    if let Some(model) = &options.model {
        config.translation.active_provider_config_mut().model = model.clone();
    }
    if options.retry_failed {
        config.retry_failed_sections = true;
    }
    if let Some(max) = options.max_concurrent_files {
        config.max_concurrent_files = Some(max);
    }

    config.validate().context("Configuration validation failed")?;
    info!(
        "Translating {}/{} into {} with {} ({})",
        config.source.owner,
        config.source.repo,
        config.language_name()?,
        config.translation.provider.display_name(),
        config.translation.get_model()
    );

    let controller = Controller::with_config(config)?;
    let summary = controller.translate(!options.no_fetch).await?;

    if !summary.aborted.is_empty() {
        warn!(
            "{} file(s) aborted, run translate again to resume: {}",
            summary.aborted.len(),
            summary.aborted.join(", ")
        );
    }
    if summary.with_errors > 0 {
        warn!(
            "{} file(s) have sections that failed validation, use --retry-failed to translate them again",
            summary.with_errors
        );
    }
    Ok(())
}

async fn run_build(options: BuildArgs) -> Result<()> {
    let mut config = load_config(&options.common)?;
    if let Some(output_path) = options.output_path {
        config.output_path = output_path;
    }

    let controller = Controller::with_config(config)?;
    let report = controller.build().await?;
    if report.link_errors > 0 {
        warn!("{} file(s) have sections whose links could not be rewritten", report.link_errors);
    }
    Ok(())
}

async fn run_status(options: CommonArgs) -> Result<()> {
    let config = load_config(&options)?;
    let language_code = config.language_code.clone();
    let controller = Controller::with_config(config)?;

    let statuses = controller.status().await?;
    let mut stdout = std::io::stdout();
    for status in &statuses {
        let mut flags = Vec::new();
        if status.has_error {
            flags.push("errors");
        }
        if status.likely_link_error {
            flags.push("links");
        }
        writeln!(
            stdout,
            "{:>6.1}%  {:>3}/{:<3} {:<50} {}",
            status.progress,
            status.translated + status.failed,
            status.sections,
            status.path,
            flags.join(",")
        )?;
    }
    writeln!(stdout, "{} file(s), language {}", statuses.len(), language_code)?;
    Ok(())
}
