use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};
use viewcheck_config::{AppConfig, ConfigError, NamingConfig};
use viewcheck_engine::command::{CommandBus, CommandContext, CommandRequest};
use viewcheck_engine::errors::EngineError;
use viewcheck_engine::naming::NameSequencer;
use viewcheck_io::{DocumentLoader, DocumentSaver, JsonFacade, ReportLog};

/// Checks and fixes view labels, names and reports on a drawing snapshot.
#[derive(Debug, Parser)]
#[command(name = "viewcheck", version)]
struct Cli {
    /// Configuration file (TOML); defaults to `VIEWCHECK_CONFIG` or ./config/default.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Save the modified snapshot back to DOCUMENT
    #[arg(long)]
    write: bool,

    /// Append the command output to the configured report log
    #[arg(long)]
    log: bool,

    /// JSON snapshot of the host document; not read by `thread_undercut`
    document: PathBuf,

    /// Command to run, e.g. `check_drawing` or `thread_undercut`
    command: String,

    /// Command arguments
    args: Vec<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = load_configuration(cli.config.clone());
    init_logging(&config);
    info!(command = %cli.command, document = %cli.document.display(), "starting viewcheck");

    match run(&cli, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!(command = %cli.command, "{message}");
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli, config: &AppConfig) -> Result<(), String> {
    let sequencer = build_sequencer(&config.naming).map_err(|err| err.to_string())?;
    let facade = JsonFacade::new();
    let bus = CommandBus::new();
    let mut document = if bus.needs_document(&cli.command) {
        Some(facade.load(&cli.document).map_err(|err| err.to_string())?)
    } else {
        info!(command = %cli.command, "command does not read the document, skipping load");
        None
    };

    let request = CommandRequest::new(cli.command.as_str()).with_args(cli.args.iter().cloned());
    let mut context = CommandContext {
        document: document.as_mut(),
        sequencer: &sequencer,
    };
    let response = bus.dispatch(&request, &mut context);
    let message = response.message.unwrap_or_default();
    if !response.success {
        return Err(message);
    }
    println!("{}", message.trim_end());

    if cli.log {
        let log = ReportLog::new(config.report.log_dir.clone(), config.report.log_file.as_str());
        match log.append(&message) {
            Ok(()) => info!(path = %log.path().display(), "report appended"),
            Err(err) => warn!(error = %err, "failed to append report log"),
        }
    }
    if let (true, Some(document)) = (cli.write, &document) {
        facade
            .save(document, &cli.document)
            .map_err(|err| err.to_string())?;
    }
    Ok(())
}

/// Applies the configured overrides on top of the default naming scheme.
fn build_sequencer(naming: &NamingConfig) -> Result<NameSequencer, EngineError> {
    let defaults = NameSequencer::default();
    let letters = naming
        .letters
        .clone()
        .unwrap_or_else(|| defaults.letters().to_vec());
    let numerals = naming
        .numerals
        .clone()
        .unwrap_or_else(|| defaults.numerals().to_vec());
    let generations = naming
        .generations
        .unwrap_or_else(|| defaults.generations().min(numerals.len()));
    NameSequencer::new(letters, numerals, generations)
}

fn load_configuration(override_path: Option<PathBuf>) -> AppConfig {
    match override_path {
        Some(path) => AppConfig::from_file(&path).unwrap_or_else(|err| {
            warn!(path = %path.display(), error = %err, "failed to load the given config, using defaults");
            AppConfig::default()
        }),
        None => match AppConfig::discover() {
            Ok(cfg) => cfg,
            Err(err) => {
                match &err {
                    ConfigError::Io { path, .. }
                    | ConfigError::Parse { path, .. }
                    | ConfigError::Invalid { path, .. } => {
                        warn!(path = %path.display(), error = %err, "failed to load default config, using built-in defaults");
                    }
                    ConfigError::Context { .. } => {
                        warn!(error = %err, "failed to load default config, using built-in defaults");
                    }
                }
                AppConfig::default()
            }
        },
    }
}

fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_new(config.logging.level.clone()).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = fmt().with_env_filter(filter).with_writer(std::io::stderr);
    if subscriber.try_init().is_err() {
        // already initialised
    }
}
