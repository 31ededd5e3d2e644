//! Sentiflux CLI - Command-line interface for sentiment reports
//!
//! Commands:
//! - run: Load, classify and aggregate a review file, writing all artifacts
//! - validate: Load and validate an input file without scoring it
//! - score: Score and label a single text
//! - config: Print the effective configuration

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sentiflux::adapters::InputFormat;
use sentiflux::schema::RecordLoader;
use sentiflux::types::DateGrain;
use sentiflux::{
    run_report, LexiconScorer, ReportConfig, ReportError, SentimentScorer, TextNormalizer,
    PRODUCER_NAME, SENTIFLUX_VERSION,
};

/// Default log filter when RUST_LOG is unset
const DEFAULT_LOG_FILTER: &str = "sentiflux=info";

/// Sentiflux - Batch sentiment reports for product reviews
#[derive(Parser)]
#[command(name = "sentiflux")]
#[command(version = SENTIFLUX_VERSION)]
#[command(about = "Score, label and aggregate review sentiment", long_about = None)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_log: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full report
    Run {
        /// Configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Input file (.csv, .json, .jsonl, .ndjson)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output directory
        #[arg(short, long)]
        outdir: Option<PathBuf>,

        /// Trend bucket grain (D, W or M)
        #[arg(long)]
        date_grain: Option<DateGrain>,

        /// Number of keywords to rank
        #[arg(long)]
        top_n: Option<usize>,

        /// Minimum normalized text length
        #[arg(long)]
        min_text_len: Option<usize>,
    },

    /// Load and validate an input file
    Validate {
        /// Input file
        #[arg(short, long)]
        input: PathBuf,

        /// Configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Score a single text
    Score {
        /// Text to score
        #[arg(short, long)]
        text: String,

        /// Configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.json_log);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_writer(io::stderr)
                    .with_ansi(atty::is(atty::Stream::Stderr)),
            )
            .init();
    }
}

fn run(cli: Cli) -> Result<(), SentifluxCliError> {
    match cli.command {
        Commands::Run {
            config,
            input,
            outdir,
            date_grain,
            top_n,
            min_text_len,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(input) = input {
                config.input_path = input;
            }
            if let Some(outdir) = outdir {
                config.output_dir = outdir;
            }
            if let Some(grain) = date_grain {
                config.date_grain = grain;
            }
            if let Some(top_n) = top_n {
                config.top_n_keywords = top_n;
            }
            if let Some(min_text_len) = min_text_len {
                config.min_text_len = min_text_len;
            }
            cmd_run(&config)
        }

        Commands::Validate { input, config } => {
            let mut config = load_config(config.as_deref())?;
            config.input_path = input;
            cmd_validate(&config)
        }

        Commands::Score { text, config } => cmd_score(&text, &load_config(config.as_deref())?),

        Commands::Config { config } => {
            let config = load_config(config.as_deref())?;
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<ReportConfig, ReportError> {
    match path {
        Some(path) => ReportConfig::from_toml_file(path),
        None => Ok(ReportConfig::default()),
    }
}

fn cmd_run(config: &ReportConfig) -> Result<(), SentifluxCliError> {
    let outcome = run_report(config)?;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn cmd_validate(config: &ReportConfig) -> Result<(), SentifluxCliError> {
    config.validate()?;
    let loaded = RecordLoader::from_config(config).load(&config.input_path)?;
    let format = InputFormat::from_path(&config.input_path)?;

    let report = ValidationReport {
        producer: PRODUCER_NAME,
        version: SENTIFLUX_VERSION,
        input: config.input_path.display().to_string(),
        format,
        columns: loaded.columns,
        rows_read: loaded.stats.rows_read,
        duplicates_removed: loaded.stats.duplicates_removed,
        unparseable_timestamps: loaded.stats.unparseable_timestamps,
        valid_records: loaded.records.len(),
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn cmd_score(text: &str, config: &ReportConfig) -> Result<(), SentifluxCliError> {
    config.validate()?;
    let clean_text = TextNormalizer::new(config.normalization).normalize(Some(text));
    let score = LexiconScorer::new().score(&clean_text);
    let label = config.thresholds.classify(score.compound);

    let report = serde_json::json!({
        "text": text,
        "clean_text": clean_text,
        "compound": score.compound,
        "pos": score.pos,
        "neu": score.neu,
        "neg": score.neg,
        "label": label,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

// Report types

#[derive(Serialize)]
struct ValidationReport {
    producer: &'static str,
    version: &'static str,
    input: String,
    format: InputFormat,
    columns: Vec<String>,
    rows_read: usize,
    duplicates_removed: usize,
    unparseable_timestamps: usize,
    valid_records: usize,
}

// Error types

#[derive(Debug)]
enum SentifluxCliError {
    Report(ReportError),
    Json(serde_json::Error),
}

impl From<ReportError> for SentifluxCliError {
    fn from(e: ReportError) -> Self {
        SentifluxCliError::Report(e)
    }
}

impl From<serde_json::Error> for SentifluxCliError {
    fn from(e: serde_json::Error) -> Self {
        SentifluxCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<SentifluxCliError> for CliError {
    fn from(e: SentifluxCliError) -> Self {
        let e = match e {
            SentifluxCliError::Json(e) => {
                return CliError {
                    code: "JSON_ERROR".to_string(),
                    message: e.to_string(),
                    hint: None,
                }
            }
            SentifluxCliError::Report(e) => e,
        };

        let (code, hint) = match &e {
            ReportError::Configuration(_) => (
                "CONFIG_ERROR",
                Some("Run 'sentiflux config' to inspect the effective configuration"),
            ),
            ReportError::Schema { .. } => (
                "SCHEMA_ERROR",
                Some("Set [columns] in the configuration to match the input header"),
            ),
            ReportError::UnsupportedFormat(_) => (
                "UNSUPPORTED_FORMAT",
                Some("Use a .csv, .json, .jsonl or .ndjson file"),
            ),
            ReportError::InputNotFound(_) | ReportError::Io(_) => {
                ("IO_ERROR", Some("Check file paths and permissions"))
            }
            ReportError::ParseError(_) => ("PARSE_ERROR", Some("Check input format")),
            ReportError::Csv(_) => ("CSV_ERROR", None),
            ReportError::JsonError(_) => ("JSON_ERROR", Some("Check JSON syntax")),
            ReportError::EncodingError(_) => ("ENCODING_ERROR", None),
        };

        CliError {
            code: code.to_string(),
            message: e.to_string(),
            hint: hint.map(str::to_string),
        }
    }
}
