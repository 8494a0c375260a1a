//! wsframe-harness: run the fixture corpus against a parser executable.
//!
//! ```text
//! wsframe-harness [--corpus DIR] [--parser PATH] [--parser-arg ARG]...
//!                 [--timeout-ms N] [--chunk-pause-ms N] [--filter SUBSTR]
//!                 [--scratch-dir DIR] [--format text|json] [--config FILE]
//! ```
//!
//! Exit codes: 0 all fixtures passed, 1 at least one failed, 2 fatal error.
#![deny(unused_must_use)]

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use log::info;

use wsframe::config::{HarnessConfig, ReportFormat};
use wsframe::harness::Harness;
use wsframe::harness::report::{ConsoleReporter, JsonReporter, Reporter};

#[derive(Parser, Debug)]
#[command(name = "wsframe-harness", version)]
#[command(about = "Feed chunked WebSocket fixtures to a parser and diff its output")]
struct Cli {
    /// Directory with one fixture file per test case
    #[arg(long, value_name = "DIR")]
    corpus: Option<PathBuf>,

    /// Parser-under-test executable (default: wsframe-dump next to this binary)
    #[arg(long, value_name = "PATH")]
    parser: Option<PathBuf>,

    /// Extra argument passed to the parser (repeatable)
    #[arg(long = "parser-arg", value_name = "ARG", allow_hyphen_values = true)]
    parser_args: Vec<String>,

    /// Kill the parser after this many milliseconds
    #[arg(long, value_name = "N")]
    timeout_ms: Option<u64>,

    /// Pause between chunk writes, in milliseconds
    #[arg(long, value_name = "N")]
    chunk_pause_ms: Option<u64>,

    /// Only run fixtures whose name contains this substring
    #[arg(long, value_name = "SUBSTR")]
    filter: Option<String>,

    /// Directory for captured-output temp files
    #[arg(long, value_name = "DIR")]
    scratch_dir: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum)]
    format: Option<Format>,

    /// JSON config file; flags override its values
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Format {
    Text,
    Json,
}

impl From<Format> for ReportFormat {
    fn from(f: Format) -> Self {
        match f {
            Format::Text => Self::Text,
            Format::Json => Self::Json,
        }
    }
}

impl Cli {
    fn into_config(self) -> Result<HarnessConfig> {
        let mut config = match &self.config {
            Some(path) => HarnessConfig::load(path)?,
            None => HarnessConfig::default(),
        };

        if let Some(dir) = self.corpus {
            config.corpus_dir = dir;
        }
        if let Some(parser) = self.parser {
            config.parser = parser;
        }
        if !self.parser_args.is_empty() {
            config.parser_args = self.parser_args;
        }
        if let Some(ms) = self.timeout_ms {
            config.timeout_ms = ms;
        }
        if let Some(ms) = self.chunk_pause_ms {
            config.chunk_pause_ms = ms;
        }
        if self.filter.is_some() {
            config.filter = self.filter;
        }
        if self.scratch_dir.is_some() {
            config.scratch_dir = self.scratch_dir;
        }
        if let Some(format) = self.format {
            config.format = format.into();
        }
        Ok(config)
    }
}

fn run(cli: Cli) -> Result<bool> {
    let config = cli.into_config()?;
    info!("timeout {} ms, chunk pause {} ms", config.timeout_ms, config.chunk_pause_ms);
    let format = config.format;
    let harness = Harness::new(config);

    let stdout = io::stdout().lock();
    let mut reporter: Box<dyn Reporter> = match format {
        ReportFormat::Text => Box::new(ConsoleReporter::new(stdout)),
        ReportFormat::Json => Box::new(JsonReporter::new(stdout)),
    };

    let summary = harness.run(reporter.as_mut())?;
    Ok(summary.all_passed())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("wsframe-harness: {e:#}");
            ExitCode::from(2)
        }
    }
}
