//! Harness and dump configuration.
//!
//! Both binaries run with no arguments using these defaults. The harness
//! can additionally load a JSON file (`--config`) whose missing fields fall
//! back to the defaults, and command-line flags override either.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Name of the reference parser-under-test executable.
pub const DUMP_BIN: &str = "wsframe-dump";

/// Largest single message the reference parser buffers (16 MiB).
pub const DEFAULT_MAX_MESSAGE: usize = 16 * 1024 * 1024;

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Progress dots, failure blocks with diffs, summary line.
    #[default]
    Text,
    /// One JSON document with every outcome.
    Json,
}

/// Harness driver configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Directory holding one fixture file per test case.
    pub corpus_dir: PathBuf,
    /// Parser-under-test executable.
    pub parser: PathBuf,
    /// Extra arguments for the parser (none by default).
    pub parser_args: Vec<String>,
    /// Upper bound on one subprocess lifetime (milliseconds).
    pub timeout_ms: u64,
    /// Pause between chunk writes (milliseconds).
    pub chunk_pause_ms: u64,
    /// Only run fixtures whose name contains this substring.
    pub filter: Option<String>,
    /// Where captured output is staged. System temp dir when unset.
    pub scratch_dir: Option<PathBuf>,
    pub format: ReportFormat,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            corpus_dir: default_corpus_dir(),
            parser: default_parser_path(),
            parser_args: Vec::new(),
            timeout_ms: 10_000,
            chunk_pause_ms: 0,
            filter: None,
            scratch_dir: None,
            format: ReportFormat::Text,
        }
    }
}

impl HarnessConfig {
    /// Load a JSON config file. Absent fields keep their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("invalid config '{}'", path.display()))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn chunk_pause(&self) -> Duration {
        Duration::from_millis(self.chunk_pause_ms)
    }
}

/// `tests/corpus` in the crate source tree.
pub fn default_corpus_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("corpus")
}

/// The dump binary next to the running executable.
///
/// Falls back to a bare name (resolved through `PATH`) when the current
/// executable cannot be located.
pub fn default_parser_path() -> PathBuf {
    let name = format!("{DUMP_BIN}{}", std::env::consts::EXE_SUFFIX);
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(&name)))
        .unwrap_or_else(|| PathBuf::from(name))
}

/// Reference parser (`wsframe-dump`) configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DumpConfig {
    /// Cap on one buffered data message.
    pub max_message: usize,
    /// Size of each stdin read.
    pub read_size: usize,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            max_message: DEFAULT_MAX_MESSAGE,
            read_size: 8192,
        }
    }
}
