//! Shared helpers: temp corpora and harness configs.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use wsframe::config::HarnessConfig;
use wsframe::harness::Harness;
use wsframe::harness::report::{ConsoleReporter, RunSummary};

pub const DUMP: &str = env!("CARGO_BIN_EXE_wsframe-dump");
pub const HARNESS: &str = env!("CARGO_BIN_EXE_wsframe-harness");

/// A temp directory holding the given `(file name, content)` fixtures.
pub fn corpus(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("create corpus dir");
    for (name, content) in files {
        std::fs::write(dir.path().join(name), content).expect("write fixture");
    }
    dir
}

pub fn config(corpus: &Path, parser: impl Into<PathBuf>) -> HarnessConfig {
    HarnessConfig {
        corpus_dir: corpus.to_path_buf(),
        parser: parser.into(),
        timeout_ms: 5_000,
        ..HarnessConfig::default()
    }
}

/// Run the harness in-process, returning the summary and console output.
pub fn run(config: HarnessConfig) -> (RunSummary, String) {
    let mut reporter = ConsoleReporter::new(Vec::new());
    let summary = Harness::new(config)
        .run(&mut reporter)
        .expect("harness run");
    let text = String::from_utf8(reporter.into_inner()).expect("utf-8 report");
    (summary, text)
}
