//! Chunk-boundary conformance harness.
//!
//! ```text
//!   corpus/ ──discover──▶ CorpusEntry ──┬─ malformed ─────────────────┐
//!                                       └─ process::run ─▶ Captured   │
//!                                            │ compare / diff         │
//!                                            ▼                        ▼
//!                                      FixtureOutcome ──▶ Reporter ──▶ RunSummary
//! ```
//!
//! Fixtures run one after another. A failing fixture never stops the run;
//! only corpus access errors are fatal.

pub mod diff;
pub mod fixture;
pub mod literal;
pub mod process;
pub mod report;

use std::time::Instant;

use anyhow::{Context, Result};
use log::{debug, info, warn};

use crate::config::HarnessConfig;
use fixture::{CorpusEntry, Fixture};
use process::{Invocation, ProcessError};
use report::{FailureReason, FixtureOutcome, Reporter, RunSummary};

pub use fixture::discover;

/// Runs a corpus against one parser executable.
#[derive(Debug, Clone)]
pub struct Harness {
    config: HarnessConfig,
}

impl Harness {
    pub fn new(config: HarnessConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run every fixture in the corpus, reporting as each one finishes.
    ///
    /// Errors only for corpus access or reporter output failures.
    pub fn run<R: Reporter + ?Sized>(&self, reporter: &mut R) -> Result<RunSummary> {
        let entries = discover(&self.config.corpus_dir, self.config.filter.as_deref())?;
        info!(
            "running {} fixtures from {} against {}",
            entries.len(),
            self.config.corpus_dir.display(),
            self.config.parser.display()
        );
        if entries.is_empty() {
            warn!("corpus '{}' has no fixtures", self.config.corpus_dir.display());
        }

        let mut summary = RunSummary::default();
        for entry in &entries {
            let outcome = self.run_entry(entry);
            reporter
                .fixture_finished(&outcome)
                .context("failed to write report")?;
            summary.record(outcome);
        }

        reporter.finish(&summary).context("failed to write report")?;
        info!("{} passed, {} failed", summary.passed, summary.failed);
        Ok(summary)
    }

    fn run_entry(&self, entry: &CorpusEntry) -> FixtureOutcome {
        match &entry.fixture {
            Ok(fixture) => self.run_fixture(fixture),
            Err(e) => {
                warn!("{}: {}", entry.path.display(), e);
                FixtureOutcome::failed(
                    entry.name.clone(),
                    FailureReason::Malformed(e.to_string()),
                    std::time::Duration::ZERO,
                )
            }
        }
    }

    /// Spawn, feed, wait, compare.
    pub fn run_fixture(&self, fixture: &Fixture) -> FixtureOutcome {
        let started = Instant::now();
        let invocation = Invocation {
            program: &self.config.parser,
            args: &self.config.parser_args,
            timeout: self.config.timeout(),
            chunk_pause: self.config.chunk_pause(),
            scratch_dir: self.config.scratch_dir.as_deref(),
        };

        let captured = match process::run(&invocation, &fixture.chunks) {
            Ok(captured) => captured,
            Err(e) => {
                warn!("{}: {}", fixture.name, e);
                return FixtureOutcome::failed(
                    fixture.name.clone(),
                    failure_reason(e),
                    started.elapsed(),
                );
            }
        };

        if !captured.status.success() {
            debug!("{}: parser exited with {}", fixture.name, captured.status);
        }

        let mut outcome = if captured.stdout == fixture.expected {
            FixtureOutcome::passed(fixture.name.clone(), started.elapsed())
        } else {
            debug!(
                "{}: expected {} bytes, got {}",
                fixture.name,
                fixture.expected.len(),
                captured.stdout.len()
            );
            let mut o = FixtureOutcome::failed(
                fixture.name.clone(),
                FailureReason::Mismatch,
                started.elapsed(),
            );
            o.diff = Some(diff::unified_diff(&fixture.expected, &captured.stdout));
            o
        };
        outcome.stderr = captured.stderr;
        outcome
    }
}

fn failure_reason(e: ProcessError) -> FailureReason {
    match e {
        ProcessError::Timeout(after) => FailureReason::Timeout {
            after_ms: u64::try_from(after.as_millis()).unwrap_or(u64::MAX),
        },
        ProcessError::Spawn(e) => FailureReason::Spawn(e.to_string()),
        e @ ProcessError::Write { .. } => FailureReason::Write(e.to_string()),
        ProcessError::Wait(e) => FailureReason::Wait(e.to_string()),
        ProcessError::Capture(e) => FailureReason::Capture(e.to_string()),
    }
}
