//! Fixture outcomes and the reporter port.
//!
//! The driver pushes every [`FixtureOutcome`] through a [`Reporter`] as soon
//! as the fixture finishes, then hands over the [`RunSummary`] once.

use core::fmt;
use std::io::{self, Write};
use std::time::Duration;

use serde::{Serialize, Serializer};

// ───────────────────────────────────────────────────────────────
// Outcomes
// ───────────────────────────────────────────────────────────────

/// Why a single fixture failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    /// Parser ran, output differs from the expected bytes.
    Mismatch,
    /// Parser was still running at the deadline and was killed.
    Timeout { after_ms: u64 },
    Spawn(String),
    Write(String),
    Wait(String),
    Capture(String),
    /// Fixture file could not be understood.
    Malformed(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mismatch => write!(f, "output mismatch"),
            Self::Timeout { after_ms } => write!(f, "timeout after {after_ms} ms"),
            Self::Spawn(e) => write!(f, "spawn failed: {e}"),
            Self::Write(e) => write!(f, "write failed: {e}"),
            Self::Wait(e) => write!(f, "wait failed: {e}"),
            Self::Capture(e) => write!(f, "capture failed: {e}"),
            Self::Malformed(e) => write!(f, "malformed fixture: {e}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum FixtureStatus {
    Passed,
    Failed(FailureReason),
}

/// Result of one fixture.
#[derive(Debug, Clone, Serialize)]
pub struct FixtureOutcome {
    pub name: String,
    #[serde(flatten)]
    pub status: FixtureStatus,
    /// Unified diff, present on `Mismatch` only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
    /// Whatever the parser wrote to stderr.
    #[serde(serialize_with = "lossy_utf8")]
    pub stderr: Vec<u8>,
    #[serde(rename = "elapsed_ms", serialize_with = "millis")]
    pub elapsed: Duration,
}

impl FixtureOutcome {
    pub fn passed(name: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            name: name.into(),
            status: FixtureStatus::Passed,
            diff: None,
            stderr: Vec::new(),
            elapsed,
        }
    }

    pub fn failed(name: impl Into<String>, reason: FailureReason, elapsed: Duration) -> Self {
        Self {
            name: name.into(),
            status: FixtureStatus::Failed(reason),
            diff: None,
            stderr: Vec::new(),
            elapsed,
        }
    }

    pub fn is_passed(&self) -> bool {
        self.status == FixtureStatus::Passed
    }

    pub fn reason(&self) -> Option<&FailureReason> {
        match &self.status {
            FixtureStatus::Passed => None,
            FixtureStatus::Failed(reason) => Some(reason),
        }
    }
}

fn lossy_utf8<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&String::from_utf8_lossy(bytes))
}

fn millis<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// Aggregate over a whole run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub passed: usize,
    pub failed: usize,
    pub outcomes: Vec<FixtureOutcome>,
}

impl RunSummary {
    pub fn record(&mut self, outcome: FixtureOutcome) {
        if outcome.is_passed() {
            self.passed += 1;
        } else {
            self.failed += 1;
        }
        self.outcomes.push(outcome);
    }

    /// True iff every fixture passed (vacuously true for an empty run).
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn exit_code(&self) -> i32 {
        i32::from(!self.all_passed())
    }
}

// ───────────────────────────────────────────────────────────────
// Reporter port
// ───────────────────────────────────────────────────────────────

/// Receives outcomes as the run progresses.
pub trait Reporter {
    fn fixture_finished(&mut self, outcome: &FixtureOutcome) -> io::Result<()>;

    fn finish(&mut self, summary: &RunSummary) -> io::Result<()>;
}

/// Human-readable progress: a dot per pass, a block per failure.
pub struct ConsoleReporter<W: Write> {
    out: W,
    /// A dot run is open on the current line.
    dots: bool,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out, dots: false }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn end_dots(&mut self) -> io::Result<()> {
        if self.dots {
            self.dots = false;
            writeln!(self.out)?;
        }
        Ok(())
    }
}

impl<W: Write> Reporter for ConsoleReporter<W> {
    fn fixture_finished(&mut self, outcome: &FixtureOutcome) -> io::Result<()> {
        let Some(reason) = outcome.reason() else {
            self.dots = true;
            write!(self.out, ".")?;
            return self.out.flush();
        };

        self.end_dots()?;
        writeln!(self.out, "FAIL {}: {}", outcome.name, reason)?;
        if let Some(diff) = &outcome.diff {
            self.out.write_all(diff.as_bytes())?;
            if !diff.ends_with('\n') {
                writeln!(self.out)?;
            }
        }
        if !outcome.stderr.is_empty() {
            writeln!(self.out, "stderr:")?;
            self.out.write_all(&outcome.stderr)?;
            if !outcome.stderr.ends_with(b"\n") {
                writeln!(self.out)?;
            }
        }
        self.out.flush()
    }

    fn finish(&mut self, summary: &RunSummary) -> io::Result<()> {
        self.end_dots()?;
        writeln!(
            self.out,
            "{} passed, {} failed",
            summary.passed, summary.failed
        )?;
        self.out.flush()
    }
}

/// Writes the whole summary as one JSON document at the end of the run.
pub struct JsonReporter<W: Write> {
    out: W,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn fixture_finished(&mut self, _outcome: &FixtureOutcome) -> io::Result<()> {
        Ok(())
    }

    fn finish(&mut self, summary: &RunSummary) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut self.out, summary)?;
        writeln!(self.out)?;
        self.out.flush()
    }
}
