//! One parser-under-test lifecycle: spawn, write chunks, close, wait, capture.
//!
//! ```text
//!   harness ──chunk──▶ stdin ┐
//!           ──chunk──▶       │  child  ──▶ stdout ──▶ temp file
//!           ──EOF────▶       ┘         ──▶ stderr ──▶ temp file
//! ```
//!
//! Output goes to scoped temp files rather than pipes, so the child never
//! blocks on a full output pipe. Chunks are written from a helper thread
//! that reports back over a channel. The thread is never joined: if the
//! child (or something it spawned that inherited stdin) stops reading, the
//! writer is abandoned at the deadline instead of holding up the run.

use core::fmt;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};
use tempfile::NamedTempFile;

use super::fixture::Chunk;

/// How often a running child is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// What to run and how.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub program: &'a Path,
    pub args: &'a [String],
    pub timeout: Duration,
    pub chunk_pause: Duration,
    pub scratch_dir: Option<&'a Path>,
}

/// Output of a child that ran to completion.
#[derive(Debug)]
pub struct Captured {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub status: ExitStatus,
}

#[derive(Debug)]
pub enum ProcessError {
    /// Temp file for output capture could not be created or read.
    Capture(io::Error),
    Spawn(io::Error),
    /// Writing a chunk (or closing stdin) failed.
    Write { line: usize, error: io::Error },
    Wait(io::Error),
    /// Child still running at the deadline; it was killed.
    Timeout(Duration),
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Capture(e) => write!(f, "output capture failed: {e}"),
            Self::Spawn(e) => write!(f, "failed to spawn parser: {e}"),
            Self::Write { line, error } => write!(f, "write of chunk line {line} failed: {error}"),
            Self::Wait(e) => write!(f, "failed waiting for parser: {e}"),
            Self::Timeout(d) => write!(f, "timed out after {} ms", d.as_millis()),
        }
    }
}

impl std::error::Error for ProcessError {}

/// Run one child over `chunks`.
///
/// Temp files are removed when this returns, on every path.
pub fn run(inv: &Invocation<'_>, chunks: &[Chunk]) -> Result<Captured, ProcessError> {
    let stdout_file = scratch_file(inv.scratch_dir)?;
    let stderr_file = scratch_file(inv.scratch_dir)?;

    let mut child = Command::new(inv.program)
        .args(inv.args)
        .stdin(Stdio::piped())
        .stdout(Stdio::from(stdout_file.reopen().map_err(ProcessError::Capture)?))
        .stderr(Stdio::from(stderr_file.reopen().map_err(ProcessError::Capture)?))
        .spawn()
        .map_err(ProcessError::Spawn)?;

    debug!(
        "spawned {} (pid {}), {} chunks",
        inv.program.display(),
        child.id(),
        chunks.len()
    );

    let Some(mut stdin) = child.stdin.take() else {
        reap(&mut child);
        return Err(ProcessError::Spawn(io::Error::other("child stdin not captured")));
    };

    let deadline = Instant::now().checked_add(inv.timeout);
    let (tx, rx) = mpsc::channel();
    let owned = chunks.to_vec();
    let pause = inv.chunk_pause;
    let spawned = thread::Builder::new()
        .name("wsframe-writer".into())
        .spawn(move || {
            let _ = tx.send(write_chunks(&mut stdin, &owned, pause));
        });
    if let Err(error) = spawned {
        reap(&mut child);
        return Err(ProcessError::Write { line: 0, error });
    }

    let status = wait_with_deadline(&mut child, deadline, inv.timeout)?;
    wait_for_writer(&rx, deadline, inv.timeout)?;

    let stdout = std::fs::read(stdout_file.path()).map_err(ProcessError::Capture)?;
    let stderr = std::fs::read(stderr_file.path()).map_err(ProcessError::Capture)?;

    debug!(
        "parser exited with {}, {} bytes stdout, {} bytes stderr",
        status,
        stdout.len(),
        stderr.len()
    );

    Ok(Captured {
        stdout,
        stderr,
        status,
    })
}

fn scratch_file(dir: Option<&Path>) -> Result<NamedTempFile, ProcessError> {
    let file = match dir {
        Some(dir) => NamedTempFile::new_in(dir),
        None => NamedTempFile::new(),
    };
    file.map_err(ProcessError::Capture)
}

/// One `write_all` + `flush` per chunk; stdin is closed when the caller drops it.
fn write_chunks<W: Write>(
    stdin: &mut W,
    chunks: &[Chunk],
    pause: Duration,
) -> Result<(), ProcessError> {
    let mut first = true;
    for chunk in chunks.iter().filter(|c| !c.bytes.is_empty()) {
        if !first && !pause.is_zero() {
            thread::sleep(pause);
        }
        first = false;

        stdin
            .write_all(&chunk.bytes)
            .and_then(|()| stdin.flush())
            .map_err(|error| ProcessError::Write {
                line: chunk.line,
                error,
            })?;
    }
    Ok(())
}

fn wait_with_deadline(
    child: &mut Child,
    deadline: Option<Instant>,
    timeout: Duration,
) -> Result<ExitStatus, ProcessError> {
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {
                if deadline.is_some_and(|d| Instant::now() >= d) {
                    warn!("parser pid {} exceeded {:?}, killing", child.id(), timeout);
                    reap(child);
                    return Err(ProcessError::Timeout(timeout));
                }
                thread::sleep(POLL_INTERVAL);
            }
            Err(e) => {
                reap(child);
                return Err(ProcessError::Wait(e));
            }
        }
    }
}

/// The child has exited; its stdin may still be held open by a process it
/// left behind. Give the writer until the same deadline.
fn wait_for_writer(
    rx: &mpsc::Receiver<Result<(), ProcessError>>,
    deadline: Option<Instant>,
    timeout: Duration,
) -> Result<(), ProcessError> {
    let received = match deadline {
        Some(d) => rx.recv_timeout(d.saturating_duration_since(Instant::now())),
        None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
    };
    match received {
        Ok(written) => written,
        Err(RecvTimeoutError::Timeout) => {
            warn!("stdin still blocked after {:?}, abandoning writer", timeout);
            Err(ProcessError::Timeout(timeout))
        }
        Err(RecvTimeoutError::Disconnected) => Err(ProcessError::Write {
            line: 0,
            error: io::Error::other("writer thread panicked"),
        }),
    }
}

/// Kill and wait, ignoring errors (the child may already be gone).
fn reap(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}
