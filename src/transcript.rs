//! Line-oriented rendering of a parsed frame stream.
//!
//! One line per completed message, so the output is identical for every
//! split of the same input:
//!
//! ```text
//! text "Hello"
//! ping "\x01\x02"
//! close 1000 "bye"
//! error invalid_opcode
//! ```
//!
//! Payloads use Rust's ASCII escaping, which reads the same as the chunk
//! literals in harness fixtures.

use core::fmt;
use std::io::{self, Write};

use log::{debug, warn};

use crate::config::DumpConfig;
use crate::error::ParseError;
use crate::ws::{FrameHandler, FrameType, MAX_CONTROL_PAYLOAD, Parser, split_close_payload};

/// Token written when a data message exceeds the configured cap.
pub const MESSAGE_TOO_LARGE: &str = "message_too_large";

// ── Handler errors ───────────────────────────────────────────

#[derive(Debug)]
pub enum TranscriptError {
    Io(io::Error),
    MessageTooLarge { limit: usize },
}

impl fmt::Display for TranscriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "write failed: {e}"),
            Self::MessageTooLarge { limit } => write!(f, "message exceeds {limit} bytes"),
        }
    }
}

impl std::error::Error for TranscriptError {}

impl From<io::Error> for TranscriptError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

// ── Transcript handler ───────────────────────────────────────

/// [`FrameHandler`] that buffers each message and writes one line when it
/// completes.
pub struct Transcript<W: Write> {
    out: W,
    max_message: usize,
    data_type: Option<FrameType>,
    data: Vec<u8>,
    control_type: Option<FrameType>,
    control: heapless::Vec<u8, MAX_CONTROL_PAYLOAD>,
}

impl<W: Write> Transcript<W> {
    pub fn new(out: W, max_message: usize) -> Self {
        Self {
            out,
            max_message,
            data_type: None,
            data: Vec::new(),
            control_type: None,
            control: heapless::Vec::new(),
        }
    }

    /// Write an `error <name>` line.
    pub fn write_error(&mut self, name: &str) -> io::Result<()> {
        writeln!(self.out, "error {name}")
    }

    pub fn write_truncated(&mut self) -> io::Result<()> {
        writeln!(self.out, "truncated")
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_payload_line(&mut self, label: &str, payload: &[u8]) -> io::Result<()> {
        writeln!(self.out, "{label} \"{}\"", payload.escape_ascii())
    }
}

impl<W: Write> FrameHandler for Transcript<W> {
    type Error = TranscriptError;

    fn on_data_begin(&mut self, frame_type: FrameType) -> Result<(), Self::Error> {
        self.data_type = Some(frame_type);
        self.data.clear();
        Ok(())
    }

    fn on_data_payload(&mut self, payload: &[u8]) -> Result<(), Self::Error> {
        if self.data.len() + payload.len() > self.max_message {
            return Err(TranscriptError::MessageTooLarge {
                limit: self.max_message,
            });
        }
        self.data.extend_from_slice(payload);
        Ok(())
    }

    fn on_data_end(&mut self) -> Result<(), Self::Error> {
        let label = self.data_type.take().map_or("data", FrameType::name);
        let data = core::mem::take(&mut self.data);
        self.write_payload_line(label, &data)?;
        Ok(())
    }

    fn on_control_begin(&mut self, frame_type: FrameType) -> Result<(), Self::Error> {
        self.control_type = Some(frame_type);
        self.control.clear();
        Ok(())
    }

    fn on_control_payload(&mut self, payload: &[u8]) -> Result<(), Self::Error> {
        // The parser already rejects control frames over 125 bytes.
        if self.control.extend_from_slice(payload).is_err() {
            warn!("control payload overflow, truncating");
        }
        Ok(())
    }

    fn on_control_end(&mut self) -> Result<(), Self::Error> {
        let payload = core::mem::take(&mut self.control);

        match self.control_type.take() {
            Some(FrameType::Close) => match split_close_payload(&payload) {
                (None, []) => writeln!(self.out, "close")?,
                (None, raw) => self.write_payload_line("close", raw)?,
                (Some(code), []) => writeln!(self.out, "close {code}")?,
                (Some(code), reason) => {
                    writeln!(self.out, "close {code} \"{}\"", reason.escape_ascii())?;
                }
            },
            Some(t) => self.write_payload_line(t.name(), &payload)?,
            None => self.write_payload_line("control", &payload)?,
        }
        Ok(())
    }
}

// ── Session: parser + transcript ─────────────────────────────

/// How a transcribed stream ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    /// Ended between frames with no open message.
    Clean,
    /// Stopped at a protocol (or size) error.
    Failed,
    /// Input ended mid-frame or mid-message.
    Truncated,
}

impl StreamStatus {
    /// Process exit code for the dump binary.
    pub const fn exit_code(self) -> i32 {
        match self {
            Self::Clean => 0,
            Self::Failed | Self::Truncated => 1,
        }
    }
}

/// Drives a [`Parser`] into a [`Transcript`].
///
/// After the first error the session keeps accepting input but ignores it,
/// so a writer on the other end of a pipe never sees a broken pipe.
pub struct Session<W: Write> {
    parser: Parser,
    transcript: Transcript<W>,
    failed: bool,
}

impl<W: Write> Session<W> {
    pub fn new(out: W, config: &DumpConfig) -> Self {
        Self {
            parser: Parser::new(),
            transcript: Transcript::new(out, config.max_message),
            failed: false,
        }
    }

    pub fn feed(&mut self, data: &mut [u8]) -> io::Result<()> {
        if self.failed {
            return Ok(());
        }

        match self.parser.execute(&mut self.transcript, data) {
            Ok(()) => Ok(()),
            Err(ParseError::Protocol(e)) => {
                debug!("protocol error {} ({}): {}", e.code(), e.name(), e);
                self.fail(e.name())
            }
            Err(ParseError::Handler(TranscriptError::MessageTooLarge { limit })) => {
                debug!("message exceeds {} bytes", limit);
                self.fail(MESSAGE_TOO_LARGE)
            }
            Err(ParseError::Handler(TranscriptError::Io(e))) => Err(e),
        }
    }

    /// Flush the trailing state and hand back the writer.
    pub fn finish(mut self) -> io::Result<(W, StreamStatus)> {
        let status = if self.failed {
            StreamStatus::Failed
        } else if self.parser.is_idle() {
            StreamStatus::Clean
        } else {
            self.transcript.write_truncated()?;
            StreamStatus::Truncated
        };
        Ok((self.transcript.into_inner(), status))
    }

    fn fail(&mut self, name: &str) -> io::Result<()> {
        self.failed = true;
        debug!("stream failed: {}", name);
        self.transcript.write_error(name)
    }
}

/// Transcribe a sequence of chunks in memory.
pub fn render<'a, I>(chunks: I, config: &DumpConfig) -> (Vec<u8>, StreamStatus)
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut session = Session::new(Vec::new(), config);
    let mut scratch = Vec::new();
    for chunk in chunks {
        scratch.clear();
        scratch.extend_from_slice(chunk);
        // Writing into a Vec cannot fail.
        let _ = session.feed(&mut scratch);
    }
    match session.finish() {
        Ok(result) => result,
        Err(_) => (Vec::new(), StreamStatus::Failed),
    }
}
