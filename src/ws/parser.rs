//! Streaming WebSocket frame parser.
//!
//! Wire format (RFC 6455 §5.2):
//! ```text
//! ┌───┬─────┬────────┬───┬─────────┬──────────────────┬──────────┬─────────┐
//! │FIN│RSV1-3│ opcode │ M │ len (7) │ ext len (0/2/8 B)│ mask (4B)│ payload │
//! └───┴─────┴────────┴───┴─────────┴──────────────────┴──────────┴─────────┘
//! ```
//!
//! The parser is a byte-driven state machine with no internal buffering.
//! Any split of the input stream produces the same sequence of
//! begin/end callbacks and the same concatenated payload bytes; only the
//! slicing of payload callbacks follows the input boundaries.

use super::frame::{FrameType, MAX_CONTROL_PAYLOAD};
use crate::error::{ParseError, ProtocolError};

/// Callback port driven by [`Parser::execute`].
///
/// Returning `Err` from any callback aborts the current `execute` call and
/// surfaces as [`ParseError::Handler`].
pub trait FrameHandler {
    type Error;

    /// A text or binary message starts. Called once per message, not once
    /// per fragment.
    fn on_data_begin(&mut self, frame_type: FrameType) -> Result<(), Self::Error>;

    /// Unmasked message payload bytes.
    fn on_data_payload(&mut self, payload: &[u8]) -> Result<(), Self::Error>;

    /// The final fragment of the current message ended.
    fn on_data_end(&mut self) -> Result<(), Self::Error>;

    fn on_control_begin(&mut self, frame_type: FrameType) -> Result<(), Self::Error>;

    fn on_control_payload(&mut self, payload: &[u8]) -> Result<(), Self::Error>;

    fn on_control_end(&mut self) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Expecting FIN/RSV/opcode byte.
    Opcode,
    /// Expecting MASK bit + 7-bit length.
    Length,
    /// Reading a big-endian extended length of `width` bytes.
    ExtLength { width: u8, remaining: u8 },
    /// Reading the masking key.
    Mask { collected: u8 },
    Payload,
    /// A protocol error occurred; sticky until `reset`.
    Failed(ProtocolError),
}

/// Incremental frame parser.
#[derive(Debug, Clone)]
pub struct Parser {
    state: State,
    fin: bool,
    control: bool,
    masked: bool,
    /// A text/binary message without FIN is open.
    fragmented: bool,
    mask: [u8; 4],
    mask_pos: usize,
    bytes_remaining: u64,
}

impl Parser {
    pub fn new() -> Self {
        Self {
            state: State::Opcode,
            fin: false,
            control: false,
            masked: false,
            fragmented: false,
            mask: [0; 4],
            mask_pos: 0,
            bytes_remaining: 0,
        }
    }

    /// Return to the initial state, discarding any partial frame.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Between frames with no fragmented message open.
    pub fn is_idle(&self) -> bool {
        self.state == State::Opcode && !self.fragmented
    }

    /// The error that stopped the parser, if any.
    pub fn error(&self) -> Option<ProtocolError> {
        match self.state {
            State::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Feed bytes into the parser.
    ///
    /// Masked payload bytes are unmasked in place before being handed to
    /// the handler, which is why `data` is mutable.
    pub fn execute<H: FrameHandler>(
        &mut self,
        handler: &mut H,
        data: &mut [u8],
    ) -> Result<(), ParseError<H::Error>> {
        let mut offset = 0;

        if let State::Failed(e) = self.state {
            return Err(e.into());
        }

        while offset < data.len() {
            let byte = data[offset];

            match self.state {
                State::Opcode => {
                    self.begin_frame(handler, byte)?;
                    offset += 1;
                }

                State::Length => {
                    offset += 1;
                    self.read_length(handler, byte)?;
                }

                State::ExtLength { width, remaining } => {
                    offset += 1;
                    self.bytes_remaining = (self.bytes_remaining << 8) | u64::from(byte);

                    if remaining > 1 {
                        self.state = State::ExtLength {
                            width,
                            remaining: remaining - 1,
                        };
                        continue;
                    }

                    let min = if width == 2 { 126 } else { 65_536 };
                    if self.bytes_remaining < min {
                        return Err(self.fail(ProtocolError::NonCanonicalLength));
                    }
                    self.after_length(handler)?;
                }

                State::Mask { collected } => {
                    offset += 1;
                    self.mask[collected as usize] = byte;

                    if collected < 3 {
                        self.state = State::Mask {
                            collected: collected + 1,
                        };
                    } else {
                        self.enter_payload(handler)?;
                    }
                }

                State::Payload => {
                    let available = (data.len() - offset) as u64;
                    let take = available.min(self.bytes_remaining) as usize;
                    let chunk = &mut data[offset..offset + take];

                    if self.masked {
                        for b in chunk.iter_mut() {
                            *b ^= self.mask[self.mask_pos];
                            self.mask_pos = (self.mask_pos + 1) & 3;
                        }
                    }

                    let rc = if self.control {
                        handler.on_control_payload(chunk)
                    } else {
                        handler.on_data_payload(chunk)
                    };
                    rc.map_err(ParseError::Handler)?;

                    offset += take;
                    self.bytes_remaining -= take as u64;

                    if self.bytes_remaining == 0 {
                        self.end_of_payload(handler)?;
                    }
                }

                State::Failed(e) => return Err(e.into()),
            }
        }

        Ok(())
    }

    fn begin_frame<H: FrameHandler>(
        &mut self,
        handler: &mut H,
        byte: u8,
    ) -> Result<(), ParseError<H::Error>> {
        if byte & 0x70 != 0 {
            return Err(self.fail(ProtocolError::ReservedBitsSet));
        }

        self.fin = byte & 0x80 != 0;

        match FrameType::from_opcode(byte & 0x0f) {
            Some(FrameType::Continuation) => {
                if !self.fragmented {
                    return Err(self.fail(ProtocolError::InvalidContinuation));
                }
                self.control = false;
            }
            Some(t) if t.is_control() => {
                if !self.fin {
                    return Err(self.fail(ProtocolError::FragmentedControl));
                }
                self.control = true;
                handler.on_control_begin(t).map_err(ParseError::Handler)?;
            }
            Some(t) => {
                if self.fragmented {
                    return Err(self.fail(ProtocolError::InterleavedData));
                }
                self.control = false;
                self.fragmented = !self.fin;
                handler.on_data_begin(t).map_err(ParseError::Handler)?;
            }
            None => return Err(self.fail(ProtocolError::InvalidOpcode)),
        }

        self.state = State::Length;
        Ok(())
    }

    fn read_length<H: FrameHandler>(
        &mut self,
        handler: &mut H,
        byte: u8,
    ) -> Result<(), ParseError<H::Error>> {
        let length = byte & 0x7f;

        self.masked = byte & 0x80 != 0;
        self.mask_pos = 0;
        self.bytes_remaining = 0;

        if self.control && usize::from(length) > MAX_CONTROL_PAYLOAD {
            return Err(self.fail(ProtocolError::ControlTooLong));
        }

        match length {
            126 => {
                self.state = State::ExtLength {
                    width: 2,
                    remaining: 2,
                };
                Ok(())
            }
            127 => {
                self.state = State::ExtLength {
                    width: 8,
                    remaining: 8,
                };
                Ok(())
            }
            n => {
                self.bytes_remaining = u64::from(n);
                self.after_length(handler)
            }
        }
    }

    fn after_length<H: FrameHandler>(
        &mut self,
        handler: &mut H,
    ) -> Result<(), ParseError<H::Error>> {
        if self.masked {
            self.state = State::Mask { collected: 0 };
            Ok(())
        } else {
            self.enter_payload(handler)
        }
    }

    fn enter_payload<H: FrameHandler>(
        &mut self,
        handler: &mut H,
    ) -> Result<(), ParseError<H::Error>> {
        if self.bytes_remaining == 0 {
            self.end_of_payload(handler)
        } else {
            self.state = State::Payload;
            Ok(())
        }
    }

    fn end_of_payload<H: FrameHandler>(
        &mut self,
        handler: &mut H,
    ) -> Result<(), ParseError<H::Error>> {
        self.state = State::Opcode;

        if self.control {
            handler.on_control_end().map_err(ParseError::Handler)
        } else if self.fin {
            self.fragmented = false;
            handler.on_data_end().map_err(ParseError::Handler)
        } else {
            Ok(())
        }
    }

    fn fail<E>(&mut self, error: ProtocolError) -> ParseError<E> {
        self.state = State::Failed(error);
        ParseError::Protocol(error)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

// ── Tests ────────────────────────────────────────────────────
