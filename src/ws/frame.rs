//! Frame types and header helpers.

use core::fmt;

/// The opcode nibble of a WebSocket frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FrameType {
    Continuation = 0x0,
    Text = 0x1,
    Binary = 0x2,
    Close = 0x8,
    Ping = 0x9,
    Pong = 0xA,
}

impl FrameType {
    pub fn from_opcode(opcode: u8) -> Option<Self> {
        match opcode {
            0x0 => Some(Self::Continuation),
            0x1 => Some(Self::Text),
            0x2 => Some(Self::Binary),
            0x8 => Some(Self::Close),
            0x9 => Some(Self::Ping),
            0xA => Some(Self::Pong),
            _ => None,
        }
    }

    pub const fn opcode(self) -> u8 {
        self as u8
    }

    /// Close, ping and pong. Control frames may not be fragmented.
    pub const fn is_control(self) -> bool {
        self as u8 & 0x8 != 0
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Continuation => "continuation",
            Self::Text => "text",
            Self::Binary => "binary",
            Self::Close => "close",
            Self::Ping => "ping",
            Self::Pong => "pong",
        }
    }
}

impl fmt::Display for FrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Largest payload a control frame may carry.
pub const MAX_CONTROL_PAYLOAD: usize = 125;

/// First two header bytes plus optional extended length and mask key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub frame_type: FrameType,
    pub fin: bool,
    pub mask: Option<[u8; 4]>,
}

impl FrameHeader {
    /// A final, unmasked frame.
    pub const fn new(frame_type: FrameType) -> Self {
        Self {
            frame_type,
            fin: true,
            mask: None,
        }
    }

    #[must_use]
    pub const fn fin(mut self, fin: bool) -> Self {
        self.fin = fin;
        self
    }

    #[must_use]
    pub const fn masked(mut self, key: [u8; 4]) -> Self {
        self.mask = Some(key);
        self
    }
}

/// Split a close payload into status code and reason.
///
/// Payloads shorter than two bytes carry no status code and are returned
/// whole as the reason.
pub fn split_close_payload(payload: &[u8]) -> (Option<u16>, &[u8]) {
    match payload {
        [hi, lo, reason @ ..] => (Some(u16::from_be_bytes([*hi, *lo])), reason),
        _ => (None, payload),
    }
}
