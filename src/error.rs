//! Typed error enums for the frame parser and the fixture loader.
//!
//! Domain errors are plain `Copy`/`Clone` enums with hand-written `Display`
//! impls. The harness driver and the binaries wrap them in `anyhow` at the
//! boundary where context matters more than matching.

use core::fmt;

// ---------------------------------------------------------------------------
// WebSocket protocol errors
// ---------------------------------------------------------------------------

/// A violation of the WebSocket framing rules detected by the parser.
///
/// Each variant has a stable negative status code and a snake_case name
/// used in transcripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolError {
    /// One of RSV1..RSV3 was set (no extensions are negotiated).
    ReservedBitsSet,
    /// Opcode is not one of continuation/text/binary/close/ping/pong.
    InvalidOpcode,
    /// Continuation frame without a fragmented message in progress.
    InvalidContinuation,
    /// Control frame payload longer than 125 bytes.
    ControlTooLong,
    /// Extended length used where a shorter encoding would fit.
    NonCanonicalLength,
    /// Control frame with FIN cleared.
    FragmentedControl,
    /// New text/binary frame while a fragmented message is still open.
    InterleavedData,
}

impl ProtocolError {
    /// Negative status code.
    pub const fn code(self) -> i32 {
        match self {
            Self::ReservedBitsSet => -1,
            Self::InvalidOpcode => -2,
            Self::InvalidContinuation => -3,
            Self::ControlTooLong => -4,
            Self::NonCanonicalLength => -5,
            Self::FragmentedControl => -6,
            Self::InterleavedData => -7,
        }
    }

    /// Stable snake_case token used in transcripts.
    pub const fn name(self) -> &'static str {
        match self {
            Self::ReservedBitsSet => "reserved_bits_set",
            Self::InvalidOpcode => "invalid_opcode",
            Self::InvalidContinuation => "invalid_continuation",
            Self::ControlTooLong => "control_too_long",
            Self::NonCanonicalLength => "non_canonical_length",
            Self::FragmentedControl => "fragmented_control",
            Self::InterleavedData => "interleaved_data",
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReservedBitsSet => write!(f, "reserved bits set"),
            Self::InvalidOpcode => write!(f, "invalid opcode"),
            Self::InvalidContinuation => write!(f, "continuation without fragmented message"),
            Self::ControlTooLong => write!(f, "control frame payload exceeds 125 bytes"),
            Self::NonCanonicalLength => write!(f, "non-canonical payload length"),
            Self::FragmentedControl => write!(f, "fragmented control frame"),
            Self::InterleavedData => write!(f, "data frame inside fragmented message"),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Error returned by [`Parser::execute`](crate::ws::Parser::execute).
///
/// Either the stream broke the protocol, or the handler asked to stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError<E> {
    Protocol(ProtocolError),
    Handler(E),
}

impl<E: fmt::Display> fmt::Display for ParseError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Protocol(e) => write!(f, "protocol: {e}"),
            Self::Handler(e) => write!(f, "handler: {e}"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for ParseError<E> {}

impl<E> From<ProtocolError> for ParseError<E> {
    fn from(e: ProtocolError) -> Self {
        Self::Protocol(e)
    }
}

// ---------------------------------------------------------------------------
// Chunk literal errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralErrorKind {
    /// Closing quote missing.
    UnterminatedString,
    /// Backslash followed by an unsupported character.
    InvalidEscape(char),
    /// `\x` or `x"..."` with a non-hex digit.
    InvalidHex,
    /// `x"..."` with an odd number of hex digits.
    OddHexDigits,
    /// A string literal was expected.
    ExpectedAtom,
    /// A repeat count was expected after `*`.
    ExpectedCount,
    /// Input left over after a complete expression.
    TrailingInput,
    /// The evaluated line exceeds the size cap.
    TooLarge,
}

impl fmt::Display for LiteralErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedString => write!(f, "unterminated string"),
            Self::InvalidEscape(c) => write!(f, "invalid escape '\\{}'", c.escape_default()),
            Self::InvalidHex => write!(f, "invalid hex digit"),
            Self::OddHexDigits => write!(f, "odd number of hex digits"),
            Self::ExpectedAtom => write!(f, "expected a string literal"),
            Self::ExpectedCount => write!(f, "expected a repeat count"),
            Self::TrailingInput => write!(f, "unexpected trailing input"),
            Self::TooLarge => write!(f, "literal too large"),
        }
    }
}

/// A syntax error in a chunk line, with its 1-based column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiteralError {
    pub column: usize,
    pub kind: LiteralErrorKind,
}

impl fmt::Display for LiteralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "column {}: {}", self.column, self.kind)
    }
}

impl std::error::Error for LiteralError {}

// ---------------------------------------------------------------------------
// Fixture errors
// ---------------------------------------------------------------------------

/// A fixture file that could be read but not understood.
///
/// These fail the single fixture; they never abort the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FixtureError {
    /// No blank line separating chunks from expected output.
    MissingSeparator,
    /// The chunk section is not valid UTF-8.
    NonUtf8Chunks,
    /// A chunk line failed to parse.
    Literal { line: usize, error: LiteralError },
}

impl fmt::Display for FixtureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSeparator => write!(f, "missing blank line between chunks and expected output"),
            Self::NonUtf8Chunks => write!(f, "chunk section is not valid UTF-8"),
            Self::Literal { line, error } => write!(f, "chunk line {line}, {error}"),
        }
    }
}

impl std::error::Error for FixtureError {}
