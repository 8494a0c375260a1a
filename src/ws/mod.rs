//! WebSocket framing.
//!
//! ```text
//!  bytes ──▶ Parser (state machine) ──▶ FrameHandler callbacks
//!                                         │
//!                                         ▼
//!                                   Transcript / app code
//! ```

pub mod encode;
pub mod frame;
pub mod parser;

pub use encode::encode_frame;
pub use frame::{FrameHeader, FrameType, MAX_CONTROL_PAYLOAD, split_close_payload};
pub use parser::{FrameHandler, Parser};
