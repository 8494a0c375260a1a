//! Frame encoder, the inverse of [`Parser`](super::Parser).
//!
//! Always emits the shortest (canonical) length encoding.

use super::frame::{FrameHeader, MAX_CONTROL_PAYLOAD};

/// Encode one frame.
///
/// Returns `None` for frames the parser would reject on principle: control
/// frames that are fragmented or longer than 125 bytes.
pub fn encode_frame(header: FrameHeader, payload: &[u8]) -> Option<Vec<u8>> {
    if header.frame_type.is_control() && (!header.fin || payload.len() > MAX_CONTROL_PAYLOAD) {
        return None;
    }

    let mut out = Vec::with_capacity(payload.len() + 14);

    let fin = if header.fin { 0x80 } else { 0 };
    out.push(fin | header.frame_type.opcode());

    let mask_bit = if header.mask.is_some() { 0x80 } else { 0 };
    match payload.len() {
        n if n < 126 => out.push(mask_bit | n as u8),
        n if n <= usize::from(u16::MAX) => {
            out.push(mask_bit | 126);
            out.extend_from_slice(&(n as u16).to_be_bytes());
        }
        n => {
            out.push(mask_bit | 127);
            out.extend_from_slice(&(n as u64).to_be_bytes());
        }
    }

    match header.mask {
        Some(key) => {
            out.extend_from_slice(&key);
            out.extend(payload.iter().zip(key.iter().cycle()).map(|(b, k)| b ^ k));
        }
        None => out.extend_from_slice(payload),
    }

    Some(out)
}
