//! Streaming WebSocket frame parser and a chunk-boundary conformance harness.
//!
//! - [`ws`]: the incremental frame parser, its callback port and an encoder.
//! - [`transcript`]: turns a parsed stream into one line per message; this
//!   is what the `wsframe-dump` binary prints.
//! - [`harness`]: runs fixture files against a parser executable, writing
//!   each chunk as a separate write, and diffs the captured output.

#![deny(unused_must_use)]

pub mod config;
pub mod error;
pub mod harness;
pub mod transcript;
pub mod ws;
