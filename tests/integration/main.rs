//! Integration test driver for `tests/integration/` submodules.
//!
//! Everything here runs real subprocesses: the two crate binaries, plus a few
//! stock Unix tools standing in for well-behaved or hung parsers.

mod common;
mod corpus_tests;
mod dump_tests;
mod harness_tests;
mod cli_tests;
