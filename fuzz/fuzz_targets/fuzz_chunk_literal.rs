//! Fuzz target: fixture parsing and chunk literal evaluation.
//!
//! Arbitrary fixture files must be rejected or accepted without panicking,
//! and evaluated chunks must respect the size cap.
//!
//! cargo fuzz run fuzz_chunk_literal

#![no_main]

use libfuzzer_sys::fuzz_target;
use wsframe::harness::fixture::Fixture;
use wsframe::harness::literal::MAX_LITERAL_LEN;

fuzz_target!(|data: &[u8]| {
    if let Ok(fixture) = Fixture::parse("fuzz", data) {
        for chunk in &fixture.chunks {
            assert!(chunk.bytes.len() <= MAX_LITERAL_LEN);
        }
    }
});
