//! Fuzz target: `Parser::execute` through the transcript session.
//!
//! The first byte picks a split point; the rest is the frame stream. The
//! transcript must never panic and must be the same whether the stream is
//! fed whole or in two pieces.
//!
//! cargo fuzz run fuzz_frame_parser

#![no_main]

use libfuzzer_sys::fuzz_target;
use wsframe::config::DumpConfig;
use wsframe::transcript::render;

fuzz_target!(|data: &[u8]| {
    let Some((&split, stream)) = data.split_first() else {
        return;
    };
    let config = DumpConfig {
        max_message: 4096,
        ..DumpConfig::default()
    };

    let (whole, whole_status) = render([stream], &config);

    let at = usize::from(split).min(stream.len());
    let (head, tail) = stream.split_at(at);
    let (split_out, split_status) = render([head, tail], &config);

    assert_eq!(whole, split_out, "transcript depends on chunking");
    assert_eq!(whole_status, split_status);
});
