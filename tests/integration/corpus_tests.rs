//! The shipped corpus in `tests/corpus` against the reference parser.

use wsframe::config::{DumpConfig, default_corpus_dir};
use wsframe::harness::discover;
use wsframe::transcript::render;

use crate::common::{DUMP, config, run};

#[test]
fn shipped_corpus_passes_against_dump() {
    let (summary, text) = run(config(&default_corpus_dir(), DUMP));
    assert!(summary.all_passed(), "{text}");
    assert!(summary.passed >= 15, "corpus unexpectedly small: {}", summary.passed);
}

#[test]
fn shipped_corpus_is_split_independent() {
    let entries = discover(&default_corpus_dir(), None).unwrap();
    let dump_config = DumpConfig::default();

    for entry in entries {
        let fixture = entry.fixture.unwrap_or_else(|e| panic!("{}: {e}", entry.name));
        let input = fixture.input();

        let (whole, _) = render([input.as_slice()], &dump_config);
        assert_eq!(whole, fixture.expected, "{} (one write)", fixture.name);

        let (bytewise, _) = render(input.chunks(1), &dump_config);
        assert_eq!(bytewise, fixture.expected, "{} (bytewise)", fixture.name);

        let written = fixture.chunks.iter().map(|c| c.bytes.as_slice());
        let (as_written, _) = render(written, &dump_config);
        assert_eq!(as_written, fixture.expected, "{} (as written)", fixture.name);
    }
}
