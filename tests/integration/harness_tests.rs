//! Harness driver behaviour against simple stand-in parsers.
//!
//! `/bin/cat` echoes its input, so a fixture's expected output is just the
//! concatenation of its chunks.

#![cfg(unix)]

use std::time::{Duration, Instant};

use wsframe::harness::report::FailureReason;

use crate::common::{config, corpus, run};

const CAT: &str = "/bin/cat";

#[test]
fn split_hello_passes() {
    let dir = corpus(&[("hello", "\"He\"\n\"llo\"\n\nHello")]);
    let (summary, text) = run(config(dir.path(), CAT));

    assert!(summary.all_passed(), "{text}");
    assert_eq!(summary.passed, 1);
    assert_eq!(text, ".\n1 passed, 0 failed\n");
}

#[test]
fn mismatch_reports_diff() {
    let dir = corpus(&[("hell", "\"He\"\n\"ll\"\n\nHello")]);
    let (summary, text) = run(config(dir.path(), CAT));

    assert!(!summary.all_passed());
    let outcome = &summary.outcomes[0];
    assert_eq!(outcome.reason(), Some(&FailureReason::Mismatch));

    let diff = outcome.diff.as_deref().expect("diff on mismatch");
    assert!(diff.contains("-Hello"), "{diff}");
    assert!(diff.contains("+Hell"), "{diff}");
    assert!(!diff.starts_with("---"));
    assert!(text.starts_with("FAIL hell: output mismatch\n@@"), "{text}");
}

#[test]
fn failing_fixture_does_not_stop_the_run() {
    let dir = corpus(&[
        ("a_wrong", "\"x\"\n\ny"),
        ("b_malformed", "\"no blank line\"\n"),
        ("c_bad_literal", "`rm -rf /`\n\nz"),
        ("d_right", "\"ok\"\n\nok"),
    ]);
    let (summary, _) = run(config(dir.path(), CAT));

    let names: Vec<_> = summary.outcomes.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, ["a_wrong", "b_malformed", "c_bad_literal", "d_right"]);
    assert_eq!((summary.passed, summary.failed), (1, 3));
    assert!(matches!(
        summary.outcomes[1].reason(),
        Some(FailureReason::Malformed(_))
    ));
    match summary.outcomes[2].reason() {
        Some(FailureReason::Malformed(msg)) => assert!(msg.contains("chunk line 1"), "{msg}"),
        other => panic!("unexpected {other:?}"),
    }
    assert!(summary.outcomes[3].is_passed());
}

#[test]
fn hung_parser_times_out_and_run_continues() {
    let dir = corpus(&[("a_slow", "\"x\"\n\nx"), ("b_slow", "\"y\"\n\ny")]);
    let mut cfg = config(dir.path(), "/bin/sleep");
    cfg.parser_args = vec!["5".into()];
    cfg.timeout_ms = 200;

    let started = Instant::now();
    let (summary, text) = run(cfg);

    assert!(started.elapsed() < Duration::from_secs(4));
    assert_eq!(summary.failed, 2);
    for outcome in &summary.outcomes {
        assert_eq!(
            outcome.reason(),
            Some(&FailureReason::Timeout { after_ms: 200 })
        );
    }
    assert!(text.contains("FAIL a_slow: timeout after 200 ms"));
}

/// A megabyte of input cannot fit in the pipe buffer, so the writer is
/// still blocked when the deadline passes. The shell's foreground `sleep`
/// keeps stdin open after the shell itself is killed.
#[test]
fn blocked_writer_does_not_outlive_timeout() {
    let dir = corpus(&[("big", "\"a\" * 1000000\n\nunused")]);
    let mut cfg = config(dir.path(), "/bin/sh");
    cfg.parser_args = vec!["-c".into(), "sleep 10 & sleep 10".into()];
    cfg.timeout_ms = 200;

    let started = Instant::now();
    let (summary, text) = run(cfg);

    assert!(
        started.elapsed() < Duration::from_secs(5),
        "run took {:?}",
        started.elapsed()
    );
    assert_eq!(
        summary.outcomes[0].reason(),
        Some(&FailureReason::Timeout { after_ms: 200 })
    );
    assert!(text.contains("FAIL big: timeout after 200 ms"));
}

/// The parser exits at once but leaves a child holding stdin open without
/// reading it.
#[test]
fn stdin_held_by_leftover_process_times_out() {
    let dir = corpus(&[("orphan", "\"a\" * 1000000\n\n")]);
    let mut cfg = config(dir.path(), "/bin/sh");
    // Without the explicit redirect, sh gives background jobs /dev/null.
    cfg.parser_args = vec!["-c".into(), "sleep 10 0<&0 &".into()];
    cfg.timeout_ms = 300;

    let started = Instant::now();
    let (summary, _) = run(cfg);

    assert!(started.elapsed() < Duration::from_secs(5));
    assert_eq!(
        summary.outcomes[0].reason(),
        Some(&FailureReason::Timeout { after_ms: 300 })
    );
}

#[test]
fn missing_parser_fails_each_fixture() {
    let dir = corpus(&[("a", "\"x\"\n\nx"), ("b", "\"y\"\n\ny")]);
    let (summary, _) = run(config(dir.path(), "/nonexistent/wsframe-parser"));

    assert_eq!(summary.failed, 2);
    assert!(
        summary
            .outcomes
            .iter()
            .all(|o| matches!(o.reason(), Some(FailureReason::Spawn(_))))
    );
}

#[test]
fn temp_files_are_removed() {
    let dir = corpus(&[
        ("pass", "\"a\"\n\na"),
        ("fail", "\"a\"\n\nb"),
        ("again", "\"a\"\n\na"),
    ]);
    let scratch = tempfile::tempdir().unwrap();

    let mut cfg = config(dir.path(), CAT);
    cfg.scratch_dir = Some(scratch.path().to_path_buf());
    let _ = run(cfg.clone());

    cfg.parser = "/bin/sleep".into();
    cfg.parser_args = vec!["5".into()];
    cfg.timeout_ms = 100;
    cfg.filter = Some("pass".into());
    let _ = run(cfg);

    let left: Vec<_> = std::fs::read_dir(scratch.path()).unwrap().collect();
    assert!(left.is_empty(), "leftover temp files: {left:?}");
}

#[test]
fn repeated_runs_are_identical() {
    let dir = corpus(&[
        ("one", "\"a\"\n\"b\"\n\nab"),
        ("two", "\"a\"\n\nline\n"),
    ]);
    let (first, first_text) = run(config(dir.path(), CAT));
    let (second, second_text) = run(config(dir.path(), CAT));

    assert_eq!(first_text, second_text);
    let key = |s: &wsframe::harness::report::RunSummary| {
        s.outcomes
            .iter()
            .map(|o| (o.name.clone(), o.status.clone(), o.diff.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(key(&first), key(&second));
}

#[test]
fn empty_corpus_passes() {
    let dir = corpus(&[]);
    let (summary, text) = run(config(dir.path(), CAT));
    assert!(summary.all_passed());
    assert_eq!(text, "0 passed, 0 failed\n");
}

#[test]
fn stderr_is_captured() {
    let dir = corpus(&[("noisy", "'ignored'\n\n")]);
    let mut cfg = config(dir.path(), "/bin/sh");
    cfg.parser_args = vec!["-c".into(), "cat >/dev/null; echo oops >&2".into()];
    let (summary, _) = run(cfg);

    let outcome = &summary.outcomes[0];
    assert!(outcome.is_passed());
    assert_eq!(outcome.stderr, b"oops\n");
}
