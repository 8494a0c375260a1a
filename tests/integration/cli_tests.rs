//! `wsframe-harness` as a process: defaults, flags and exit codes.

use std::process::{Command, Output};

use crate::common::{DUMP, HARNESS, corpus};

fn harness(args: &[&str]) -> Output {
    Command::new(HARNESS)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("spawn wsframe-harness")
}

#[test]
fn no_arguments_runs_shipped_corpus() {
    let out = harness(&[]);
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert_eq!(out.status.code(), Some(0), "{stdout}");
    assert!(stdout.ends_with(" passed, 0 failed\n"), "{stdout}");
    assert!(stdout.starts_with('.'));
}

#[test]
fn failing_fixture_exits_one() {
    let dir = corpus(&[
        ("good", "\"\\x81\\x02ok\"\n\ntext \"ok\"\n"),
        ("bad", "\"\\x81\\x02ok\"\n\ntext \"no\"\n"),
    ]);
    let out = harness(&["--corpus", dir.path().to_str().unwrap(), "--parser", DUMP]);
    let stdout = String::from_utf8_lossy(&out.stdout);

    assert_eq!(out.status.code(), Some(1), "{stdout}");
    assert!(stdout.contains("FAIL bad: output mismatch"), "{stdout}");
    assert!(stdout.contains("-text \"no\""), "{stdout}");
    assert!(stdout.contains("+text \"ok\""), "{stdout}");
    assert!(stdout.ends_with("1 passed, 1 failed\n"), "{stdout}");
}

#[test]
fn missing_corpus_exits_two() {
    let out = harness(&["--corpus", "/nonexistent/wsframe-corpus"]);
    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("not found"), "{stderr}");
}

#[test]
fn json_format_and_filter() {
    let out = harness(&["--format", "json", "--filter", "error_"]);
    assert_eq!(out.status.code(), Some(0));

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let outcomes = report["outcomes"].as_array().unwrap();
    assert!(!outcomes.is_empty());
    assert!(
        outcomes
            .iter()
            .all(|o| o["name"].as_str().unwrap().contains("error_") && o["status"] == "passed")
    );
}

#[test]
fn config_file_is_overridden_by_flags() {
    let dir = corpus(&[("only", "\"\\x89\\x00\"\n\nping \"\"\n")]);
    let cfg = tempfile::NamedTempFile::new().unwrap();
    let json = serde_json::json!({
        "corpus_dir": "/nonexistent/from-config",
        "parser": DUMP,
        "timeout_ms": 2000,
    });
    std::fs::write(cfg.path(), json.to_string()).unwrap();

    let bad = harness(&["--config", cfg.path().to_str().unwrap()]);
    assert_eq!(bad.status.code(), Some(2));

    let good = harness(&[
        "--config",
        cfg.path().to_str().unwrap(),
        "--corpus",
        dir.path().to_str().unwrap(),
    ]);
    assert_eq!(good.status.code(), Some(0));
    assert_eq!(good.stdout, b".\n1 passed, 0 failed\n");
}

#[test]
fn invalid_config_exits_two() {
    let cfg = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(cfg.path(), "{ not json").unwrap();
    let out = harness(&["--config", cfg.path().to_str().unwrap()]);
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("invalid config"));
}
