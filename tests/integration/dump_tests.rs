//! The `wsframe-dump` binary over real pipes.

use std::io::Write;
use std::process::{Command, Output, Stdio};

use crate::common::DUMP;

fn dump(args: &[&str], writes: &[&[u8]]) -> Output {
    let mut child = Command::new(DUMP)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn wsframe-dump");

    let mut stdin = child.stdin.take().expect("stdin");
    for chunk in writes {
        stdin.write_all(chunk).expect("write chunk");
        stdin.flush().expect("flush");
    }
    drop(stdin);
    child.wait_with_output().expect("wait")
}

#[test]
fn clean_stream_exits_zero() {
    let out = dump(&[], &[b"\x81\x05He", b"llo", b"\x88\x02\x03\xe8"]);
    assert_eq!(out.status.code(), Some(0));
    assert_eq!(out.stdout, b"text \"Hello\"\nclose 1000\n");
}

#[test]
fn protocol_error_exits_one_and_drains_input() {
    let tail = vec![0x81; 256 * 1024];
    let out = dump(&[], &[b"\x81\x01a\xc1", &tail]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(out.stdout, b"text \"a\"\nerror reserved_bits_set\n");
}

#[test]
fn truncated_stream_exits_one() {
    let out = dump(&[], &[b"\x82\x7e\x01"]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(out.stdout, b"truncated\n");
}

#[test]
fn max_message_flag() {
    let out = dump(&["--max-message", "3"], &[b"\x81\x02ab\x81\x04abcd"]);
    assert_eq!(out.status.code(), Some(1));
    assert_eq!(out.stdout, b"text \"ab\"\nerror message_too_large\n");
}

#[test]
fn tiny_reads_give_same_transcript() {
    let input: &[u8] = b"\x01\x03Hel\x89\x82\x00\x00\x00\x00hi\x80\x02lo";
    let whole = dump(&[], &[input]);
    let tiny = dump(&["--read-size", "1"], &[input]);
    assert_eq!(whole.stdout, b"ping \"hi\"\ntext \"Hello\"\n");
    assert_eq!(tiny.stdout, whole.stdout);
}

#[test]
fn zero_read_size_is_rejected() {
    let out = dump(&["--read-size", "0"], &[]);
    assert!(!out.status.success());
    assert!(out.stdout.is_empty());
}
