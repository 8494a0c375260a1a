//! Expected-vs-actual diffs for failure reports.

use std::borrow::Cow;

use similar::TextDiff;

/// Lines of unchanged context around each hunk.
const CONTEXT_LINES: usize = 3;

/// Line-oriented unified diff of `expected` against `actual`.
///
/// Only hunks are emitted, no `---`/`+++` file header. When either side is
/// not valid UTF-8 both are compared as ASCII-escaped lines instead.
pub fn unified_diff(expected: &[u8], actual: &[u8]) -> String {
    let (old, new) = match (std::str::from_utf8(expected), std::str::from_utf8(actual)) {
        (Ok(old), Ok(new)) => (Cow::Borrowed(old), Cow::Borrowed(new)),
        _ => (escaped_lines(expected), escaped_lines(actual)),
    };

    TextDiff::from_lines(old.as_ref(), new.as_ref())
        .unified_diff()
        .context_radius(CONTEXT_LINES)
        .to_string()
}

fn escaped_lines(bytes: &[u8]) -> Cow<'static, str> {
    let mut out = String::with_capacity(bytes.len());
    for line in bytes.split_inclusive(|b| *b == b'\n') {
        let (body, newline) = match line.strip_suffix(b"\n") {
            Some(body) => (body, true),
            None => (line, false),
        };
        out.push_str(&body.escape_ascii().to_string());
        if newline {
            out.push('\n');
        }
    }
    Cow::Owned(out)
}
