//! Fixture files and corpus discovery.
//!
//! ```text
//! "\x81\x05He"        ┐
//! "llo"               ┘ chunk lines, one write each
//!                       ← first blank line
//! text "Hello"        ┐ expected output, taken verbatim
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::debug;
use walkdir::WalkDir;

use super::literal;
use crate::error::FixtureError;

/// One evaluated chunk line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 1-based line number in the fixture file.
    pub line: usize,
    pub bytes: Vec<u8>,
}

/// A parsed test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    pub name: String,
    pub chunks: Vec<Chunk>,
    pub expected: Vec<u8>,
}

impl Fixture {
    /// Split `content` at the first blank line and evaluate the chunk lines.
    pub fn parse(name: impl Into<String>, content: &[u8]) -> Result<Self, FixtureError> {
        let (head, expected) = split_sections(content).ok_or(FixtureError::MissingSeparator)?;
        let head = std::str::from_utf8(head).map_err(|_| FixtureError::NonUtf8Chunks)?;

        let mut chunks = Vec::new();
        for (idx, line) in head.lines().enumerate() {
            let line_no = idx + 1;
            let source = line.strip_suffix('\r').unwrap_or(line);
            match literal::evaluate(source) {
                Ok(Some(bytes)) => chunks.push(Chunk {
                    line: line_no,
                    bytes,
                }),
                Ok(None) => {}
                Err(error) => {
                    return Err(FixtureError::Literal {
                        line: line_no,
                        error,
                    });
                }
            }
        }

        Ok(Self {
            name: name.into(),
            chunks,
            expected: expected.to_vec(),
        })
    }

    /// Every chunk concatenated, as the parser sees the stream.
    pub fn input(&self) -> Vec<u8> {
        self.chunks.iter().flat_map(|c| c.bytes.iter().copied()).collect()
    }
}

/// `(chunk section, expected section)`.
///
/// The separator is the first blank line, `\n\n` or `\r\n\r\n`. A file
/// starting with a blank line has an empty chunk section.
fn split_sections(content: &[u8]) -> Option<(&[u8], &[u8])> {
    for prefix in [&b"\n"[..], b"\r\n"] {
        if let Some(rest) = content.strip_prefix(prefix) {
            return Some((&content[..0], rest));
        }
    }
    content
        .iter()
        .enumerate()
        .filter(|&(_, b)| *b == b'\n')
        .find_map(|(at, _)| {
            let after = &content[at + 1..];
            let sep = if after.starts_with(b"\n") {
                1
            } else if after.starts_with(b"\r\n") {
                2
            } else {
                return None;
            };
            Some((&content[..at], &after[sep..]))
        })
}

/// A fixture file found in the corpus.
///
/// Parsing errors are kept per entry; they fail that fixture only.
#[derive(Debug, Clone)]
pub struct CorpusEntry {
    pub name: String,
    pub path: PathBuf,
    pub fixture: Result<Fixture, FixtureError>,
}

/// Load every fixture file directly inside `dir`, sorted by file name.
///
/// A missing directory or an unreadable file is fatal: nothing useful can be
/// compared without them.
pub fn discover(dir: &Path, filter: Option<&str>) -> Result<Vec<CorpusEntry>> {
    if !dir.is_dir() {
        bail!("corpus directory '{}' not found", dir.display());
    }

    let mut entries = Vec::new();
    let walker = WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name();

    for entry in walker {
        let entry =
            entry.with_context(|| format!("failed to read corpus directory '{}'", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        if filter.is_some_and(|f| !name.contains(f)) {
            debug!("skipping '{}' (filter)", name);
            continue;
        }

        let path = entry.into_path();
        let content = std::fs::read(&path)
            .with_context(|| format!("failed to read fixture '{}'", path.display()))?;
        let fixture = Fixture::parse(name.clone(), &content);

        entries.push(CorpusEntry {
            name,
            path,
            fixture,
        });
    }

    Ok(entries)
}
