//! Byte-string literals used for fixture chunk lines.
//!
//! A chunk line is a tiny expression language, parsed here and never
//! executed:
//!
//! ```text
//! "\x81\x05He"                 quoted, with escapes
//! 'llo'                        raw, no escapes
//! x"81 85 37 fa 21 3d"         hex bytes, whitespace ignored
//! "\x82\x7e\x01\x00" + "A" * 256
//! # comment lines produce no write
//! ```
//!
//! Escapes: `\xHH \n \r \t \0 \e \\ \" \'`.

use crate::error::{LiteralError, LiteralErrorKind};

/// Upper bound on one evaluated line (16 MiB).
pub const MAX_LITERAL_LEN: usize = 16 * 1024 * 1024;

/// Evaluate one chunk line.
///
/// Returns `Ok(None)` for comment lines.
pub fn evaluate(line: &str) -> Result<Option<Vec<u8>>, LiteralError> {
    if line.trim_start().starts_with('#') {
        return Ok(None);
    }

    let mut cursor = Cursor { src: line, pos: 0 };
    let bytes = cursor.expr()?;

    cursor.skip_ws();
    if cursor.peek().is_some() {
        return Err(cursor.error(LiteralErrorKind::TrailingInput));
    }
    Ok(Some(bytes))
}

struct Cursor<'a> {
    src: &'a str,
    /// Byte offset into `src`.
    pos: usize,
}

impl Cursor<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn error(&self, kind: LiteralErrorKind) -> LiteralError {
        self.error_at(self.pos, kind)
    }

    fn error_at(&self, pos: usize, kind: LiteralErrorKind) -> LiteralError {
        LiteralError {
            column: self.src[..pos].chars().count() + 1,
            kind,
        }
    }

    // expr := term ('+' term)*
    fn expr(&mut self) -> Result<Vec<u8>, LiteralError> {
        let mut out = self.term()?;
        loop {
            self.skip_ws();
            if self.peek() != Some('+') {
                return Ok(out);
            }
            self.bump();
            let start = self.pos;
            let next = self.term()?;
            if out.len() + next.len() > MAX_LITERAL_LEN {
                return Err(self.error_at(start, LiteralErrorKind::TooLarge));
            }
            out.extend_from_slice(&next);
        }
    }

    // term := atom ('*' count)?
    fn term(&mut self) -> Result<Vec<u8>, LiteralError> {
        self.skip_ws();
        let atom_start = self.pos;
        let atom = self.atom()?;
        if atom.len() > MAX_LITERAL_LEN {
            return Err(self.error_at(atom_start, LiteralErrorKind::TooLarge));
        }

        self.skip_ws();
        if self.peek() != Some('*') {
            return Ok(atom);
        }
        self.bump();
        self.skip_ws();

        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        if start == self.pos {
            return Err(self.error(LiteralErrorKind::ExpectedCount));
        }

        let count: usize = self.src[start..self.pos]
            .parse()
            .map_err(|_| self.error_at(start, LiteralErrorKind::TooLarge))?;
        match atom.len().checked_mul(count) {
            Some(total) if total <= MAX_LITERAL_LEN => Ok(atom.repeat(count)),
            _ => Err(self.error_at(start, LiteralErrorKind::TooLarge)),
        }
    }

    fn atom(&mut self) -> Result<Vec<u8>, LiteralError> {
        self.skip_ws();
        let rest = &self.src[self.pos..];

        if rest.starts_with('"') {
            self.quoted()
        } else if rest.starts_with('\'') {
            self.raw()
        } else if rest.starts_with("x\"") {
            self.hex()
        } else {
            Err(self.error(LiteralErrorKind::ExpectedAtom))
        }
    }

    fn quoted(&mut self) -> Result<Vec<u8>, LiteralError> {
        let open = self.pos;
        self.bump();

        let mut out = Vec::new();
        loop {
            let at = self.pos;
            match self.bump() {
                None => return Err(self.error_at(open, LiteralErrorKind::UnterminatedString)),
                Some('"') => return Ok(out),
                Some('\\') => {
                    let byte = match self.bump() {
                        None => {
                            return Err(self.error_at(open, LiteralErrorKind::UnterminatedString));
                        }
                        Some('x') => self.hex_escape()?,
                        Some('n') => b'\n',
                        Some('r') => b'\r',
                        Some('t') => b'\t',
                        Some('0') => 0,
                        Some('e') => 0x1b,
                        Some('\\') => b'\\',
                        Some('"') => b'"',
                        Some('\'') => b'\'',
                        Some(c) => return Err(self.error_at(at, LiteralErrorKind::InvalidEscape(c))),
                    };
                    out.push(byte);
                }
                Some(c) => {
                    let mut buf = [0u8; 4];
                    out.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                }
            }
        }
    }

    fn hex_escape(&mut self) -> Result<u8, LiteralError> {
        let hi = self.hex_digit()?;
        let lo = self.hex_digit()?;
        Ok((hi << 4) | lo)
    }

    fn hex_digit(&mut self) -> Result<u8, LiteralError> {
        let at = self.pos;
        self.bump()
            .and_then(|c| c.to_digit(16))
            .map(|d| d as u8)
            .ok_or_else(|| self.error_at(at, LiteralErrorKind::InvalidHex))
    }

    fn raw(&mut self) -> Result<Vec<u8>, LiteralError> {
        let open = self.pos;
        self.bump();
        let start = self.pos;
        match self.src[start..].find('\'') {
            Some(len) => {
                self.pos = start + len + 1;
                Ok(self.src[start..start + len].as_bytes().to_vec())
            }
            None => Err(self.error_at(open, LiteralErrorKind::UnterminatedString)),
        }
    }

    fn hex(&mut self) -> Result<Vec<u8>, LiteralError> {
        let open = self.pos;
        self.bump();
        self.bump();

        let mut out = Vec::new();
        let mut pending: Option<u8> = None;
        loop {
            let at = self.pos;
            match self.bump() {
                None => return Err(self.error_at(open, LiteralErrorKind::UnterminatedString)),
                Some('"') => {
                    return match pending {
                        Some(_) => Err(self.error_at(at, LiteralErrorKind::OddHexDigits)),
                        None => Ok(out),
                    };
                }
                Some(c) if c.is_whitespace() => {}
                Some(c) => {
                    let d = c
                        .to_digit(16)
                        .ok_or_else(|| self.error_at(at, LiteralErrorKind::InvalidHex))?
                        as u8;
                    match pending.take() {
                        Some(hi) => out.push((hi << 4) | d),
                        None => pending = Some(d),
                    }
                }
            }
        }
    }
}
