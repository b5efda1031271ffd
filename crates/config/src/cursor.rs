//! Character-stream cursor shared by the notation and condition parsers.
//!
//! Responsibilities:
//! - Provide peek/pop/back scanning primitives over one immutable text buffer.
//! - Classify characters (whitespace, newline, digit, letter, path, quote).
//! - Skip the three comment styles (`#`, `//`, `/* */`).
//! - Build `ParseError`s with 1-based line and column numbers.
//!
//! Does NOT handle:
//! - Any grammar (see `notation` and `condition::parser`).
//!
//! Invariants:
//! - `pos` never exceeds the buffer length; `back()` clamps at zero.
//! - `peek*` never fails; `pop*` fails with "Unexpected end of input" when short.

use crate::error::ParseError;

/// Returns true for spaces and tabs.
pub fn is_space(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Returns true for line-breaking characters.
pub fn is_newline(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{000B}' | '\u{000C}')
}

/// Returns true for spaces, tabs and line breaks.
pub fn is_whitespace(c: char) -> bool {
    is_space(c) || is_newline(c)
}

pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

pub fn is_letter(c: char) -> bool {
    c.is_ascii_alphabetic()
}

/// Characters allowed in a dotted configuration path.
pub fn is_path_character(c: char) -> bool {
    is_letter(c) || is_digit(c) || matches!(c, '.' | '_' | '$' | '-')
}

pub fn is_quote_character(c: char) -> bool {
    c == '"' || c == '\''
}

/// Scanning position over a single document.
#[derive(Debug, Clone)]
pub struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    pub fn new(content: &str) -> Self {
        Self {
            chars: content.chars().collect(),
            pos: 0,
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.chars.len()
    }

    /// Next character without consuming it.
    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    /// Next `n` characters without consuming them; shorter (or empty) at the end.
    pub fn peek_str(&self, n: usize) -> String {
        let end = (self.pos + n).min(self.chars.len());
        self.chars[self.pos..end].iter().collect()
    }

    /// Returns true if the unconsumed text starts with `s`.
    pub fn lookahead(&self, s: &str) -> bool {
        self.peek_str(s.chars().count()) == s
    }

    pub fn pop(&mut self) -> Result<char, ParseError> {
        match self.chars.get(self.pos) {
            Some(&c) => {
                self.pos += 1;
                Ok(c)
            }
            None => Err(self.error("Unexpected end of input.")),
        }
    }

    pub fn pop_n(&mut self, n: usize) -> Result<String, ParseError> {
        if self.pos + n > self.chars.len() {
            return Err(self.error("Unexpected end of input."));
        }
        let text = self.chars[self.pos..self.pos + n].iter().collect();
        self.pos += n;
        Ok(text)
    }

    /// Un-consume `n` characters, stopping at the start.
    pub fn back(&mut self, n: usize) {
        self.pos = self.pos.saturating_sub(n);
    }

    /// Returns true if the most recently consumed character was escaped.
    ///
    /// It is escaped when an odd number of backslashes precede it, so the
    /// quote in `"x\\"` closes the value.
    pub fn last_was_escaped(&self) -> bool {
        let Some(end) = self.pos.checked_sub(1) else {
            return false;
        };
        let backslashes = self.chars[..end]
            .iter()
            .rev()
            .take_while(|c| **c == '\\')
            .count();
        backslashes % 2 == 1
    }

    /// Consume characters while `pred` holds and return them.
    pub fn pop_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    /// Same as `pop_while` but leaves the position untouched.
    pub fn peek_while(&self, pred: impl Fn(char) -> bool) -> String {
        self.chars[self.pos..]
            .iter()
            .take_while(|c| pred(**c))
            .collect()
    }

    pub fn skip_spaces(&mut self) {
        self.pop_while(is_space);
    }

    pub fn skip_whitespace(&mut self) {
        self.pop_while(is_whitespace);
    }

    /// Returns true if a comment starts at the current position.
    pub fn at_comment(&self) -> bool {
        self.lookahead("#") || self.lookahead("//") || self.lookahead("/*")
    }

    /// Consume one comment. Line comments also consume their terminating newline.
    pub fn skip_comment(&mut self) -> Result<(), ParseError> {
        let block = if self.lookahead("/*") {
            true
        } else if self.lookahead("//") || self.lookahead("#") {
            false
        } else {
            return Err(self.error("Expected comment."));
        };

        let opener = if self.lookahead("#") { 1 } else { 2 };
        self.pos += opener;

        while let Some(c) = self.peek() {
            if block && self.lookahead("*/") {
                self.pos += 2;
                return Ok(());
            }
            self.pos += 1;
            if !block && is_newline(c) {
                return Ok(());
            }
        }
        Ok(())
    }

    /// 1-based line and column of `pos`.
    pub fn line_column(&self, pos: usize) -> (usize, usize) {
        let pos = pos.min(self.chars.len());
        let mut line = 1;
        let mut column = 1;
        let mut i = 0;
        while i < pos {
            let c = self.chars[i];
            if c == '\r' && self.chars.get(i + 1) == Some(&'\n') && i + 1 < pos {
                i += 1;
            }
            if is_newline(c) {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
            i += 1;
        }
        (line, column)
    }

    /// Build an error at the current position.
    pub fn error(&self, message: impl Into<String>) -> ParseError {
        self.error_at(message, self.pos)
    }

    pub fn error_at(&self, message: impl Into<String>, pos: usize) -> ParseError {
        let (line, column) = self.line_column(pos);
        ParseError {
            message: message.into(),
            line,
            column,
            origin: None,
        }
    }
}
