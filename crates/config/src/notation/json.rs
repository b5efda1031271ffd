//! Inline JSON values inside notation documents.
//!
//! Inline objects and arrays are a relaxed JSON: bareword keys, single-quoted
//! strings, trailing commas and comments are accepted. The collected text is
//! normalized to strict JSON and handed to `serde_json`.

use serde_json::Value;

use crate::cursor::{Cursor, is_path_character, is_whitespace};
use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Context {
    Object,
    Array,
}

impl Context {
    fn closer(self) -> char {
        match self {
            Self::Object => '}',
            Self::Array => ']',
        }
    }
}

/// Read one balanced `{...}` or `[...]` value starting at the cursor.
pub fn parse_inline(cursor: &mut Cursor) -> Result<Value, ParseError> {
    let start = cursor.pos();
    let text = collect(cursor, start)?;
    serde_json::from_str(&text)
        .map_err(|e| cursor.error_at(format!("JSON parsing error: {e}."), start))
}

fn collect(cursor: &mut Cursor, start: usize) -> Result<String, ParseError> {
    let mut out = String::new();
    let mut stack: Vec<Context> = Vec::new();
    let mut expecting_key = false;

    loop {
        let Some(next) = cursor.peek() else {
            return Err(cursor.error_at("Unterminated inline JSON.", start));
        };

        if cursor.at_comment() {
            cursor.skip_comment()?;
            out.push(' ');
            continue;
        }

        match next {
            '{' | '[' => {
                cursor.pop()?;
                let context = if next == '{' {
                    Context::Object
                } else {
                    Context::Array
                };
                stack.push(context);
                expecting_key = context == Context::Object;
                out.push(next);
            }
            '}' | ']' => {
                let Some(context) = stack.pop().filter(|c| c.closer() == next) else {
                    return Err(cursor.error(format!("Unexpected '{next}' in inline JSON.")));
                };
                cursor.pop()?;
                drop_trailing_comma(&mut out);
                out.push(context.closer());
                if stack.is_empty() {
                    return Ok(out);
                }
                expecting_key = false;
            }
            ',' => {
                cursor.pop()?;
                out.push(',');
                expecting_key = stack.last() == Some(&Context::Object);
            }
            '"' | '\'' => {
                out.push_str(&read_string(cursor)?);
                expecting_key = false;
            }
            c if is_whitespace(c) => {
                cursor.pop()?;
                out.push(c);
            }
            c if expecting_key && is_path_character(c) => {
                let key = cursor.pop_while(is_path_character);
                out.push('"');
                out.push_str(&key);
                out.push('"');
                expecting_key = false;
            }
            c => {
                cursor.pop()?;
                out.push(c);
            }
        }
    }
}

fn drop_trailing_comma(out: &mut String) {
    let trimmed = out.trim_end_matches(|c: char| c.is_whitespace()).len();
    if out[..trimmed].ends_with(',') {
        out.truncate(trimmed - 1);
    }
}

/// Read a quoted string and return it as a double-quoted JSON string literal.
fn read_string(cursor: &mut Cursor) -> Result<String, ParseError> {
    let start = cursor.pos();
    let quote = cursor.pop()?;
    let mut out = String::from('"');

    loop {
        let Some(c) = cursor.peek() else {
            return Err(cursor.error_at("Unterminated string in inline JSON.", start));
        };
        cursor.pop()?;
        match c {
            '\\' => {
                let escaped = cursor
                    .pop()
                    .map_err(|_| cursor.error_at("Unterminated string in inline JSON.", start))?;
                if escaped == '\'' {
                    out.push('\'');
                } else {
                    out.push('\\');
                    out.push(escaped);
                }
            }
            c if c == quote => {
                out.push('"');
                return Ok(out);
            }
            '"' => out.push_str("\\\""),
            c => out.push(c),
        }
    }
}
