//! Parser for the configuration notation.
//!
//! Responsibilities:
//! - Split a document into condition-tagged fragments at `[conditions]` headers.
//! - Parse `key: value` / `key = value` lines into nested mappings.
//! - Accept inline relaxed JSON as values and as root-level `{...}` blocks.
//!
//! Does NOT handle:
//! - Merging fragments or resolving `${...}` references (see `scope` and `resolver`).
//!
//! Invariants:
//! - Fragments are emitted in document order; empty fragments are never emitted.
//! - A malformed document yields an error and no fragments.
//! - A document that is only a JSON array is rejected as invalid content.
//! - Dotted keys deep-set; later keys in the same fragment overwrite earlier ones.

mod json;
mod value;

use serde_json::{Map, Value};
use tracing::trace;

pub use value::coerce_scalar;

use crate::condition::ConditionParser;
use crate::cursor::{
    Cursor, is_newline, is_path_character, is_quote_character, is_space, is_whitespace,
};
use crate::error::{ConfigError, ParseError, Result};
use crate::facts::Facts;
use crate::source::ConfigSource;
use crate::tree::set_path;

/// Parses notation text into `ConfigSource` fragments.
pub struct NotationParser<'f> {
    facts: &'f dyn Facts,
}

impl<'f> NotationParser<'f> {
    pub fn new(facts: &'f dyn Facts) -> Self {
        Self { facts }
    }

    /// Parse `content`, tagging errors and fragments with `origin`.
    ///
    /// `default_conditions` applies to the fragment before the first section
    /// header and to every empty `[]` header.
    pub fn parse(
        &self,
        origin: &str,
        content: &str,
        default_conditions: &str,
    ) -> Result<Vec<ConfigSource>> {
        let mut document = Document::new(content);
        if document.is_array_root() {
            return Err(ConfigError::InvalidConfigurationContent(format!(
                "{origin}: JSON array root is not a configuration mapping"
            )));
        }
        let sections = document
            .parse(default_conditions)
            .map_err(|e| ConfigError::Parse(e.with_origin(origin)))?;

        let conditions = ConditionParser::new(self.facts);
        let mut sources = Vec::with_capacity(sections.len());
        for section in sections {
            let parsed = conditions
                .parse(&section.conditions)
                .map_err(|source| ConfigError::Condition {
                    origin: origin.to_string(),
                    source,
                })?;
            trace!(
                origin,
                conditions = %section.conditions,
                keys = section.content.len(),
                "Parsed configuration fragment"
            );
            sources.push(ConfigSource::new(origin, section.content, parsed));
        }
        Ok(sources)
    }
}

type ParseResult<T> = std::result::Result<T, ParseError>;

/// A fragment before its condition text is parsed.
#[derive(Debug)]
struct Section {
    conditions: String,
    content: Map<String, Value>,
}

struct Document {
    cursor: Cursor,
}

impl Document {
    fn new(content: &str) -> Self {
        Self {
            cursor: Cursor::new(content),
        }
    }

    /// True when the whole document is a single JSON array, which would
    /// otherwise read as a section header. The cursor is left untouched.
    fn is_array_root(&mut self) -> bool {
        let start = self.cursor.pos();
        let array = self.skip_insignificant().is_ok()
            && self.cursor.peek() == Some('[')
            && matches!(json::parse_inline(&mut self.cursor), Ok(Value::Array(_)))
            && self.skip_insignificant().is_ok()
            && self.cursor.is_eof();
        self.cursor.back(self.cursor.pos() - start);
        array
    }

    fn skip_insignificant(&mut self) -> ParseResult<()> {
        loop {
            self.cursor.skip_whitespace();
            if !self.cursor.at_comment() {
                return Ok(());
            }
            self.cursor.skip_comment()?;
        }
    }

    fn parse(mut self, default_conditions: &str) -> ParseResult<Vec<Section>> {
        let mut sections = Vec::new();
        let mut conditions = default_conditions.to_string();
        let mut content = Map::new();

        while let Some(next) = self.cursor.peek() {
            if is_whitespace(next) {
                self.cursor.skip_whitespace();
            } else if self.cursor.at_comment() {
                self.cursor.skip_comment()?;
            } else if next == '{' {
                self.parse_root_object(&mut content)?;
            } else if next == '[' {
                let header = self.parse_section_header()?;
                if !content.is_empty() {
                    sections.push(Section {
                        conditions,
                        content: std::mem::take(&mut content),
                    });
                }
                conditions = if header.is_empty() {
                    default_conditions.to_string()
                } else {
                    header
                };
            } else if is_path_character(next) {
                self.parse_entry(&mut content)?;
            } else {
                return Err(self.cursor.error(format!("Unexpected character '{next}'.")));
            }
        }

        if !content.is_empty() {
            sections.push(Section {
                conditions,
                content,
            });
        }
        Ok(sections)
    }

    /// A root-level `{...}` block, shallow-merged into the current fragment.
    fn parse_root_object(&mut self, content: &mut Map<String, Value>) -> ParseResult<()> {
        if let Value::Object(object) = json::parse_inline(&mut self.cursor)? {
            content.extend(object);
        }
        Ok(())
    }

    /// Text between `[` and the matching unquoted `]`, with comments removed and trimmed.
    fn parse_section_header(&mut self) -> ParseResult<String> {
        let start = self.cursor.pos();
        self.cursor.pop()?;
        let mut text = String::new();
        let mut quote: Option<char> = None;

        loop {
            let Some(next) = self.cursor.peek() else {
                return Err(self
                    .cursor
                    .error_at("Unterminated condition section, expected ']'.", start));
            };

            match quote {
                Some(open) => {
                    self.cursor.pop()?;
                    text.push(next);
                    if next == open && !self.cursor.last_was_escaped() {
                        quote = None;
                    }
                }
                None if next == ']' => {
                    self.cursor.pop()?;
                    return Ok(text.trim().to_string());
                }
                None if self.cursor.at_comment() => {
                    self.cursor.skip_comment()?;
                    text.push(' ');
                }
                None => {
                    self.cursor.pop()?;
                    if is_quote_character(next) && !self.cursor.last_was_escaped() {
                        quote = Some(next);
                    }
                    text.push(next);
                }
            }
        }
    }

    fn parse_entry(&mut self, content: &mut Map<String, Value>) -> ParseResult<()> {
        let key = self.parse_key()?;
        self.cursor.skip_spaces();

        let value = match self.cursor.peek() {
            Some('{' | '[') => {
                let value = json::parse_inline(&mut self.cursor)?;
                self.finish_inline_value()?;
                value
            }
            _ => self.parse_scalar()?,
        };

        set_path(content, &key, value);
        Ok(())
    }

    /// A dotted key followed by optional spaces and `:` or `=`.
    fn parse_key(&mut self) -> ParseResult<String> {
        let start = self.cursor.pos();
        let key = self.cursor.pop_while(is_path_character);
        self.cursor.skip_spaces();

        match self.cursor.peek() {
            Some(':' | '=') => {
                self.cursor.pop()?;
            }
            Some(c) if !is_newline(c) => {
                return Err(self
                    .cursor
                    .error(format!("Invalid character '{c}' in key '{key}'.")));
            }
            _ => {
                return Err(self
                    .cursor
                    .error(format!("Expected ':' or '=' after key '{key}'.")));
            }
        }

        if key.split('.').any(str::is_empty) {
            return Err(self.cursor.error_at(format!("Invalid key '{key}'."), start));
        }
        Ok(key)
    }

    /// After an inline JSON value only a comma, spaces or a comment may follow on the line.
    fn finish_inline_value(&mut self) -> ParseResult<()> {
        self.cursor.skip_spaces();
        if self.cursor.peek() == Some(',') {
            self.cursor.pop()?;
            self.cursor.skip_spaces();
        }
        match self.cursor.peek() {
            None => Ok(()),
            Some(c) if is_newline(c) => Ok(()),
            Some(_) if self.cursor.at_comment() => self.cursor.skip_comment(),
            Some(c) => Err(self
                .cursor
                .error(format!("Unexpected character '{c}' after value."))),
        }
    }

    /// A scalar running to the end of the line or an unquoted comment.
    ///
    /// A comment marker only counts at the start of the value, after
    /// whitespace or after a closing quote, so `http://host` stays a value.
    fn parse_scalar(&mut self) -> ParseResult<Value> {
        let mut raw = String::new();
        let mut quote: Option<char> = None;
        let mut closed_quote = false;

        while let Some(next) = self.cursor.peek() {
            if let Some(open) = quote {
                if is_newline(next) {
                    return Err(self.cursor.error("Unterminated quoted value."));
                }
                self.cursor.pop()?;
                raw.push(next);
                if next == open && !self.cursor.last_was_escaped() {
                    quote = None;
                    closed_quote = true;
                }
                continue;
            }

            if is_newline(next) {
                self.cursor.pop()?;
                break;
            }

            let after_space = closed_quote || raw.chars().last().is_none_or(is_space);
            if after_space && self.cursor.at_comment() {
                let block = self.cursor.lookahead("/*");
                self.cursor.skip_comment()?;
                if block {
                    continue;
                }
                break;
            }

            if closed_quote {
                if next == ',' || is_space(next) {
                    self.cursor.pop()?;
                    continue;
                }
                return Err(self.cursor.error("Invalid characters after quote."));
            }

            self.cursor.pop()?;
            if raw.trim().is_empty() && is_quote_character(next) {
                raw.clear();
                quote = Some(next);
            }
            raw.push(next);
        }

        if quote.is_some() {
            return Err(self.cursor.error("Unterminated quoted value."));
        }

        let raw = raw.trim();
        let raw = raw.strip_suffix(',').unwrap_or(raw);
        Ok(coerce_scalar(raw))
    }
}
