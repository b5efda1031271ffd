//! Recursive-descent parser for condition expressions.
//!
//! Grammar:
//!
//! ```text
//! expression := unary (("and" | "or") unary)*
//! unary      := "not" unary | "(" expression ")" | field [operator value]
//! ```
//!
//! Invariants:
//! - `and`/`or` have equal precedence and associate left: `a and b or c`
//!   parses as `Or(And(a, b), c)`.
//! - Keywords are matched case-insensitively against a whole path-character word.
//! - Comments may appear between any two tokens and are discarded.
//! - Blank input (whitespace and comments only) is "no condition", not an error.

use super::registry::{FieldToken, lookup};
use super::{Condition, FieldCondition};
use crate::cursor::{Cursor, is_path_character, is_quote_character, is_whitespace};
use crate::error::{ConditionError, ParseError};
use crate::facts::Facts;

fn is_field_character(c: char) -> bool {
    (is_path_character(c) && c != '$') || c == ':'
}

fn is_operator_character(c: char) -> bool {
    matches!(c, '=' | '<' | '>' | '!' | '~' | '^' | '$')
}

/// Parses condition strings into `Condition` trees.
pub struct ConditionParser<'f> {
    facts: &'f dyn Facts,
}

impl<'f> ConditionParser<'f> {
    /// `facts` resolves special-string fields while parsing.
    pub fn new(facts: &'f dyn Facts) -> Self {
        Self { facts }
    }

    /// Parse one condition string. Returns `None` for blank input.
    pub fn parse(&self, text: &str) -> Result<Option<Condition>, ConditionError> {
        let mut state = ParseState {
            cursor: Cursor::new(text),
            facts: self.facts,
        };

        state.skip_insignificant()?;
        if state.cursor.is_eof() {
            return Ok(None);
        }

        let expression = state.parse_expression()?;
        state.skip_insignificant()?;
        if !state.cursor.is_eof() {
            return Err(state.cursor.error("Unexpected ')'.").into());
        }
        Ok(Some(expression))
    }
}

struct ParseState<'f> {
    cursor: Cursor,
    facts: &'f dyn Facts,
}

impl ParseState<'_> {
    fn skip_insignificant(&mut self) -> Result<(), ParseError> {
        loop {
            self.cursor.skip_whitespace();
            if self.cursor.at_comment() {
                self.cursor.skip_comment()?;
            } else {
                return Ok(());
            }
        }
    }

    fn peek_keyword(&self) -> String {
        self.cursor.peek_while(is_path_character).to_lowercase()
    }

    fn parse_expression(&mut self) -> Result<Condition, ConditionError> {
        let mut expression = self.parse_unary()?;

        loop {
            self.skip_insignificant()?;
            match self.cursor.peek() {
                None | Some(')') => return Ok(expression),
                Some(_) => {}
            }

            let keyword = self.peek_keyword();
            let right = match keyword.as_str() {
                "and" | "or" => {
                    self.cursor.pop_n(keyword.len())?;
                    self.parse_unary()?
                }
                _ => return Err(self.cursor.error("Expected 'and' or 'or'.").into()),
            };

            expression = if keyword == "and" {
                Condition::and(expression, right)
            } else {
                Condition::or(expression, right)
            };
        }
    }

    fn parse_unary(&mut self) -> Result<Condition, ConditionError> {
        self.skip_insignificant()?;

        match self.cursor.peek() {
            None | Some(')') => Err(self.cursor.error("Expected expression.").into()),
            Some('(') => self.parse_group(),
            Some(_) if self.peek_keyword() == "not" => {
                self.cursor.pop_n(3)?;
                Ok(Condition::not(self.parse_unary()?))
            }
            Some(_) => self.parse_field(),
        }
    }

    fn parse_group(&mut self) -> Result<Condition, ConditionError> {
        self.cursor.pop()?;
        let expression = self.parse_expression()?;

        self.skip_insignificant()?;
        if self.cursor.peek() != Some(')') {
            let (line, column) = self.cursor.line_column(self.cursor.pos());
            return Err(ConditionError::UnterminatedGroup { line, column });
        }
        self.cursor.pop()?;

        Ok(Condition::group(expression))
    }

    fn parse_field(&mut self) -> Result<Condition, ConditionError> {
        let start = self.cursor.pos();
        let name = self.cursor.pop_while(is_field_character);
        if name.is_empty() {
            return Err(self.cursor.error("Expected field.").into());
        }

        let field = match lookup(&name, self.facts)? {
            FieldToken::Literal(condition) => return Ok(condition),
            FieldToken::Field(field) => field,
        };

        self.cursor.skip_whitespace();
        let operator = self.cursor.pop_while(is_operator_character);

        let value_start = self.cursor.pos();
        let value = if field.kind().is_operator_valid(&operator) {
            self.parse_value(field.name())?
        } else {
            String::new()
        };

        FieldCondition::new(field, &operator, &value)
            .map(Condition::Field)
            .map_err(|err| match err {
                ConditionError::Parse(e) => self
                    .cursor
                    .error_at(e.message, value_start.max(start))
                    .into(),
                other => other,
            })
    }

    /// A value runs until unquoted whitespace, `)` or a comment.
    fn parse_value(&mut self, field: &str) -> Result<String, ParseError> {
        self.cursor.skip_whitespace();

        let mut text = String::new();
        let mut quoting: Option<char> = None;
        while let Some(next) = self.cursor.peek() {
            match quoting {
                None if is_whitespace(next) || next == ')' || self.cursor.at_comment() => break,
                None if is_quote_character(next) => {
                    self.cursor.pop()?;
                    if !self.cursor.last_was_escaped() {
                        quoting = Some(next);
                    }
                }
                Some(q) if next == q => {
                    self.cursor.pop()?;
                    if !self.cursor.last_was_escaped() {
                        quoting = None;
                    }
                }
                _ => {
                    self.cursor.pop()?;
                }
            }
            text.push(next);
        }

        if quoting.is_some() {
            return Err(self.cursor.error("Unterminated quoted value."));
        }
        if text.is_empty() {
            return Err(self
                .cursor
                .error(format!("Missing value for field '{field}'.")));
        }
        Ok(text)
    }
}
