//! The generic text form of structures.
//!
//! Structures can be written as `(Name=Value,Other=(Nested=1),List=(1,2,3))`.
//! The text is turned into a JSON value and read like any other document:
//! keyed groups become objects, unkeyed groups become arrays, and bare tokens
//! become booleans, numbers or strings.

use core::fmt::{self, Display};

use serde_json::{Map, Number, Value};

/// Why a text form was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextImportError {
    /// Byte offset of the problem.
    pub offset: usize,
    /// What was wrong.
    pub message: &'static str,
}

impl Display for TextImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at offset {}", self.message, self.offset)
    }
}

impl core::error::Error for TextImportError {}

/// Deepest group nesting [`parse`] accepts.
pub const MAX_NESTING: usize = 128;

/// Parses a complete text form.
pub fn parse(text: &str) -> Result<Value, TextImportError> {
    parse_nested(text, MAX_NESTING)
}

/// Parses a complete text form holding at most `max_nesting` levels of
/// groups.
pub fn parse_nested(text: &str, max_nesting: usize) -> Result<Value, TextImportError> {
    let mut cursor = Cursor {
        text,
        at: 0,
        depth: 0,
        max_nesting,
    };
    let value = cursor.value()?;
    cursor.skip_whitespace();
    if cursor.at != text.len() {
        return Err(cursor.error("unexpected trailing text"));
    }
    Ok(value)
}

struct Cursor<'a> {
    text: &'a str,
    at: usize,
    depth: usize,
    max_nesting: usize,
}

impl Cursor<'_> {
    fn error(&self, message: &'static str) -> TextImportError {
        TextImportError {
            offset: self.at,
            message,
        }
    }

    fn peek(&self) -> Option<char> {
        self.text[self.at..].chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.at += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.bump();
        }
    }

    fn value(&mut self) -> Result<Value, TextImportError> {
        self.skip_whitespace();
        match self.peek() {
            Some('(') => self.group(),
            Some('"') => self.quoted().map(Value::String),
            Some(_) => self.bare(),
            None => Err(self.error("expected a value")),
        }
    }

    fn group(&mut self) -> Result<Value, TextImportError> {
        if self.depth >= self.max_nesting {
            return Err(self.error("nesting too deep"));
        }
        self.depth += 1;
        let group = self.entries();
        self.depth -= 1;
        group
    }

    fn entries(&mut self) -> Result<Value, TextImportError> {
        self.bump();
        let mut keyed = Map::new();
        let mut unkeyed = Vec::new();

        self.skip_whitespace();
        if self.peek() == Some(')') {
            self.bump();
            return Ok(Value::Object(keyed));
        }

        loop {
            self.skip_whitespace();
            match self.key() {
                Some(key) => {
                    if !unkeyed.is_empty() {
                        return Err(self.error("cannot mix named and positional entries"));
                    }
                    let value = self.value()?;
                    keyed.insert(key, value);
                }
                None => {
                    if !keyed.is_empty() {
                        return Err(self.error("cannot mix named and positional entries"));
                    }
                    unkeyed.push(self.value()?);
                }
            }

            self.skip_whitespace();
            match self.bump() {
                Some(',') => continue,
                Some(')') => break,
                _ => return Err(self.error("expected `,` or `)`")),
            }
        }

        if keyed.is_empty() {
            Ok(Value::Array(unkeyed))
        } else {
            Ok(Value::Object(keyed))
        }
    }

    /// Consumes `Name=` if present.
    fn key(&mut self) -> Option<String> {
        let start = self.at;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '_')
        {
            self.bump();
        }
        let name = &self.text[start..self.at];
        self.skip_whitespace();
        if !name.is_empty() && self.peek() == Some('=') {
            self.bump();
            return Some(name.to_string());
        }
        self.at = start;
        None
    }

    fn quoted(&mut self) -> Result<String, TextImportError> {
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some(other) => out.push(other),
                    None => return Err(self.error("unterminated escape")),
                },
                Some(c) => out.push(c),
                None => return Err(self.error("unterminated string")),
            }
        }
    }

    fn bare(&mut self) -> Result<Value, TextImportError> {
        let start = self.at;
        while self.peek().is_some_and(|c| c != ',' && c != ')') {
            self.bump();
        }
        let token = self.text[start..self.at].trim();
        if token.is_empty() {
            return Err(TextImportError {
                offset: start,
                message: "expected a value",
            });
        }
        Ok(scalar(token))
    }
}

fn scalar(token: &str) -> Value {
    if token.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if token.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Ok(integer) = token.parse::<i64>() {
        return Value::from(integer);
    }
    if let Some(number) = token.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(number);
    }
    Value::String(token.to_string())
}
