//! Reading a settings file back
//!
//! A small recursive-descent reader for the subset of PHP that settings files
//! use: an optional `<?php` tag, `return`, and one array literal made of
//! strings, numbers, booleans, `null`, `Foo\Bar::class` constants, nested
//! arrays in short (`[...]`) or long (`array(...)`) form and `env('KEY',
//! default)` calls, which read as their default. Comments are skipped.
//!
//! Arrays without explicit keys become lists; arrays with keys become
//! mappings, and `[]` reads as an empty mapping.

use crate::document::SettingsDocument;
use draftsman_core::{DraftsmanError, DraftsmanResult};
use serde_json::{Map, Number, Value};

/// Parse a settings file into a document
///
/// The returned value must be a mapping.
pub fn parse(source: &str) -> DraftsmanResult<SettingsDocument> {
    match parse_value(source)? {
        Value::Object(map) => Ok(SettingsDocument::new(map)),
        other => Err(DraftsmanError::InvalidConfig(format!(
            "settings file must return an array with keys, got {other}"
        ))),
    }
}

/// Parse a settings file into whatever value it returns
pub fn parse_value(source: &str) -> DraftsmanResult<Value> {
    let mut parser = Parser::new(source);
    parser.skip_trivia();
    parser.eat_keyword("<?php");
    parser.skip_trivia();
    if !parser.eat_keyword("return") {
        return Err(parser.error("expected 'return'"));
    }
    let value = parser.value()?;
    parser.skip_trivia();
    parser.expect(';')?;
    parser.skip_trivia();
    parser.eat_keyword("?>");
    parser.skip_trivia();
    if let Some(c) = parser.peek() {
        return Err(parser.error(format!("unexpected '{c}' after return statement")));
    }
    Ok(value)
}

// ============================================================================
// Parser
// ============================================================================

enum Key {
    Implicit,
    Explicit(String),
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl Parser {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn error(&self, message: impl Into<String>) -> DraftsmanError {
        DraftsmanError::parse(self.line, self.column, message)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn looking_at(&self, text: &str) -> bool {
        text.chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i).is_some_and(|p| p.eq_ignore_ascii_case(&c)))
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if !self.looking_at(keyword) {
            return false;
        }
        let len = keyword.chars().count();
        let boundary = keyword.chars().last().is_some_and(|c| !is_ident_char(c))
            || !self.peek_at(len).is_some_and(is_ident_char);
        if boundary {
            for _ in 0..len {
                self.bump();
            }
        }
        boundary
    }

    fn expect(&mut self, expected: char) -> DraftsmanResult<()> {
        match self.peek() {
            Some(c) if c == expected => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(self.error(format!("expected '{expected}', found '{c}'"))),
            None => Err(self.error(format!("expected '{expected}', found end of input"))),
        }
    }

    /// Skip whitespace and comments
    fn skip_trivia(&mut self) {
        loop {
            match (self.peek(), self.peek_at(1)) {
                (Some(c), _) if c.is_whitespace() => {
                    self.bump();
                }
                (Some('/'), Some('/')) | (Some('#'), _) => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.bump();
                    }
                }
                (Some('/'), Some('*')) => {
                    self.bump();
                    self.bump();
                    while self.peek().is_some() && !self.looking_at("*/") {
                        self.bump();
                    }
                    self.bump();
                    self.bump();
                }
                _ => break,
            }
        }
    }

    fn value(&mut self) -> DraftsmanResult<Value> {
        self.skip_trivia();
        match self.peek() {
            None => Err(self.error("unexpected end of input")),
            Some('[') => {
                self.bump();
                self.array(']')
            }
            Some('\'') => Ok(Value::String(self.single_quoted()?)),
            Some('"') => Ok(Value::String(self.double_quoted()?)),
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' || c == '.' => self.number(),
            Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '\\' => self.word(),
            Some(c) => Err(self.error(format!("unexpected '{c}'"))),
        }
    }

    fn array(&mut self, close: char) -> DraftsmanResult<Value> {
        let mut entries: Vec<(Key, Value)> = Vec::new();
        loop {
            self.skip_trivia();
            if self.peek() == Some(close) {
                self.bump();
                break;
            }

            let first = self.value()?;
            self.skip_trivia();
            let entry = if self.looking_at("=>") {
                self.bump();
                self.bump();
                let key = key_string(first).ok_or_else(|| self.error("invalid array key"))?;
                (Key::Explicit(key), self.value()?)
            } else {
                (Key::Implicit, first)
            };
            entries.push(entry);

            self.skip_trivia();
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(c) if c == close => {}
                Some(c) => return Err(self.error(format!("expected ',' or '{close}', found '{c}'"))),
                None => return Err(self.error(format!("unterminated array, expected '{close}'"))),
            }
        }
        Ok(build_array(entries))
    }

    fn single_quoted(&mut self) -> DraftsmanResult<String> {
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some('\'') => return Ok(out),
                Some('\\') => match self.peek() {
                    Some(c @ ('\\' | '\'')) => {
                        self.bump();
                        out.push(c);
                    }
                    _ => out.push('\\'),
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn double_quoted(&mut self) -> DraftsmanResult<String> {
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated string")),
                Some('"') => return Ok(out),
                Some('\\') => {
                    let escaped = match self.peek() {
                        Some('n') => Some('\n'),
                        Some('t') => Some('\t'),
                        Some('r') => Some('\r'),
                        Some('v') => Some('\u{0b}'),
                        Some('e') => Some('\u{1b}'),
                        Some('f') => Some('\u{0c}'),
                        Some('0') => Some('\0'),
                        Some(c @ ('\\' | '"' | '$')) => Some(c),
                        _ => None,
                    };
                    match escaped {
                        Some(c) => {
                            self.bump();
                            out.push(c);
                        }
                        None => out.push('\\'),
                    }
                }
                Some(c) => out.push(c),
            }
        }
    }

    fn number(&mut self) -> DraftsmanResult<Value> {
        let mut text = String::new();
        if let Some(sign @ ('-' | '+')) = self.peek() {
            self.bump();
            if sign == '-' {
                text.push(sign);
            }
        }
        while let Some(c) = self.peek() {
            let exponent_sign =
                (c == '-' || c == '+') && text.ends_with(|p: char| p == 'e' || p == 'E');
            if c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E' || c == '_' || exponent_sign {
                self.bump();
                if c != '_' {
                    text.push(c);
                }
            } else {
                break;
            }
        }

        let is_float = text.contains(['.', 'e', 'E']);
        if !is_float {
            if let Ok(i) = text.parse::<i64>() {
                return Ok(Value::Number(i.into()));
            }
            if let Ok(u) = text.parse::<u64>() {
                return Ok(Value::Number(u.into()));
            }
        }
        text.parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| self.error(format!("invalid number '{text}'")))
    }

    /// Keywords, `array(...)`, `env(...)` and `Name\Space::class`
    fn word(&mut self) -> DraftsmanResult<Value> {
        let mut word = String::new();
        while let Some(c) = self.peek().filter(|&c| is_ident_char(c) || c == '\\') {
            self.bump();
            word.push(c);
        }

        match word.to_ascii_lowercase().as_str() {
            "true" => return Ok(Value::Bool(true)),
            "false" => return Ok(Value::Bool(false)),
            "null" => return Ok(Value::Null),
            _ => {}
        }

        self.skip_trivia();
        if self.looking_at("::class") {
            for _ in 0.."::class".len() {
                self.bump();
            }
            return Ok(Value::String(word.trim_start_matches('\\').to_string()));
        }

        if self.peek() == Some('(') {
            self.bump();
            return match word.to_ascii_lowercase().as_str() {
                "array" => self.array(')'),
                "env" => self.env_call(),
                _ => Err(self.error(format!("unsupported call '{word}(...)'"))),
            };
        }

        Err(self.error(format!("unexpected identifier '{word}'")))
    }

    /// `env('KEY')` or `env('KEY', default)`, read as the default
    fn env_call(&mut self) -> DraftsmanResult<Value> {
        self.value()?;
        self.skip_trivia();
        let default = if self.peek() == Some(',') {
            self.bump();
            self.skip_trivia();
            if self.peek() == Some(')') {
                Value::Null
            } else {
                self.value()?
            }
        } else {
            Value::Null
        };
        self.skip_trivia();
        if self.peek() == Some(',') {
            self.bump();
            self.skip_trivia();
        }
        self.expect(')')?;
        Ok(default)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn key_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(if b { "1" } else { "0" }.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}

fn build_array(entries: Vec<(Key, Value)>) -> Value {
    if entries.is_empty() {
        return Value::Object(Map::new());
    }

    if entries.iter().all(|(k, _)| matches!(k, Key::Implicit)) {
        return Value::Array(entries.into_iter().map(|(_, v)| v).collect());
    }

    let mut map = Map::new();
    let mut next_index: i64 = 0;
    for (key, value) in entries {
        let key = match key {
            Key::Explicit(k) => {
                if let Ok(i) = k.parse::<i64>() {
                    next_index = next_index.max(i + 1);
                }
                k
            }
            Key::Implicit => {
                let k = next_index.to_string();
                next_index += 1;
                k
            }
        };
        map.insert(key, value);
    }
    Value::Object(map)
}

// ============================================================================
// Tests
// ============================================================================
