//! Recursive descent JSON parser producing [`DataNode`] trees

use crate::ParseError;
use std::iter::Peekable;
use std::str::Chars;
use strata_core::{format_f64, DataNode, NodeMap};
use tracing::trace;

type ParseResult<T> = std::result::Result<T, ParseError>;

/// Deepest nesting of objects and arrays accepted
pub(super) const MAX_DEPTH: usize = 512;

pub(super) struct Parser<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub(super) fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            column: 1,
            depth: 0,
        }
    }

    /// Parse a whole document; only whitespace may follow the root value
    pub(super) fn parse_document(&mut self) -> ParseResult<DataNode> {
        self.skip_whitespace();
        let root = self.parse_value()?.unwrap_or_else(DataNode::unknown);
        self.skip_whitespace();
        if let Some(c) = self.peek() {
            return Err(self.error(format!("Unexpected '{}' after the root value", c)));
        }
        Ok(root)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        ParseError::new(self.line, self.column, message)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.advance();
        }
    }

    fn expect(&mut self, expected: char) -> ParseResult<()> {
        match self.peek() {
            Some(c) if c == expected => {
                self.advance();
                Ok(())
            }
            Some(c) => Err(self.error(format!("Expected '{}', found '{}'", expected, c))),
            None => Err(self.error(format!("Expected '{}', found end of input", expected))),
        }
    }

    /// Parse any value; `None` stands for `null`
    fn parse_value(&mut self) -> ParseResult<Option<DataNode>> {
        match self.peek() {
            Some('{') => self.parse_nested(Self::parse_object).map(Some),
            Some('[') => self.parse_nested(Self::parse_array).map(Some),
            Some('"') => Ok(Some(DataNode::Primitive(self.parse_string()?))),
            Some(_) => self.parse_literal(),
            None => Err(self.error("Unexpected end of input")),
        }
    }

    fn parse_nested(
        &mut self,
        parse: fn(&mut Self) -> ParseResult<DataNode>,
    ) -> ParseResult<DataNode> {
        if self.depth >= MAX_DEPTH {
            return Err(self.error(format!("Nesting deeper than {} levels", MAX_DEPTH)));
        }
        self.depth += 1;
        let node = parse(self);
        self.depth -= 1;
        node
    }

    fn parse_object(&mut self) -> ParseResult<DataNode> {
        self.expect('{')?;
        let mut map = NodeMap::new();
        self.skip_whitespace();
        if self.peek() == Some('}') {
            self.advance();
            return Ok(DataNode::Object(map));
        }

        loop {
            self.skip_whitespace();
            if self.peek() != Some('"') {
                return Err(self.error("Expected a quoted key"));
            }
            let key = self.parse_string()?;
            self.skip_whitespace();
            self.expect(':')?;
            self.skip_whitespace();
            match self.parse_value()? {
                Some(value) => {
                    map.insert(key, value);
                }
                None => trace!(key = %key, "dropping null member"),
            }
            self.skip_whitespace();
            match self.advance() {
                Some(',') => continue,
                Some('}') => break,
                Some(c) => return Err(self.error(format!("Expected ',' or '}}', found '{}'", c))),
                None => return Err(self.error("Unterminated object")),
            }
        }
        Ok(DataNode::Object(map))
    }

    fn parse_array(&mut self) -> ParseResult<DataNode> {
        self.expect('[')?;
        let mut items = Vec::new();
        self.skip_whitespace();
        if self.peek() == Some(']') {
            self.advance();
            return Ok(DataNode::Collection(items));
        }

        loop {
            self.skip_whitespace();
            match self.parse_value()? {
                Some(value) => items.push(value),
                None => trace!(index = items.len(), "dropping null element"),
            }
            self.skip_whitespace();
            match self.advance() {
                Some(',') => continue,
                Some(']') => break,
                Some(c) => return Err(self.error(format!("Expected ',' or ']', found '{}'", c))),
                None => return Err(self.error("Unterminated array")),
            }
        }
        Ok(DataNode::Collection(items))
    }

    fn parse_string(&mut self) -> ParseResult<String> {
        self.expect('"')?;
        let mut out = String::new();
        loop {
            match self.advance() {
                Some('"') => return Ok(out),
                Some('\\') => {
                    let escaped = match self.advance() {
                        Some('"') => '"',
                        Some('\\') => '\\',
                        Some('/') => '/',
                        Some('b') => '\u{8}',
                        Some('f') => '\u{c}',
                        Some('n') => '\n',
                        Some('r') => '\r',
                        Some('t') => '\t',
                        Some('u') => self.parse_unicode_escape()?,
                        Some(c) => return Err(self.error(format!("Invalid escape '\\{}'", c))),
                        None => return Err(self.error("Unterminated string")),
                    };
                    out.push(escaped);
                }
                Some(c) => out.push(c),
                None => return Err(self.error("Unterminated string")),
            }
        }
    }

    /// Decode the digits after `\u`, joining a UTF-16 surrogate pair
    fn parse_unicode_escape(&mut self) -> ParseResult<char> {
        let high = self.parse_hex4()?;
        let code = if (0xD800..0xDC00).contains(&high) {
            if self.advance() != Some('\\') || self.advance() != Some('u') {
                return Err(self.error("Unpaired surrogate in unicode escape"));
            }
            let low = self.parse_hex4()?;
            if !(0xDC00..0xE000).contains(&low) {
                return Err(self.error("Unpaired surrogate in unicode escape"));
            }
            0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
        } else {
            high
        };
        char::from_u32(code).ok_or_else(|| self.error("Invalid unicode escape"))
    }

    fn parse_hex4(&mut self) -> ParseResult<u32> {
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .advance()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error("Invalid unicode escape"))?;
            code = code * 16 + digit;
        }
        Ok(code)
    }

    /// Parse `true`, `false`, `null` or a number
    fn parse_literal(&mut self) -> ParseResult<Option<DataNode>> {
        let (line, column) = (self.line, self.column);
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() || matches!(c, ',' | ':' | ']' | '}' | '[' | '{' | '"') {
                break;
            }
            word.push(c);
            self.advance();
        }

        if word == "true" || word == "false" {
            return Ok(Some(DataNode::Primitive(word)));
        }
        if word == "null" {
            return Ok(None);
        }
        parse_number(&word)
            .map(|value| Some(DataNode::Primitive(value)))
            .ok_or_else(|| ParseError::new(line, column, format!("Invalid literal '{}'", word)))
    }
}

/// Validate a JSON number and return its canonical form
fn parse_number(word: &str) -> Option<String> {
    let bytes = word.as_bytes();
    let mut i = 0;
    if bytes.first() == Some(&b'-') {
        i += 1;
    }

    let int_start = i;
    while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
    }
    let int_digits = i - int_start;
    if int_digits == 0 || (int_digits > 1 && bytes[int_start] == b'0') {
        return None;
    }

    let mut is_float = false;
    if i < bytes.len() && bytes[i] == b'.' {
        is_float = true;
        i += 1;
        let frac_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == frac_start {
            return None;
        }
    }

    if i < bytes.len() && matches!(bytes[i], b'e' | b'E') {
        is_float = true;
        i += 1;
        if i < bytes.len() && matches!(bytes[i], b'+' | b'-') {
            i += 1;
        }
        let exp_start = i;
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i == exp_start {
            return None;
        }
    }

    if i != bytes.len() {
        return None;
    }

    if !is_float {
        if let Ok(int) = word.parse::<i64>() {
            return Some(int.to_string());
        }
    }
    word.parse::<f64>().ok().map(format_f64)
}
