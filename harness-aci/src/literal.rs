//! Parsing of source-language literals back into values.
//!
//! This is the inverse of [`Value::to_literal`]: calldata requests carry
//! arguments as literals, and a compiler has to read them back.

use crate::error::{AciError, AciResult};
use crate::value::Value;
use harness_primitives::{AccountAddress, ContractAddress};
use num_bigint::BigInt;

impl Value {
    /// Parses one literal such as `Some(ak_...)`, `[1, 2]` or
    /// `{[1] = "a"}`.
    ///
    /// Parsing is untyped; check the result with [`Value::conforms_to`].
    ///
    /// # Errors
    ///
    /// Returns `AciError::InvalidLiteral` with the offset of the problem.
    pub fn parse_literal(input: &str) -> AciResult<Self> {
        let mut parser = LiteralParser { input, pos: 0 };
        let value = parser.value()?;
        parser.skip_ws();
        if parser.pos < input.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(value)
    }
}

struct LiteralParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> LiteralParser<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn skip_ws(&mut self) {
        let trimmed = self.rest().trim_start();
        self.pos = self.input.len() - trimmed.len();
    }

    fn eat(&mut self, c: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> AciResult<()> {
        if self.eat(c) {
            Ok(())
        } else {
            Err(self.error(&format!("expected '{c}'")))
        }
    }

    fn error(&self, message: &str) -> AciError {
        AciError::InvalidLiteral {
            input: self.input.to_string(),
            message: format!("{message} at offset {}", self.pos),
        }
    }

    fn take_while<F: Fn(char) -> bool>(&mut self, pred: F) -> &'a str {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|(_, c)| !pred(*c))
            .map_or(rest.len(), |(i, _)| i);
        self.pos += len;
        &rest[..len]
    }

    /// Comma-separated values up to `close`.
    fn sequence(&mut self, close: char) -> AciResult<Vec<Value>> {
        let mut items = Vec::new();
        if self.eat(close) {
            return Ok(items);
        }
        loop {
            items.push(self.value()?);
            if self.eat(close) {
                return Ok(items);
            }
            self.expect(',')?;
        }
    }

    fn value(&mut self) -> AciResult<Value> {
        self.skip_ws();
        match self.peek() {
            Some('"') => self.string().map(Value::String),
            Some('#') => {
                self.pos += 1;
                let digits = self.take_while(|c| c.is_ascii_hexdigit());
                hex::decode(digits)
                    .map(Value::Bytes)
                    .map_err(|e| self.error(&e.to_string()))
            }
            Some('[') => {
                self.pos += 1;
                self.sequence(']').map(Value::List)
            }
            Some('(') => {
                self.pos += 1;
                let mut items = self.sequence(')')?;
                Ok(match items.len() {
                    0 => Value::Unit,
                    1 => items.remove(0),
                    _ => Value::Tuple(items),
                })
            }
            Some('{') => {
                self.pos += 1;
                self.braced()
            }
            Some(c) if c == '-' || c.is_ascii_digit() => self.integer(),
            Some(c) if c.is_ascii_alphabetic() => self.word(),
            _ => Err(self.error("expected a literal")),
        }
    }

    fn integer(&mut self) -> AciResult<Value> {
        let negative = self.eat('-');
        let digits: String = self
            .take_while(|c| c.is_ascii_digit() || c == '_')
            .chars()
            .filter(|c| *c != '_')
            .collect();
        let magnitude = digits
            .parse::<BigInt>()
            .map_err(|_| self.error("expected digits"))?;
        Ok(Value::Int(if negative { -magnitude } else { magnitude }))
    }

    fn word(&mut self) -> AciResult<Value> {
        let start = self.pos;
        let word = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_');
        match word {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            "None" => Ok(Value::none()),
            "Some" => {
                self.expect('(')?;
                let inner = self.value()?;
                self.expect(')')?;
                Ok(Value::some(inner))
            }
            w if w.starts_with("ak_") => w.parse::<AccountAddress>().map(Value::Address).map_err(|e| {
                self.pos = start;
                self.error(&e.to_string())
            }),
            w if w.starts_with("ct_") => w.parse::<ContractAddress>().map(Value::Contract).map_err(|e| {
                self.pos = start;
                self.error(&e.to_string())
            }),
            _ => {
                self.pos = start;
                Err(self.error(&format!("unknown literal '{word}'")))
            }
        }
    }

    /// `{}` (empty map), `{[k] = v, ...}` (map) or `{f = v, ...}` (record).
    fn braced(&mut self) -> AciResult<Value> {
        if self.eat('}') {
            return Ok(Value::Map(Vec::new()));
        }
        self.skip_ws();
        if self.peek() == Some('[') {
            let mut pairs = Vec::new();
            loop {
                self.expect('[')?;
                let key = self.value()?;
                self.expect(']')?;
                self.expect('=')?;
                pairs.push((key, self.value()?));
                if self.eat('}') {
                    return Ok(Value::Map(pairs));
                }
                self.expect(',')?;
            }
        }
        let mut fields = Vec::new();
        loop {
            self.skip_ws();
            let name = self.take_while(|c| c.is_ascii_alphanumeric() || c == '_' || c == '\'');
            if name.is_empty() {
                return Err(self.error("expected field name"));
            }
            self.expect('=')?;
            fields.push((name.to_string(), self.value()?));
            if self.eat('}') {
                return Ok(Value::Record(fields));
            }
            self.expect(',')?;
        }
    }

    fn string(&mut self) -> AciResult<String> {
        self.pos += 1;
        let mut out = String::new();
        let mut chars = self.rest().char_indices();
        while let Some((i, c)) = chars.next() {
            match c {
                '"' => {
                    self.pos += i + 1;
                    return Ok(out);
                }
                '\\' => match chars.next() {
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, 't')) => out.push('\t'),
                    Some((_, 'r')) => out.push('\r'),
                    Some((_, other)) => out.push(other),
                    None => break,
                },
                other => out.push(other),
            }
        }
        Err(self.error("unterminated string"))
    }
}
