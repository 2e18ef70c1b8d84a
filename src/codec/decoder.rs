use std::collections::BTreeMap;

use super::CodecError;
use crate::value::{SessionData, Value};

/// Decode persisted session bytes back into session data.
///
/// The empty string decodes to the empty map. Any mismatch between a
/// declared length and the remaining bytes fails with
/// [`CodecError::Corrupt`]; no partial result is ever returned.
pub fn decode(input: &str) -> Result<SessionData, CodecError> {
    if input.is_empty() {
        return Ok(SessionData::new());
    }

    let mut parser = Parser {
        bytes: input.as_bytes(),
        pos: 0,
    };

    let mut data = SessionData::new();
    while !parser.at_end() {
        let key = parser.read_key()?;
        let value = parser.read_value()?;
        data.insert(key, value);
    }

    Ok(data)
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn corrupt(&self, reason: impl Into<String>) -> CodecError {
        CodecError::Corrupt {
            offset: self.pos,
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn expect(&mut self, token: &str) -> Result<(), CodecError> {
        let end = self.pos + token.len();
        if self.bytes.len() < end || &self.bytes[self.pos..end] != token.as_bytes() {
            return Err(self.corrupt(format!("expected {token:?}")));
        }
        self.pos = end;
        Ok(())
    }

    /// A top-level key: a bare word terminated by `|`.
    fn read_key(&mut self) -> Result<String, CodecError> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_alphanumeric() || b == b'_' {
                self.pos += 1;
            } else {
                break;
            }
        }

        if self.pos == start {
            return Err(self.corrupt("expected a session key"));
        }

        // Keys are ASCII words, so the slice is valid UTF-8.
        let key = String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned();
        self.expect("|")?;
        Ok(key)
    }

    fn read_value(&mut self) -> Result<Value, CodecError> {
        match self.peek() {
            Some(b'N') => {
                self.expect("N;")?;
                Ok(Value::Null)
            }
            Some(b'b') => self.read_bool(),
            Some(b'i') => self.read_int().map(Value::Int),
            Some(b's') => self.read_str().map(Value::Str),
            Some(b'a') => self.read_array(),
            Some(b'm') => self.read_map(),
            Some(other) => Err(self.corrupt(format!("unknown type tag {:?}", other as char))),
            None => Err(self.corrupt("unexpected end of input")),
        }
    }

    fn read_bool(&mut self) -> Result<Value, CodecError> {
        self.expect("b:")?;
        let value = match self.peek() {
            Some(b'0') => false,
            Some(b'1') => true,
            _ => return Err(self.corrupt("boolean must be 0 or 1")),
        };
        self.pos += 1;
        self.expect(";")?;
        Ok(Value::Bool(value))
    }

    fn read_int(&mut self) -> Result<i64, CodecError> {
        self.expect("i:")?;
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
            self.pos += 1;
        }

        let digits = &self.bytes[start..self.pos];
        let text = std::str::from_utf8(digits).expect("digits are ASCII");
        let value = text
            .parse::<i64>()
            .map_err(|_| self.corrupt(format!("invalid integer {text:?}")))?;

        self.expect(";")?;
        Ok(value)
    }

    fn read_str(&mut self) -> Result<String, CodecError> {
        self.expect("s:")?;
        let len = self.read_length()?;
        self.expect(":\"")?;

        let end = self.pos + len;
        if end > self.bytes.len() {
            return Err(self.corrupt(format!(
                "string length {len} exceeds remaining input"
            )));
        }

        let content = std::str::from_utf8(&self.bytes[self.pos..end])
            .map_err(|_| self.corrupt("string length splits a UTF-8 character"))?
            .to_string();
        self.pos = end;

        self.expect("\";")?;
        Ok(content)
    }

    fn read_array(&mut self) -> Result<Value, CodecError> {
        self.expect("a:")?;
        let count = self.read_length()?;
        self.expect(":{")?;

        let mut entries = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            let entry_key = match self.peek() {
                Some(b'i') => ArrayKey::Index(self.read_int()?),
                Some(b's') => ArrayKey::Name(self.read_str()?),
                _ => return Err(self.corrupt("array key must be an integer or a string")),
            };
            let value = self.read_value()?;
            entries.push((entry_key, value));
        }

        self.expect("}")?;
        Ok(assemble_array(entries))
    }

    fn read_map(&mut self) -> Result<Value, CodecError> {
        self.expect("m:")?;
        let count = self.read_length()?;
        self.expect(":{")?;

        let mut map = BTreeMap::new();
        for _ in 0..count {
            let key = match self.peek() {
                Some(b's') => self.read_str()?,
                Some(b'i') => self.read_int()?.to_string(),
                _ => return Err(self.corrupt("map key must be a string or an integer")),
            };
            let value = self.read_value()?;
            map.insert(key, value);
        }

        self.expect("}")?;
        Ok(Value::Map(map))
    }

    fn read_length(&mut self) -> Result<usize, CodecError> {
        let start = self.pos;
        while matches!(self.peek(), Some(b) if b.is_ascii_digit()) {
            self.pos += 1;
        }

        if self.pos == start {
            return Err(self.corrupt("expected a length"));
        }

        let text = std::str::from_utf8(&self.bytes[start..self.pos]).expect("digits are ASCII");
        text.parse::<usize>()
            .map_err(|_| self.corrupt(format!("invalid length {text:?}")))
    }
}

enum ArrayKey {
    Index(i64),
    Name(String),
}

/// Dense integer keys starting at zero mean a list; anything else becomes a
/// string-keyed map. The encoder only ever writes dense lists under `a:`
/// (maps carry their own `m:` tag), but string or sparse keys in an `a:`
/// body are tolerated rather than rejected.
fn assemble_array(entries: Vec<(ArrayKey, Value)>) -> Value {
    let is_list = entries
        .iter()
        .enumerate()
        .all(|(i, (key, _))| matches!(key, ArrayKey::Index(n) if *n == i as i64));

    if is_list {
        Value::List(entries.into_iter().map(|(_, v)| v).collect())
    } else {
        let mut map = BTreeMap::new();
        for (key, value) in entries {
            let name = match key {
                ArrayKey::Index(n) => n.to_string(),
                ArrayKey::Name(s) => s,
            };
            map.insert(name, value);
        }
        Value::Map(map)
    }
}
