//! AceSerializer deserialization

use super::reader::StrReader;
use super::{REVISION, STREAM_END};
use crate::value::{LuaMapKey, LuaValue, Map};
use crate::{CodecError, Result};

const RECURSION_LIMIT: usize = 128;

pub struct Deserializer<'s> {
    remaining_depth: usize,
    reader: StrReader<'s>,
}

impl<'s> Deserializer<'s> {
    pub fn from_str(input: &'s str) -> Self {
        Self {
            remaining_depth: RECURSION_LIMIT,
            reader: StrReader::new(input),
        }
    }

    /// Returns all root values carried by the stream.
    pub fn deserialize(mut self) -> Result<Vec<LuaValue>> {
        self.read_revision()?;

        let mut result = Vec::new();
        while !self.reader.at_end() {
            if let Some(value) = self.deserialize_helper()? {
                result.push(value);
            }
        }

        Ok(result)
    }

    /// Returns the first root value, if any.
    pub fn deserialize_first(mut self) -> Result<Option<LuaValue>> {
        self.read_revision()?;
        if self.reader.at_end() {
            return Ok(None);
        }
        self.deserialize_helper()
    }

    fn read_revision(&mut self) -> Result<()> {
        match self.reader.read_identifier() {
            Ok(REVISION) => Ok(()),
            _ => Err(CodecError::BadSerializationRevision),
        }
    }

    fn deserialize_helper(&mut self) -> Result<Option<LuaValue>> {
        // Taken from serde_json
        macro_rules! check_recursion {
            ($($body:tt)*) => {
                self.remaining_depth -= 1;
                if self.remaining_depth == 0 {
                    return Err(CodecError::RecursionLimitExceeded);
                }

                $($body)*

                self.remaining_depth += 1;
            }
        }

        Ok(Some(match self.reader.read_identifier()? {
            STREAM_END => return Ok(None),
            "^Z" => LuaValue::Null,
            "^B" => LuaValue::Boolean(true),
            "^b" => LuaValue::Boolean(false),
            "^S" => LuaValue::String(unescape(self.reader.read_until_next()?)?),
            "^N" => LuaValue::Number(
                self.reader
                    .read_until_next()
                    .and_then(deserialize_number)?,
            ),
            "^F" => {
                let mantissa = self.reader.read_until_next().and_then(deserialize_number)?;
                let exponent = match self.reader.read_identifier()? {
                    "^f" => self.reader.read_until_next().and_then(deserialize_number)?,
                    _ => return Err(CodecError::MissingExponent),
                };

                LuaValue::Number(mantissa * 2f64.powf(exponent))
            }
            "^T" => {
                let mut map = Map::default();
                loop {
                    match self.reader.peek_identifier()? {
                        "^t" => {
                            let _ = self.reader.read_identifier();
                            break;
                        }
                        _ => {
                            check_recursion! {
                                let key = self
                                    .deserialize_helper()?
                                    .ok_or(CodecError::UnexpectedTableEnd)
                                    .and_then(LuaMapKey::from_value)?;
                                let value = match self.reader.peek_identifier()? {
                                    "^t" => return Err(CodecError::UnexpectedTableEnd),
                                    _ => self
                                        .deserialize_helper()?
                                        .ok_or(CodecError::UnexpectedTableEnd)?,
                                };
                                map.insert(key, value);
                            }
                        }
                    }
                }
                LuaValue::Map(map)
            }
            other => return Err(CodecError::UnknownControl(other.into())),
        }))
    }
}

/// Undo AceSerializer's `~`-escaping.
fn unescape(data: &str) -> Result<String> {
    let mut result = String::with_capacity(data.len());
    let mut chars = data.chars();

    while let Some(c) = chars.next() {
        if c != '~' {
            result.push(c);
            continue;
        }

        match chars.next().map(u32::from) {
            Some(0x7A) => result.push('\u{1E}'),
            Some(0x7B) => result.push('\u{7F}'),
            Some(0x7C) => result.push('~'),
            Some(0x7D) => result.push('^'),
            Some(v @ 0x40..=0x79) => {
                result.push(char::from_u32(v - 64).ok_or(CodecError::InvalidEscape)?)
            }
            _ => return Err(CodecError::InvalidEscape),
        }
    }

    Ok(result)
}

fn deserialize_number(data: &str) -> Result<f64> {
    match data {
        "1.#INF" | "inf" => Ok(f64::INFINITY),
        "-1.#INF" | "-inf" => Ok(f64::NEG_INFINITY),
        "1.#IND" | "nan" => Ok(f64::NAN),
        "-1.#IND" | "-nan" => Ok(-f64::NAN),
        v => v.parse().map_err(|_| CodecError::BadNumber(v.into())),
    }
}
