//! Binary format deserialization

use super::*;
use crate::value::{LuaMapKey, LuaValue, Map};
use crate::{CodecError, Result};

const RECURSION_LIMIT: usize = 128;

pub struct Deserializer<'b> {
    remaining_depth: usize,
    reader: SliceReader<'b>,
}

impl<'b> Deserializer<'b> {
    pub fn from_slice(input: &'b [u8]) -> Self {
        Self {
            remaining_depth: RECURSION_LIMIT,
            reader: SliceReader::new(input),
        }
    }

    /// Returns all root values carried by the input.
    pub fn deserialize(mut self) -> Result<Vec<LuaValue>> {
        let mut result = Vec::new();
        while !self.reader.is_empty() {
            result.push(self.read_value()?);
        }
        Ok(result)
    }

    /// Returns the first root value, if any.
    pub fn deserialize_first(mut self) -> Result<Option<LuaValue>> {
        if self.reader.is_empty() {
            return Ok(None);
        }
        self.read_value().map(Some)
    }

    fn read_value(&mut self) -> Result<LuaValue> {
        let tag = self.reader.read_u8()?;

        // `NNNNNNN1`: seven-bit non-negative integer
        if tag & 0b1 == 0b1 {
            return Ok(LuaValue::Number(f64::from(tag >> 1)));
        }

        // `CCCCTT10`: embedded string/array/map
        if tag & 0b11 == 0b10 {
            let count = usize::from(tag >> 4);
            return match (tag >> 2) & 0b11 {
                EMBED_STRING => self.read_string(count),
                EMBED_ARRAY => self.read_array(count),
                EMBED_MAP => self.read_map(count),
                _ => Err(CodecError::UnknownTypeTag(tag)),
            };
        }

        // `NNNNS100`: twelve-bit signed integer
        if tag & 0b111 == 0b100 {
            let low = u16::from(tag >> 4);
            let high = u16::from(self.reader.read_u8()?);
            let magnitude = f64::from(high << 4 | low);
            return Ok(LuaValue::Number(if tag & 0b1000 != 0 {
                -magnitude
            } else {
                magnitude
            }));
        }

        // `TTTTT000`: extended tags
        match tag >> 3 {
            TAG_NULL => Ok(LuaValue::Null),
            TAG_FALSE => Ok(LuaValue::Boolean(false)),
            TAG_TRUE => Ok(LuaValue::Boolean(true)),
            TAG_INT16 => {
                let bytes = self.reader.read_array::<2>()?;
                Ok(LuaValue::Number(f64::from(i16::from_be_bytes(bytes))))
            }
            TAG_INT32 => {
                let bytes = self.reader.read_array::<4>()?;
                Ok(LuaValue::Number(f64::from(i32::from_be_bytes(bytes))))
            }
            TAG_INT64 => {
                let bytes = self.reader.read_array::<8>()?;
                Ok(LuaValue::Number(i64::from_be_bytes(bytes) as f64))
            }
            TAG_FLOAT64 => {
                let bytes = self.reader.read_array::<8>()?;
                Ok(LuaValue::Number(f64::from_bits(u64::from_be_bytes(bytes))))
            }
            TAG_STR16 => {
                let len = self.read_count16()?;
                self.read_string(len)
            }
            TAG_STR32 => {
                let len = self.read_count32()?;
                self.read_string(len)
            }
            TAG_ARRAY16 => {
                let count = self.read_count16()?;
                self.read_array(count)
            }
            TAG_ARRAY32 => {
                let count = self.read_count32()?;
                self.read_array(count)
            }
            TAG_MAP16 => {
                let count = self.read_count16()?;
                self.read_map(count)
            }
            TAG_MAP32 => {
                let count = self.read_count32()?;
                self.read_map(count)
            }
            _ => Err(CodecError::UnknownTypeTag(tag)),
        }
    }

    fn read_count16(&mut self) -> Result<usize> {
        let bytes = self.reader.read_array::<2>()?;
        Ok(usize::from(u16::from_be_bytes(bytes)))
    }

    fn read_count32(&mut self) -> Result<usize> {
        let bytes = self.reader.read_array::<4>()?;
        Ok(u32::from_be_bytes(bytes) as usize)
    }

    fn read_string(&mut self, len: usize) -> Result<LuaValue> {
        let bytes = self.reader.read_bytes(len)?;
        Ok(LuaValue::String(
            String::from_utf8_lossy(bytes).into_owned(),
        ))
    }

    fn read_array(&mut self, count: usize) -> Result<LuaValue> {
        self.descend()?;
        let mut map = Map::new();
        for index in 1..=count {
            let key = LuaMapKey::from_value(LuaValue::Number(index as f64))?;
            let value = self.read_value()?;
            map.insert(key, value);
        }
        self.ascend();
        Ok(LuaValue::Map(map))
    }

    fn read_map(&mut self, count: usize) -> Result<LuaValue> {
        self.descend()?;
        let mut map = Map::new();
        for _ in 0..count {
            let key = LuaMapKey::from_value(self.read_value()?)?;
            let value = self.read_value()?;
            map.insert(key, value);
        }
        self.ascend();
        Ok(LuaValue::Map(map))
    }

    fn descend(&mut self) -> Result<()> {
        self.remaining_depth -= 1;
        if self.remaining_depth == 0 {
            return Err(CodecError::RecursionLimitExceeded);
        }
        Ok(())
    }

    fn ascend(&mut self) {
        self.remaining_depth += 1;
    }
}

// ----------------------------------------------------------------------------
// Input cursor
// ----------------------------------------------------------------------------

struct SliceReader<'b> {
    input: &'b [u8],
    pos: usize,
}

impl<'b> SliceReader<'b> {
    fn new(input: &'b [u8]) -> Self {
        Self { input, pos: 0 }
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn read_u8(&mut self) -> Result<u8> {
        let byte = *self
            .input
            .get(self.pos)
            .ok_or(CodecError::TruncatedInput)?;
        self.pos += 1;
        Ok(byte)
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'b [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.input.len())
            .ok_or(CodecError::TruncatedInput)?;
        let bytes = &self.input[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.read_bytes(N)?);
        Ok(array)
    }
}
