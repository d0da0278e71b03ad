//! Binary format serialization
//!
//! The serializer always picks the smallest encoding that fits. Maps whose
//! keys are exactly `1..=n` are written in array form.

use super::*;
use crate::value::{LuaValue, Map};
use crate::{CodecError, Result};

pub struct Serializer {
    output: Vec<u8>,
}

impl Serializer {
    /// Serialize a single root value. `capacity` preallocates the output
    /// buffer when the caller can estimate the payload size.
    pub fn serialize(value: &LuaValue, capacity: Option<usize>) -> Result<Vec<u8>> {
        let mut serializer = Self {
            output: Vec::with_capacity(capacity.unwrap_or(128)),
        };
        serializer.write_value(value)?;
        Ok(serializer.output)
    }

    /// Serialize several root values into one payload.
    pub fn serialize_many(values: &[LuaValue]) -> Result<Vec<u8>> {
        let mut serializer = Self {
            output: Vec::new(),
        };
        for value in values {
            serializer.write_value(value)?;
        }
        Ok(serializer.output)
    }

    fn write_value(&mut self, value: &LuaValue) -> Result<()> {
        match value {
            LuaValue::Null => self.output.push(TAG_NULL << 3),
            LuaValue::Boolean(false) => self.output.push(TAG_FALSE << 3),
            LuaValue::Boolean(true) => self.output.push(TAG_TRUE << 3),
            LuaValue::Number(n) => self.write_number(*n),
            LuaValue::String(s) => self.write_string(s)?,
            LuaValue::Map(map) => self.write_table(map)?,
        }
        Ok(())
    }

    fn write_number(&mut self, n: f64) {
        let as_int = n as i64;
        let is_integral =
            n.is_finite() && as_int as f64 == n && n < 9_223_372_036_854_775_808.0;

        if !is_integral {
            self.output.push(TAG_FLOAT64 << 3);
            self.output.extend_from_slice(&n.to_bits().to_be_bytes());
            return;
        }

        let magnitude = as_int.unsigned_abs();
        if (0..=127).contains(&as_int) {
            self.output.push((as_int as u8) << 1 | 0b1);
        } else if magnitude <= 0xFFF {
            let sign = if as_int < 0 { 0b1000 } else { 0 };
            self.output
                .push(((magnitude & 0xF) as u8) << 4 | sign | 0b100);
            self.output.push((magnitude >> 4) as u8);
        } else if let Ok(small) = i16::try_from(as_int) {
            self.output.push(TAG_INT16 << 3);
            self.output.extend_from_slice(&small.to_be_bytes());
        } else if let Ok(medium) = i32::try_from(as_int) {
            self.output.push(TAG_INT32 << 3);
            self.output.extend_from_slice(&medium.to_be_bytes());
        } else {
            self.output.push(TAG_INT64 << 3);
            self.output.extend_from_slice(&as_int.to_be_bytes());
        }
    }

    fn write_string(&mut self, s: &str) -> Result<()> {
        self.write_container_header(EMBED_STRING, TAG_STR16, TAG_STR32, s.len())?;
        self.output.extend_from_slice(s.as_bytes());
        Ok(())
    }

    fn write_table(&mut self, map: &Map) -> Result<()> {
        if is_sequence(map) {
            self.write_container_header(EMBED_ARRAY, TAG_ARRAY16, TAG_ARRAY32, map.len())?;
            for value in map.values() {
                self.write_value(value)?;
            }
        } else {
            self.write_container_header(EMBED_MAP, TAG_MAP16, TAG_MAP32, map.len())?;
            for (key, value) in map {
                self.write_value(key.as_value())?;
                self.write_value(value)?;
            }
        }
        Ok(())
    }

    fn write_container_header(
        &mut self,
        embed_kind: u8,
        tag16: u8,
        tag32: u8,
        count: usize,
    ) -> Result<()> {
        if count <= EMBED_MAX {
            self.output.push((count as u8) << 4 | embed_kind << 2 | 0b10);
        } else if let Ok(count) = u16::try_from(count) {
            self.output.push(tag16 << 3);
            self.output.extend_from_slice(&count.to_be_bytes());
        } else if let Ok(count) = u32::try_from(count) {
            self.output.push(tag32 << 3);
            self.output.extend_from_slice(&count.to_be_bytes());
        } else {
            return Err(CodecError::InputTooLarge);
        }
        Ok(())
    }
}

/// True when the map's keys are exactly the numbers `1..=len`.
fn is_sequence(map: &Map) -> bool {
    map.keys()
        .enumerate()
        .all(|(i, key)| key.as_value() == &LuaValue::Number((i + 1) as f64))
}
