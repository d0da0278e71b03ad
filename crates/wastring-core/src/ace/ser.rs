//! AceSerializer serialization

use super::{REVISION, STREAM_END};
use crate::value::LuaValue;
use crate::Result;

/// Largest integer a double can represent exactly
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0; // 2^53

pub struct Serializer {
    output: String,
}

impl Serializer {
    /// Serialize a single root value into an AceSerializer stream.
    pub fn serialize(value: &LuaValue) -> Result<String> {
        Self::serialize_many(core::slice::from_ref(value))
    }

    /// Serialize several root values into one stream.
    pub fn serialize_many(values: &[LuaValue]) -> Result<String> {
        let mut serializer = Self {
            output: String::from(REVISION),
        };
        for value in values {
            serializer.write_value(value)?;
        }
        serializer.output.push_str(STREAM_END);
        Ok(serializer.output)
    }

    fn write_value(&mut self, value: &LuaValue) -> Result<()> {
        match value {
            LuaValue::Null => self.output.push_str("^Z"),
            LuaValue::Boolean(true) => self.output.push_str("^B"),
            LuaValue::Boolean(false) => self.output.push_str("^b"),
            LuaValue::String(s) => {
                self.output.push_str("^S");
                escape_into(s, &mut self.output);
            }
            LuaValue::Number(n) => self.write_number(*n),
            LuaValue::Map(map) => {
                self.output.push_str("^T");
                for (key, entry) in map {
                    self.write_value(key.as_value())?;
                    self.write_value(entry)?;
                }
                self.output.push_str("^t");
            }
        }
        Ok(())
    }

    fn write_number(&mut self, n: f64) {
        if n.is_nan() {
            self.output.push_str("^N1.#IND");
        } else if n == f64::INFINITY {
            self.output.push_str("^N1.#INF");
        } else if n == f64::NEG_INFINITY {
            self.output.push_str("^N-1.#INF");
        } else if n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER {
            self.output.push_str("^N");
            self.output.push_str(&(n as i64).to_string());
        } else {
            // AceSerializer writes non-integral numbers as an exact
            // mantissa/exponent pair so no precision is lost in transit.
            let (mantissa, exponent) = frexp(n);
            self.output.push_str("^F");
            self.output
                .push_str(&((mantissa * MAX_EXACT_INTEGER) as i64).to_string());
            self.output.push_str("^f");
            self.output.push_str(&(exponent - 53).to_string());
        }
    }
}

fn escape_into(s: &str, output: &mut String) {
    for c in s.chars() {
        match c {
            '\u{1E}' => output.push_str("~z"),
            '\u{7F}' => output.push_str("~{"),
            '~' => output.push_str("~|"),
            '^' => output.push_str("~}"),
            c if (c as u32) < 32 => {
                output.push('~');
                output.push((c as u8 + 64) as char);
            }
            c => output.push(c),
        }
    }
}

/// Decompose a finite, non-zero double into `m * 2^e` with `m` in [0.5, 1).
fn frexp(x: f64) -> (f64, i32) {
    let bits = x.to_bits();
    let raw_exponent = ((bits >> 52) & 0x7FF) as i32;

    if raw_exponent == 0 {
        // Subnormal; scale into the normal range first.
        let (mantissa, exponent) = frexp(x * 2f64.powi(64));
        return (mantissa, exponent - 64);
    }

    let mantissa = f64::from_bits((bits & !(0x7FFu64 << 52)) | (1022u64 << 52));
    (mantissa, raw_exponent - 1022)
}
