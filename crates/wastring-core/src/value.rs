//! The Lua-side data model
//!
//! WeakAuras strings carry arbitrary Lua values. [`LuaValue`] is the tagged
//! union both serialization formats deserialize into, and [`LuaMapKey`] is a
//! newtype enforcing the one constraint Lua places on table keys: they are
//! never nil.

use crate::{CodecError, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt::{self, Debug};

/// Map type used for Lua tables
pub type Map = BTreeMap<LuaMapKey, LuaValue>;

/// A tagged union representing all possible values in Lua
#[derive(Debug, Clone)]
pub enum LuaValue {
    Map(Map),
    String(String),
    Number(f64),
    Boolean(bool),
    Null,
}

/// A [`LuaValue`] that is guaranteed not to be null
#[derive(Clone)]
pub struct LuaMapKey(LuaValue);

impl LuaMapKey {
    pub fn from_value(value: LuaValue) -> Result<Self> {
        if let LuaValue::Null = value {
            Err(CodecError::NullMapKey)
        } else {
            Ok(Self(value))
        }
    }

    pub fn as_value(&self) -> &LuaValue {
        &self.0
    }

    fn to_string_key(&self) -> Cow<'_, str> {
        match self.0 {
            LuaValue::String(ref v) => Cow::from(v),
            LuaValue::Number(v) => Cow::from(v.to_string()),
            LuaValue::Boolean(v) => Cow::from(v.to_string()),
            LuaValue::Map(ref m) => Cow::from(format!("map at {m:p}")),
            LuaValue::Null => Cow::from("nil"),
        }
    }
}

impl LuaValue {
    /// Convert a JSON value into its Lua representation.
    ///
    /// Objects become maps with string keys; arrays become maps with 1-based
    /// numeric keys, mirroring Lua's sequence convention. Numbers are widened
    /// to `f64`.
    pub fn from_json(value: &serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => LuaValue::Null,
            Value::Bool(b) => LuaValue::Boolean(*b),
            Value::Number(n) => LuaValue::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => LuaValue::String(s.clone()),
            Value::Array(items) => {
                let mut map = Map::new();
                for (i, item) in items.iter().enumerate() {
                    let key = LuaValue::Number((i + 1) as f64);
                    // A number key is never null, so this cannot fail.
                    if let Ok(key) = LuaMapKey::from_value(key) {
                        map.insert(key, Self::from_json(item));
                    }
                }
                LuaValue::Map(map)
            }
            Value::Object(fields) => {
                let mut map = Map::new();
                for (key, item) in fields {
                    let key = LuaValue::String(key.clone());
                    if let Ok(key) = LuaMapKey::from_value(key) {
                        map.insert(key, Self::from_json(item));
                    }
                }
                LuaValue::Map(map)
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Ordering
// ----------------------------------------------------------------------------

impl PartialOrd for LuaValue {
    fn partial_cmp(&self, other: &LuaValue) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LuaValue {
    // Number > String > Boolean > Map > Null
    fn cmp(&self, other: &LuaValue) -> Ordering {
        match (self, other) {
            (LuaValue::Number(n1), LuaValue::Number(n2)) => {
                n1.partial_cmp(n2)
                    .unwrap_or_else(|| match (n1.is_nan(), n2.is_nan()) {
                        (true, false) => Ordering::Less,
                        (false, true) => Ordering::Greater,
                        _ => Ordering::Equal,
                    })
            }
            (LuaValue::Number(_), _) => Ordering::Greater,
            (_, LuaValue::Number(_)) => Ordering::Less,
            (LuaValue::String(s1), LuaValue::String(s2)) => s1.cmp(s2),
            (LuaValue::String(_), _) => Ordering::Greater,
            (_, LuaValue::String(_)) => Ordering::Less,
            (LuaValue::Boolean(b1), LuaValue::Boolean(b2)) => b1.cmp(b2),
            (LuaValue::Boolean(_), _) => Ordering::Greater,
            (_, LuaValue::Boolean(_)) => Ordering::Less,
            (LuaValue::Map(m1), LuaValue::Map(m2)) => {
                let entries1: Vec<_> = m1.iter().collect();
                let entries2: Vec<_> = m2.iter().collect();
                entries1.cmp(&entries2)
            }
            (LuaValue::Map(_), LuaValue::Null) => Ordering::Greater,
            (LuaValue::Null, LuaValue::Map(_)) => Ordering::Less,
            (LuaValue::Null, LuaValue::Null) => Ordering::Equal,
        }
    }
}

impl PartialEq for LuaValue {
    fn eq(&self, other: &LuaValue) -> bool {
        match (self, other) {
            (LuaValue::Map(m1), LuaValue::Map(m2)) => m1.eq(m2),
            (LuaValue::String(s1), LuaValue::String(s2)) => s1.eq(s2),
            (LuaValue::Number(n1), LuaValue::Number(n2)) => {
                n1.eq(n2) || (n1.is_nan() && n2.is_nan())
            }
            (LuaValue::Boolean(b1), LuaValue::Boolean(b2)) => b1.eq(b2),
            (LuaValue::Null, LuaValue::Null) => true,
            _ => false,
        }
    }
}

impl Eq for LuaValue {}

impl PartialOrd for LuaMapKey {
    #[inline(always)]
    fn partial_cmp(&self, other: &LuaMapKey) -> Option<Ordering> {
        self.0.partial_cmp(&other.0)
    }
}

impl Ord for LuaMapKey {
    #[inline(always)]
    fn cmp(&self, other: &LuaMapKey) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl PartialEq for LuaMapKey {
    #[inline(always)]
    fn eq(&self, other: &LuaMapKey) -> bool {
        self.0.eq(&other.0)
    }
}

impl Eq for LuaMapKey {}

impl Debug for LuaMapKey {
    #[inline(always)]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

// ----------------------------------------------------------------------------
// JSON serialization
// ----------------------------------------------------------------------------

impl Serialize for LuaValue {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            LuaValue::String(s) => serializer.serialize_str(s),
            LuaValue::Number(n) => serializer.serialize_f64(*n),
            LuaValue::Boolean(b) => serializer.serialize_bool(*b),
            LuaValue::Null => serializer.serialize_none(),
            LuaValue::Map(m) => {
                let mut map = serializer.serialize_map(Some(m.len()))?;
                for (k, v) in m {
                    map.serialize_entry(&k.to_string_key(), v)?;
                }
                map.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_is_rejected_as_map_key() {
        assert_eq!(
            LuaMapKey::from_value(LuaValue::Null).unwrap_err(),
            CodecError::NullMapKey
        );
    }

    #[test]
    fn ordering_ranks_every_variant_pair() {
        // Number > String > Boolean > Map > Null, each pair in both
        // directions.
        let ascending = [
            LuaValue::Null,
            LuaValue::Map(Map::new()),
            LuaValue::Boolean(true),
            LuaValue::String("a".into()),
            LuaValue::Number(1.0),
        ];
        for (i, lower) in ascending.iter().enumerate() {
            for higher in &ascending[i + 1..] {
                assert!(lower < higher, "{lower:?} should rank below {higher:?}");
                assert!(higher > lower, "{higher:?} should rank above {lower:?}");
            }
        }
    }

    #[test]
    fn json_arrays_become_one_based_tables() {
        let json: serde_json::Value = serde_json::from_str(r#"["a", "b"]"#).unwrap();
        let value = LuaValue::from_json(&json);

        let LuaValue::Map(map) = value else {
            panic!("expected a map");
        };
        let entries: Vec<_> = map.into_iter().collect();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].0.as_value(), &LuaValue::Number(1.0));
        assert_eq!(entries[0].1, LuaValue::String("a".into()));
        assert_eq!(entries[1].0.as_value(), &LuaValue::Number(2.0));
    }

    #[test]
    fn map_keys_are_stringified_in_json() {
        let mut map = Map::new();
        map.insert(
            LuaMapKey::from_value(LuaValue::Number(2.0)).unwrap(),
            LuaValue::Boolean(true),
        );
        let json = serde_json::to_string(&LuaValue::Map(map)).unwrap();
        assert_eq!(json, r#"{"2":true}"#);
    }
}
