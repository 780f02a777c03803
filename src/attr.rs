//! Typed attribute values for open-ended attribute bags

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::Error as _;
use serde::{Deserialize, Serialize, Serializer};

/// String-keyed attribute bag. `BTreeMap` keeps keys sorted so encodings are stable.
pub type Attributes = BTreeMap<String, AttrValue>;

/// A JSON-like value stored in an attribute bag or annotation.
///
/// Serialized untagged, so `AttrValue::String("x")` encodes as `"x"` and a
/// map encodes as a plain object. Non-finite floats refuse to serialize.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(#[serde(serialize_with = "finite_f64")] f64),
    String(String),
    List(Vec<AttrValue>),
    Map(BTreeMap<String, AttrValue>),
}

/// Serialize an `f64`, refusing NaN and infinities instead of writing `null`
pub(crate) fn finite_f64<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if !value.is_finite() {
        return Err(S::Error::custom(format!(
            "non-finite number {} cannot be encoded",
            value
        )));
    }
    serializer.serialize_f64(*value)
}

pub(crate) fn finite_opt_f64<S: Serializer>(
    value: &Option<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(n) => finite_f64(n, serializer),
        None => serializer.serialize_none(),
    }
}

impl AttrValue {
    pub fn is_null(&self) -> bool {
        matches!(self, AttrValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttrValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttrValue::Float(n) => Some(*n),
            AttrValue::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Null => write!(f, "null"),
            AttrValue::Bool(b) => write!(f, "{}", b),
            AttrValue::Int(n) => write!(f, "{}", n),
            AttrValue::Float(n) => write!(f, "{}", n),
            AttrValue::String(s) => write!(f, "{}", s),
            other => match serde_json::to_string(other) {
                Ok(json) => write!(f, "{}", json),
                Err(_) => Err(fmt::Error),
            },
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::String(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::String(s)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<i64> for AttrValue {
    fn from(n: i64) -> Self {
        AttrValue::Int(n)
    }
}

impl From<f64> for AttrValue {
    fn from(n: f64) -> Self {
        AttrValue::Float(n)
    }
}

impl<T: Into<AttrValue>> From<Vec<T>> for AttrValue {
    fn from(items: Vec<T>) -> Self {
        AttrValue::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_encoding() {
        let mut bag = Attributes::new();
        bag.insert("speaker".into(), "Jesus".into());
        bag.insert("indent".into(), AttrValue::Int(2));
        bag.insert("italic".into(), true.into());
        let json = serde_json::to_string(&bag).unwrap();
        assert_eq!(json, r#"{"indent":2,"italic":true,"speaker":"Jesus"}"#);
    }

    #[test]
    fn test_decode_prefers_int_over_float() {
        let v: AttrValue = serde_json::from_str("3").unwrap();
        assert_eq!(v, AttrValue::Int(3));
        let v: AttrValue = serde_json::from_str("0.75").unwrap();
        assert_eq!(v, AttrValue::Float(0.75));
    }

    #[test]
    fn test_nested_map_roundtrip() {
        let json = r#"{"a":[1,"two",null],"b":{"c":false}}"#;
        let v: AttrValue = serde_json::from_str(json).unwrap();
        assert!(matches!(v, AttrValue::Map(_)));
        assert_eq!(serde_json::to_string(&v).unwrap(), json);
    }

    #[test]
    fn test_non_finite_float_fails() {
        assert!(serde_json::to_string(&AttrValue::Float(f64::NAN)).is_err());
        assert!(serde_json::to_string(&AttrValue::Float(f64::INFINITY)).is_err());
    }
}
