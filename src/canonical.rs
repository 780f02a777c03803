//! Canonical JSON encoding
//!
//! Hashes over whole entities are only useful as change-detection signatures
//! if the same value always encodes to the same bytes, in this crate and in
//! any other runtime reading the same corpus. The canonical form is RFC 8785
//! (JSON Canonicalization Scheme): sorted keys, no whitespace, and ECMAScript
//! number formatting, so `1.0` encodes as `1`.
//!
//! Values go through `serde_json::Value` first so field-level serialization
//! guards (non-finite floats) fail before any bytes are produced.

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Encode `value` as canonical JSON bytes
pub fn canonical_bytes<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    Ok(canonical_string(value)?.into_bytes())
}

/// Encode `value` as a canonical JSON string
pub fn canonical_string<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let value: Value = serde_json::to_value(value)?;
    Ok(serde_jcs::to_string(&value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Unordered {
        zeta: u8,
        alpha: u8,
        nested: Value,
    }

    #[test]
    fn test_keys_are_sorted_at_every_level() {
        let value = Unordered {
            zeta: 1,
            alpha: 2,
            nested: json!({"y": [{"b": 1, "a": 2}], "x": null}),
        };
        let encoded = canonical_string(&value).unwrap();
        assert_eq!(
            encoded,
            r#"{"alpha":2,"nested":{"x":null,"y":[{"a":2,"b":1}]},"zeta":1}"#
        );
    }

    #[test]
    fn test_bytes_match_string() {
        let value = json!({"b": "β", "a": 1.5});
        assert_eq!(
            canonical_bytes(&value).unwrap(),
            canonical_string(&value).unwrap().into_bytes()
        );
    }

    #[test]
    fn test_numbers_use_ecmascript_form() {
        let value = json!({"whole": 1.0, "big": 1e21, "half": 0.5, "int": 7});
        assert_eq!(
            canonical_string(&value).unwrap(),
            r#"{"big":1e+21,"half":0.5,"int":7,"whole":1}"#
        );
    }
}
