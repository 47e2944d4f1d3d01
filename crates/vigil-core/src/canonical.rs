//! # Canonical Serialization
//!
//! `CanonicalBytes` is the only input accepted by commitment hashing.
//!
//! ## Rules
//!
//! 1. **Reject floats.** JCS number formatting for non-integers has edge
//!    cases across implementations; complaint content never needs them.
//! 2. **Sorted keys, compact separators.** Serialization uses `serde_jcs`
//!    (RFC 8785), so the byte sequence is independent of field insertion
//!    order.
//!
//! A third party holding the disclosed content can reproduce the bytes with
//! any RFC 8785 implementation, e.g. Python's
//! `json.dumps(obj, sort_keys=True, separators=(",", ":"), ensure_ascii=False)`
//! for the string/bool-only payloads used here.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization.
///
/// The inner `Vec<u8>` is private; the only constructor is
/// [`CanonicalBytes::new()`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    ///
    /// # Errors
    ///
    /// `FloatRejected` if the value contains a non-integer number,
    /// `SerializationFailed` if serde cannot represent the value as JSON.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        reject_floats(&value)?;
        let s = serde_jcs::to_string(&value)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn reject_floats(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(()),
        Value::Number(n) => {
            if !n.is_i64() && !n.is_u64() {
                if let Some(f) = n.as_f64() {
                    return Err(CanonicalizationError::FloatRejected(f));
                }
            }
            Ok(())
        }
        Value::Array(items) => items.iter().try_for_each(reject_floats),
        Value::Object(map) => map.values().try_for_each(reject_floats),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_str(cb: &CanonicalBytes) -> &str {
        std::str::from_utf8(cb.as_bytes()).unwrap()
    }

    #[test]
    fn keys_are_sorted() {
        let cb = CanonicalBytes::new(&serde_json::json!({"z": 1, "m": "x", "a": true})).unwrap();
        assert_eq!(as_str(&cb), r#"{"a":true,"m":"x","z":1}"#);
    }

    #[test]
    fn nested_objects_sorted() {
        let cb = CanonicalBytes::new(&serde_json::json!({"outer": {"b": 2, "a": 1}})).unwrap();
        assert_eq!(as_str(&cb), r#"{"outer":{"a":1,"b":2}}"#);
    }

    #[test]
    fn float_rejected() {
        match CanonicalBytes::new(&serde_json::json!({"score": 0.5})) {
            Err(CanonicalizationError::FloatRejected(f)) => assert_eq!(f, 0.5),
            other => panic!("expected FloatRejected, got {other:?}"),
        }
    }

    #[test]
    fn float_in_array_rejected() {
        assert!(CanonicalBytes::new(&serde_json::json!({"xs": [1, 2.25]})).is_err());
    }

    #[test]
    fn unicode_kept_verbatim() {
        let cb = CanonicalBytes::new(&serde_json::json!({"t": "rüşvet"})).unwrap();
        assert_eq!(as_str(&cb), "{\"t\":\"rüşvet\"}");
    }

    #[test]
    fn empty_object() {
        let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        assert_eq!(cb.as_bytes(), b"{}");
        assert_eq!(cb.len(), 2);
        assert!(!cb.is_empty());
    }
}
