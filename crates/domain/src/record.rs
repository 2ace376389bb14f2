//! Typed record model for items read from the document store.
//!
//! Values mirror the DynamoDB attribute-value wire shape
//! (`{"S": "..."}`, `{"N": "12.50"}`, `{"M": {...}}`, ...).  Numbers are kept
//! as the decimal text the store sent; they are never parsed into binary
//! floating point.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One stored item: attribute name → value.
pub type Record = BTreeMap<String, AttributeValue>;

/// A single attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeValue {
    #[serde(rename = "S")]
    String(String),
    /// Decimal text, exactly as returned by the store.
    #[serde(rename = "N")]
    Number(String),
    /// Base64-encoded bytes.
    #[serde(rename = "B")]
    Binary(String),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
    #[serde(rename = "M")]
    Map(BTreeMap<String, AttributeValue>),
    #[serde(rename = "L")]
    List(Vec<AttributeValue>),
    #[serde(rename = "SS")]
    StringSet(Vec<String>),
    #[serde(rename = "NS")]
    NumberSet(Vec<String>),
    #[serde(rename = "BS")]
    BinarySet(Vec<String>),
}

impl AttributeValue {
    /// Convenience constructor for string values.
    pub fn s(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Convenience constructor for number values.
    pub fn n(value: impl Into<String>) -> Self {
        Self::Number(value.into())
    }
}

/// Whether `text` is a plain decimal literal that can be embedded in JSON
/// verbatim.  Surrounding whitespace is rejected.
pub fn is_json_number_literal(text: &str) -> bool {
    text.trim() == text
        && serde_json::from_str::<serde_json::Value>(text).is_ok_and(|v| v.is_number())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_wire_item() {
        let json = r#"{
            "pk": {"S": "litter#1"},
            "weight": {"N": "4.250"},
            "done": {"BOOL": true},
            "note": {"NULL": true},
            "tags": {"SS": ["a", "b"]},
            "meta": {"M": {"count": {"N": "3"}}},
            "events": {"L": [{"S": "x"}, {"N": "1"}]}
        }"#;
        let record: Record = serde_json::from_str(json).unwrap();
        assert_eq!(record["pk"], AttributeValue::s("litter#1"));
        assert_eq!(record["weight"], AttributeValue::n("4.250"));
        assert_eq!(record["done"], AttributeValue::Bool(true));
        assert_eq!(record["note"], AttributeValue::Null(true));
        match &record["meta"] {
            AttributeValue::Map(m) => assert_eq!(m["count"], AttributeValue::n("3")),
            other => panic!("expected map, got {other:?}"),
        }
        match &record["events"] {
            AttributeValue::List(l) => assert_eq!(l.len(), 2),
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn number_text_is_kept_verbatim() {
        let v: AttributeValue = serde_json::from_str(r#"{"N": "0.1000000000000000055511"}"#).unwrap();
        assert_eq!(v, AttributeValue::n("0.1000000000000000055511"));
    }

    #[test]
    fn number_literal_detection() {
        for ok in ["0", "-1", "12.50", "1e10", "1E+5", "-0.001e-3"] {
            assert!(is_json_number_literal(ok), "{ok} should be a literal");
        }
        for bad in ["", "-", "01", ".5", "5.", "1e", "+1", "NaN", "1.2.3", "0x10", " 1", "\"1\"", "true"] {
            assert!(!is_json_number_literal(bad), "{bad} should not be a literal");
        }
    }
}
