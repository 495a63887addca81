//! Attribute values and attribute maps
//!
//! Every attribute is multi-valued: a name maps to an ordered sequence of
//! opaque scalars, even when the sequence holds a single value.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Attribute name -> ordered values
pub type Attributes = BTreeMap<String, Vec<AttributeValue>>;

/// A single opaque attribute scalar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl AttributeValue {
    /// Borrow the value as a string slice if it is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an integer if it is one
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Boolean(b) => write!(f, "{}", b),
            AttributeValue::Integer(i) => write!(f, "{}", i),
            AttributeValue::Float(x) => write!(f, "{}", x),
            AttributeValue::String(s) => f.write_str(s),
        }
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Float(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Boolean(value)
    }
}

/// Wrap each scalar into a single-element sequence
///
/// Identity providers hand back one value per attribute; the cache only
/// stores sequences.
pub fn wrap_scalars<I, K>(scalars: I) -> Attributes
where
    I: IntoIterator<Item = (K, AttributeValue)>,
    K: Into<String>,
{
    scalars
        .into_iter()
        .map(|(name, value)| (name.into(), vec![value]))
        .collect()
}

/// First value of an attribute rendered as a string
pub fn first_value(attributes: &Attributes, name: &str) -> Option<String> {
    attributes
        .get(name)
        .and_then(|values| values.first())
        .map(|value| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_scalars() {
        let attrs = wrap_scalars(vec![
            ("firstname", AttributeValue::from("Ada")),
            ("age", AttributeValue::from(36i64)),
        ]);

        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs["firstname"], vec![AttributeValue::from("Ada")]);
        assert_eq!(attrs["age"], vec![AttributeValue::Integer(36)]);
    }

    #[test]
    fn test_first_value() {
        let mut attrs = Attributes::new();
        attrs.insert(
            "mail".to_string(),
            vec!["a@example.org".into(), "b@example.org".into()],
        );
        attrs.insert("empty".to_string(), Vec::new());

        assert_eq!(first_value(&attrs, "mail").as_deref(), Some("a@example.org"));
        assert_eq!(first_value(&attrs, "empty"), None);
        assert_eq!(first_value(&attrs, "missing"), None);
    }

    #[test]
    fn test_untagged_json() {
        let values: Vec<AttributeValue> =
            serde_json::from_str(r#"["alice", 42, 1.5, true]"#).unwrap();

        assert_eq!(
            values,
            vec![
                AttributeValue::String("alice".to_string()),
                AttributeValue::Integer(42),
                AttributeValue::Float(1.5),
                AttributeValue::Boolean(true),
            ]
        );
        assert_eq!(values[1].to_string(), "42");
    }
}
