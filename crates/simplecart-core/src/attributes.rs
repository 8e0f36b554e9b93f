//! # Attribute Sets
//!
//! The key/value map that qualifies an item into a variant (`color = gold`).
//!
//! ## Empty Means Absent
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Form submits:  color=gold  size=   engraving=                          │
//! │                      │        │          │                              │
//! │                      ▼        ▼          ▼                              │
//! │  AttributeSet:  {color: gold}   (size, engraving dropped)              │
//! │                                                                         │
//! │  An unselected field must never create a distinct variant, so an       │
//! │  empty value is never stored. Inserting one removes the key instead.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Keys are kept in lexicographic order, which is what makes the
//! canonical form used by [`crate::hasher`] independent of construction order.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::amount::Amount;

/// Ordered string → string map with empty values filtered out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AttributeSet(BTreeMap<String, String>);

impl AttributeSet {
    /// Creates an empty set ("no variant").
    pub fn new() -> Self {
        AttributeSet(BTreeMap::new())
    }

    /// Sets `key` to `value`, or removes `key` when `value` is empty.
    ///
    /// Returns the previous value, if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        if value.is_empty() {
            self.0.remove(&key)
        } else {
            self.0.insert(key, value)
        }
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    /// Returns the value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns the value for `key` parsed as a decimal.
    ///
    /// Missing or non-numeric values yield `None`.
    pub fn numeric(&self, key: &str) -> Option<Amount> {
        self.get(key).and_then(Amount::parse)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for AttributeSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = AttributeSet::new();
        for (key, value) in iter {
            set.insert(key, value);
        }
        set
    }
}

impl IntoIterator for AttributeSet {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Lenient deserialization for persisted documents.
///
/// Accepts what older writers produced:
/// - `[]` for an empty set
/// - numbers (`349`) → `"349"`
/// - `true` → `"1"`, `false` / `null` → absent
impl<'de> Deserialize<'de> for AttributeSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde_json::Value;

        match Value::deserialize(deserializer)? {
            Value::Null => Ok(AttributeSet::new()),
            Value::Array(items) if items.is_empty() => Ok(AttributeSet::new()),
            Value::Object(map) => {
                let mut set = AttributeSet::new();
                for (key, value) in map {
                    match value {
                        Value::String(s) => {
                            set.insert(key, s);
                        }
                        Value::Number(n) => {
                            set.insert(key, n.to_string());
                        }
                        Value::Bool(true) => {
                            set.insert(key, "1");
                        }
                        Value::Bool(false) | Value::Null => {}
                        other => {
                            return Err(de::Error::custom(format!(
                                "attribute '{}' must be a scalar, got {}",
                                key, other
                            )))
                        }
                    }
                }
                Ok(set)
            }
            other => Err(de::Error::custom(format!(
                "attributes must be an object, got {}",
                other
            ))),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_value_is_absent() {
        let mut set = AttributeSet::new();
        set.insert("color", "gold");
        set.insert("size", "");
        assert_eq!(set.len(), 1);
        assert!(!set.contains_key("size"));

        // Overwriting with empty removes the key
        assert_eq!(set.insert("color", ""), Some("gold".to_string()));
        assert!(set.is_empty());
    }

    #[test]
    fn test_iteration_is_key_ordered() {
        let set: AttributeSet = [("size", "L"), ("color", "red"), ("brand", "x")]
            .into_iter()
            .collect();
        let keys: Vec<&str> = set.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["brand", "color", "size"]);
    }

    #[test]
    fn test_numeric() {
        let set: AttributeSet = [("price", "349.00"), ("color", "gold")].into_iter().collect();
        assert_eq!(set.numeric("price"), Amount::parse("349"));
        assert_eq!(set.numeric("color"), None);
        assert_eq!(set.numeric("weight"), None);
    }

    #[test]
    fn test_deserialize_lenient() {
        let set: AttributeSet =
            serde_json::from_str(r#"{"price": 349, "gift": true, "note": null, "wrap": false, "color": "gold"}"#)
                .unwrap();
        assert_eq!(set.get("price"), Some("349"));
        assert_eq!(set.get("gift"), Some("1"));
        assert_eq!(set.get("color"), Some("gold"));
        assert!(!set.contains_key("note"));
        assert!(!set.contains_key("wrap"));

        let empty: AttributeSet = serde_json::from_str("[]").unwrap();
        assert!(empty.is_empty());

        assert!(serde_json::from_str::<AttributeSet>(r#"{"color": ["a"]}"#).is_err());
        assert!(serde_json::from_str::<AttributeSet>(r#""gold""#).is_err());
    }

    #[test]
    fn test_serialize_sorted() {
        let set: AttributeSet = [("size", "L"), ("color", "red")].into_iter().collect();
        assert_eq!(
            serde_json::to_string(&set).unwrap(),
            r#"{"color":"red","size":"L"}"#
        );
    }
}
