//! Named, typed metadata attached to runs and events.
//!
//! [`Attributes`] is a plain key/value store. It does not enforce any
//! naming convention and does not coerce between types; checked, typed
//! access with proper error reporting lives in `nufatx-core::reader`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A single attribute value.
///
/// Serialized externally tagged, e.g. `{"double": 1.5}` or
/// `{"string_vec": ["G.C.5"]}`, so that empty vectors and whole-number
/// doubles keep their declared type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeValue {
    /// A boolean flag.
    Bool(bool),
    /// A signed integer.
    Int(i64),
    /// A double-precision float.
    Double(f64),
    /// A string.
    String(String),
    /// A vector of signed integers.
    IntVec(Vec<i64>),
    /// A vector of doubles.
    DoubleVec(Vec<f64>),
    /// A vector of strings.
    StringVec(Vec<String>),
}

impl AttributeValue {
    /// Human-readable name of the stored type, used in error messages.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Double(_) => "double",
            Self::String(_) => "string",
            Self::IntVec(_) => "vector<int>",
            Self::DoubleVec(_) => "vector<double>",
            Self::StringVec(_) => "vector<string>",
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f64> for AttributeValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<Vec<i64>> for AttributeValue {
    fn from(v: Vec<i64>) -> Self {
        Self::IntVec(v)
    }
}

impl From<Vec<f64>> for AttributeValue {
    fn from(v: Vec<f64>) -> Self {
        Self::DoubleVec(v)
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(v: Vec<String>) -> Self {
        Self::StringVec(v)
    }
}

impl From<Vec<&str>> for AttributeValue {
    fn from(v: Vec<&str>) -> Self {
        Self::StringVec(v.into_iter().map(str::to_owned).collect())
    }
}

/// An ordered map of attribute name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, AttributeValue>);

impl Attributes {
    /// Create an empty attribute map.
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Set an attribute, replacing any previous value under the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<AttributeValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Look up an attribute by name.
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.0.get(name)
    }

    /// Remove an attribute, returning its value if it was present.
    pub fn remove(&mut self, name: &str) -> Option<AttributeValue> {
        self.0.remove(name)
    }

    /// Whether an attribute with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// All attribute names, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map holds no attributes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_lookup() {
        let mut attrs = Attributes::new();
        attrs.insert("a", true);
        attrs.insert("b", 1_i32);
        attrs.insert("c", vec!["x", "y"]);
        attrs.insert("d", 1.2345);

        assert_eq!(attrs.len(), 4);
        assert!(attrs.contains("a"));
        assert!(!attrs.contains("e"));
        assert_eq!(attrs.get("b"), Some(&AttributeValue::Int(1)));
        assert_eq!(
            attrs.get("c").map(AttributeValue::type_name),
            Some("vector<string>")
        );
    }

    #[test]
    fn insert_replaces_existing_value() {
        let mut attrs = Attributes::new();
        attrs.insert("a", "first");
        attrs.insert("a", "second");
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get("a"), Some(&AttributeValue::String("second".to_owned())));
    }

    #[test]
    fn remove_returns_previous_value() {
        let mut attrs = Attributes::new();
        attrs.insert("a", 3_i64);
        assert_eq!(attrs.remove("a"), Some(AttributeValue::Int(3)));
        assert_eq!(attrs.remove("a"), None);
        assert!(attrs.is_empty());
    }

    #[test]
    fn names_are_sorted() {
        let mut attrs = Attributes::new();
        attrs.insert("zeta", 1_i64);
        attrs.insert("alpha", 2_i64);
        let names: Vec<&str> = attrs.names().collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn empty_vector_keeps_its_type_through_json() {
        let mut attrs = Attributes::new();
        attrs.insert("NuHepMC.Conventions", Vec::<String>::new());
        let json = serde_json::to_string(&attrs).unwrap_or_default();
        let back: Attributes = serde_json::from_str(&json).unwrap_or_default();
        assert_eq!(
            back.get("NuHepMC.Conventions"),
            Some(&AttributeValue::StringVec(Vec::new()))
        );
    }
}
