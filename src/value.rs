//! Parameter values and the path-keyed map they travel in.
//!
//! Config text only ever produces strings, but global overrides come from a
//! TOML settings file and per-theme overrides from JSON, both of which carry
//! native booleans and numbers. [`ParamValue`] keeps that distinction instead
//! of stringly-typing everything up front; comparisons go through the
//! canonical text form so `Int(12)` and `Str("12")` are the same setting.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Parameter path → value, iterated in path order.
pub type ParamMap = BTreeMap<String, ParamValue>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl ParamValue {
    /// `true` for the present-but-empty string, which callers treat as "unset".
    pub fn is_empty(&self) -> bool {
        matches!(self, ParamValue::Str(s) if s.is_empty())
    }

    /// Compare by canonical text, ignoring which variant carried the value.
    pub fn same_as(&self, other: &ParamValue) -> bool {
        self.to_string() == other.to_string()
    }

    /// Convert a scalar JSON value. Null, arrays, and objects yield `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<ParamValue> {
        match value {
            serde_json::Value::Bool(b) => Some(ParamValue::Bool(*b)),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Some(ParamValue::Int(i)),
                None => n.as_f64().map(ParamValue::Float),
            },
            serde_json::Value::String(s) => Some(ParamValue::Str(s.clone())),
            _ => None,
        }
    }

    /// Convert a scalar TOML value. Arrays, tables, and datetimes yield `None`.
    pub fn from_toml(value: &toml::Value) -> Option<ParamValue> {
        match value {
            toml::Value::Boolean(b) => Some(ParamValue::Bool(*b)),
            toml::Value::Integer(i) => Some(ParamValue::Int(*i)),
            toml::Value::Float(f) => Some(ParamValue::Float(*f)),
            toml::Value::String(s) => Some(ParamValue::Str(s.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{b}"),
            ParamValue::Int(i) => write!(f, "{i}"),
            ParamValue::Float(x) => write!(f, "{x}"),
            ParamValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::Str(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::Str(s)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Bool(b)
    }
}

impl From<i64> for ParamValue {
    fn from(i: i64) -> Self {
        ParamValue::Int(i)
    }
}

impl From<f64> for ParamValue {
    fn from(x: f64) -> Self {
        ParamValue::Float(x)
    }
}

/// Build a [`ParamMap`] from string pairs. Handy in tests and for callers
/// holding raw config text.
pub fn str_map<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> ParamMap {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), ParamValue::from(v)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_empty_string_is_empty() {
        assert!(ParamValue::from("").is_empty());
        assert!(!ParamValue::from(" ").is_empty());
        assert!(!ParamValue::Int(0).is_empty());
        assert!(!ParamValue::Bool(false).is_empty());
    }

    #[test]
    fn same_as_crosses_variants() {
        assert!(ParamValue::Int(12).same_as(&ParamValue::from("12")));
        assert!(ParamValue::Bool(true).same_as(&ParamValue::from("true")));
        assert!(ParamValue::Float(2.0).same_as(&ParamValue::from("2")));
        assert!(!ParamValue::Bool(true).same_as(&ParamValue::from("yes")));
    }

    #[test]
    fn json_untagged_round_trip_keeps_native_types() {
        let map: ParamMap =
            serde_json::from_str(r#"{"a": true, "b": 3, "c": 0.5, "d": "rgb(ffffff)"}"#).unwrap();
        assert_eq!(map["a"], ParamValue::Bool(true));
        assert_eq!(map["b"], ParamValue::Int(3));
        assert_eq!(map["c"], ParamValue::Float(0.5));
        assert_eq!(map["d"], ParamValue::from("rgb(ffffff)"));
    }

    #[test]
    fn from_json_skips_non_scalars() {
        assert_eq!(ParamValue::from_json(&serde_json::Value::Null), None);
        assert_eq!(ParamValue::from_json(&serde_json::json!([1, 2])), None);
        assert_eq!(
            ParamValue::from_json(&serde_json::json!(7)),
            Some(ParamValue::Int(7))
        );
    }

    #[test]
    fn from_toml_skips_tables() {
        let table: toml::Table = toml::from_str("a = 1\n[b]\nc = 2\n").unwrap();
        assert_eq!(ParamValue::from_toml(&table["a"]), Some(ParamValue::Int(1)));
        assert_eq!(ParamValue::from_toml(&table["b"]), None);
    }
}
