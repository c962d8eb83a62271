//! Minimal dynamic value type used by the expression engine.
//!
//! Expressions operate over JSON-shaped data pulled from node outputs,
//! workflow variables and trigger input. This module keeps a small
//! `Value` enum next to the engine that uses it rather than depending on
//! a general-purpose value crate the rest of the workspace has no other
//! use for.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A dynamically typed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Absence of a value.
    Null,
    /// Boolean.
    Bool(bool),
    /// Signed 64-bit integer.
    Integer(Integer),
    /// 64-bit float.
    Float(Float),
    /// UTF-8 text.
    Text(String),
    /// Ordered list of values.
    Array(Array),
    /// Ordered string-keyed map of values.
    Object(Object),
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

/// Coarse classification of a [`Value`], used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// See [`Value::Null`].
    Null,
    /// See [`Value::Bool`].
    Boolean,
    /// See [`Value::Integer`].
    Integer,
    /// See [`Value::Float`].
    Float,
    /// See [`Value::Text`].
    Text,
    /// See [`Value::Array`].
    Array,
    /// See [`Value::Object`].
    Object,
}

impl ValueKind {
    /// Human-readable name, used in type-error messages.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::Text => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        }
    }
}

impl Value {
    /// Build a null value.
    #[must_use]
    pub fn null() -> Self {
        Value::Null
    }

    /// Build a boolean value.
    #[must_use]
    pub fn boolean(value: bool) -> Self {
        Value::Bool(value)
    }

    /// Build an integer value.
    #[must_use]
    pub fn integer(value: i64) -> Self {
        Value::Integer(Integer::new(value))
    }

    /// Build a float value.
    #[must_use]
    pub fn float(value: f64) -> Self {
        Value::Float(Float::new(value))
    }

    /// Build a text value.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    /// Build an empty object value.
    #[must_use]
    pub fn object_empty() -> Self {
        Value::Object(Object::new())
    }

    /// Classify this value.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Integer(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
            Value::Text(_) => ValueKind::Text,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    /// `true` if this is [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// `true` if this is [`Value::Array`].
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// `true` if this is [`Value::Object`].
    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// `true` if this is [`Value::Text`].
    #[must_use]
    pub fn is_string(&self) -> bool {
        matches!(self, Value::Text(_))
    }

    /// `true` if this is [`Value::Integer`] or [`Value::Float`].
    #[must_use]
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    /// Borrow the contained integer, if any.
    #[must_use]
    pub fn as_integer(&self) -> Option<Integer> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Borrow the contained float, if any.
    #[must_use]
    pub fn as_float(&self) -> Option<Float> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Borrow the contained boolean, if any.
    #[must_use]
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow the contained string, if any.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Borrow the contained array, if any.
    #[must_use]
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Borrow the contained object, if any.
    #[must_use]
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Truthiness used by `to_boolean` and boolean operators: `null`,
    /// `false`, `0`, `0.0` and the empty string are falsy, everything
    /// else (including empty arrays/objects) is truthy.
    #[must_use]
    pub fn to_boolean(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Integer(i) => i.value() != 0,
            Value::Float(f) => f.value() != 0.0,
            Value::Text(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    /// Coerce to an integer: integers pass through, floats truncate,
    /// numeric strings parse, booleans map to `0`/`1`.
    pub fn to_integer(&self) -> Result<i64, ValueError> {
        match self {
            Value::Integer(i) => Ok(i.value()),
            Value::Float(f) => Ok(f.value() as i64),
            Value::Bool(b) => Ok(i64::from(*b)),
            Value::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| ValueError::NotConvertible(self.kind())),
            _ => Err(ValueError::NotConvertible(self.kind())),
        }
    }

    /// Coerce to a float: numbers pass through, numeric strings parse,
    /// booleans map to `0.0`/`1.0`.
    pub fn to_float(&self) -> Result<f64, ValueError> {
        match self {
            Value::Integer(i) => Ok(i.value() as f64),
            Value::Float(f) => Ok(f.value()),
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ValueError::NotConvertible(self.kind())),
            _ => Err(ValueError::NotConvertible(self.kind())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{}", i.value()),
            Value::Float(x) => write!(f, "{}", x.value()),
            Value::Text(s) => write!(f, "{s}"),
            Value::Array(_) | Value::Object(_) => write!(f, "{}", self.to_json()),
        }
    }
}

/// Conversion failure for [`Value::to_integer`] / [`Value::to_float`].
#[derive(Debug, thiserror::Error)]
pub enum ValueError {
    /// The value's kind cannot be coerced to the requested numeric type.
    #[error("value of kind '{}' is not convertible", .0.name())]
    NotConvertible(ValueKind),
}

/// A signed 64-bit integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Integer(i64);

impl Integer {
    /// Wrap a raw integer.
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    /// Unwrap the raw integer.
    #[must_use]
    pub fn value(&self) -> i64 {
        self.0
    }
}

/// A 64-bit floating point value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Float(f64);

impl Float {
    /// Wrap a raw float.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    /// Unwrap the raw float.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl PartialEq for Float {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

/// An ordered list of values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Array(Vec<Value>);

impl Array {
    /// Build an array from an existing vector.
    #[must_use]
    pub fn from_vec(values: Vec<Value>) -> Self {
        Self(values)
    }

    /// Build an empty array.
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` if this array has no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the element at `index`, if in bounds.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    /// Iterate over the elements in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.0.iter()
    }

    /// Append a value.
    pub fn push(&mut self, value: Value) {
        self.0.push(value);
    }

    /// Consume the array, returning the backing vector.
    #[must_use]
    pub fn into_vec(self) -> Vec<Value> {
        self.0
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// An ordered string-keyed map of values.
///
/// Insertion order is preserved, matching how workflow outputs are
/// built field by field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Object(Vec<(String, Value)>);

impl Object {
    /// Build an empty object.
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert or replace a field, returning `self` for chaining.
    #[must_use]
    pub fn insert(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.0.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.0.push((key, value));
        }
        self
    }

    /// Insert or replace a field in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.0.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.0.push((key, value));
        }
    }

    /// Borrow the field named `key`, if present.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// `true` if a field named `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.iter().any(|(k, _)| k == key)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` if this object has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.iter().map(|(k, _)| k)
    }

    /// Iterate over field values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.0.iter().map(|(_, v)| v)
    }
}

impl<'a> IntoIterator for &'a Object {
    type Item = &'a (String, Value);
    type IntoIter = std::slice::Iter<'a, (String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::integer(i)
                } else {
                    Value::float(n.as_f64().unwrap_or(0.0))
                }
            }
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => {
                Value::Array(Array::from_vec(items.into_iter().map(Value::from).collect()))
            }
            serde_json::Value::Object(map) => {
                let mut obj = Object::new();
                for (k, v) in map {
                    obj = obj.insert(k, Value::from(v));
                }
                Value::Object(obj)
            }
        }
    }
}

/// Extension trait converting a [`Value`] to `serde_json::Value`.
pub trait ValueRefExt {
    /// Convert to the JSON representation used by node outputs and logs.
    fn to_json(&self) -> serde_json::Value;
}

impl ValueRefExt for Value {
    fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::Number(i.value().into()),
            Value::Float(x) => serde_json::Number::from_f64(x.value())
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Array(arr) => {
                serde_json::Value::Array(arr.iter().map(ValueRefExt::to_json).collect())
            }
            Value::Object(obj) => serde_json::Value::Object(
                obj.0
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

/// Extension trait converting `serde_json::Value` into a [`Value`].
pub trait JsonValueExt {
    /// Convert, mapping any JSON shape to an equivalent [`Value`].
    fn to_gridflow_value(&self) -> Value;

    /// Convert, treating parse failure (there is none today, but this
    /// mirrors the fallible sibling used elsewhere) as `null`.
    fn to_gridflow_value_or_null(&self) -> Value;
}

impl JsonValueExt for serde_json::Value {
    fn to_gridflow_value(&self) -> Value {
        Value::from(self.clone())
    }

    fn to_gridflow_value_or_null(&self) -> Value {
        Value::from(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_roundtrip_preserves_object_field_order() {
        let json = serde_json::json!({"b": 1, "a": 2});
        let value = json.to_gridflow_value();
        let obj = value.as_object().unwrap();
        let keys: Vec<_> = obj.keys().cloned().collect();
        assert_eq!(keys, vec!["b".to_string(), "a".to_string()]);
        assert_eq!(value.to_json(), json);
    }

    #[test]
    fn truthiness_matches_common_scripting_rules() {
        assert!(!Value::null().to_boolean());
        assert!(!Value::integer(0).to_boolean());
        assert!(!Value::text("").to_boolean());
        assert!(Value::text("0").to_boolean());
        assert!(Value::Array(Array::new()).to_boolean());
    }

    #[test]
    fn string_to_number_coercions() {
        assert_eq!(Value::text("42").to_integer().unwrap(), 42);
        assert_eq!(Value::text("3.5").to_float().unwrap(), 3.5);
        assert!(Value::text("nope").to_integer().is_err());
    }

    #[test]
    fn object_insert_replaces_existing_key() {
        let obj = Object::new().insert("a", Value::integer(1)).insert("a", Value::integer(2));
        assert_eq!(obj.get("a"), Some(&Value::integer(2)));
        assert_eq!(obj.len(), 1);
    }
}
