//! Schema-less claim set with type-checked accessors.
//!
//! Claims arrive as arbitrary JSON. Instead of casting values blindly, callers
//! ask for the type they expect and get `None` when the claim is missing or
//! has a different shape.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// How numeric-date claims (`exp`, `nbf`, `iat`) are read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NumericDates {
    /// JSON integers, JSON floats (floored) and decimal strings.
    #[default]
    Lenient,
    /// JSON numbers only.
    Strict,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.0.get(name).and_then(Value::as_i64)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.0.get(name).and_then(Value::as_f64)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.0.get(name).and_then(Value::as_bool)
    }

    /// Read a numeric-date claim as epoch seconds.
    pub fn numeric_date(&self, name: &str, mode: NumericDates) -> Option<i64> {
        match self.0.get(name)? {
            Value::Number(n) => number_to_seconds(n),
            Value::String(s) if mode == NumericDates::Lenient => string_to_seconds(s),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Claims {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

fn number_to_seconds(n: &serde_json::Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    // u64 beyond i64::MAX or a float
    n.as_f64().and_then(float_to_seconds)
}

fn string_to_seconds(s: &str) -> Option<i64> {
    let s = s.trim();
    if let Ok(i) = s.parse::<i64>() {
        return Some(i);
    }
    s.parse::<f64>().ok().and_then(float_to_seconds)
}

fn float_to_seconds(f: f64) -> Option<i64> {
    if !f.is_finite() {
        return None;
    }
    let floored = f.floor();
    if floored < i64::MIN as f64 || floored > i64::MAX as f64 {
        return None;
    }
    Some(floored as i64)
}
