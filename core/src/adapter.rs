//! `ValueAdapter` — pluggable document format in/out (spec §1, §4.F). This
//! crate carries only the reference JSON adapter, built on `serde_json`;
//! the full format-adapter layer (YAML/TOML/HJSON/Lua/Python) stays out of
//! scope and is represented only by the trait itself.

use crate::error::{Error, Result};
use crate::value::Value;

/// Converts between a `Value` tree and some serialized document format.
pub trait ValueAdapter {
    /// Parse `source` into a `Value` tree.
    fn parse(&self, source: &str) -> Result<Value>;
    /// Render a `Value` tree back to this format.
    fn dump(&self, value: &Value) -> Result<String>;
}

/// The reference adapter: JSON via `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonAdapter;

impl ValueAdapter for JsonAdapter {
    fn parse(&self, source: &str) -> Result<Value> {
        let parsed: serde_json::Value = serde_json::from_str(source).map_err(|e| Error::Parse {
            path: String::new(),
            message: e.to_string(),
        })?;
        Ok(from_serde_json(&parsed))
    }

    fn dump(&self, value: &Value) -> Result<String> {
        serde_json::to_string_pretty(&to_serde_json(value)).map_err(|e| Error::Parse {
            path: String::new(),
            message: e.to_string(),
        })
    }
}

/// Convert a `serde_json::Value` into our own `Value` tree.
pub fn from_serde_json(v: &serde_json::Value) -> Value {
    match v {
        serde_json::Value::Null => Value::Undefined,
        serde_json::Value::Bool(b) => Value::Boolean(*b),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(Value::Integer)
            .unwrap_or_else(|| Value::Float(n.as_f64().unwrap_or(0.0))),
        serde_json::Value::String(s) => Value::String(s.clone()),
        serde_json::Value::Array(a) => Value::Array(a.iter().map(from_serde_json).collect()),
        serde_json::Value::Object(o) => {
            Value::Object(o.iter().map(|(k, v)| (k.clone(), from_serde_json(v))).collect())
        }
    }
}

/// Convert our `Value` tree into a `serde_json::Value`.
pub fn to_serde_json(v: &Value) -> serde_json::Value {
    match v {
        Value::Undefined => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Integer(n) => serde_json::Value::from(*n),
        Value::Float(n) => serde_json::Value::from(*n),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Array(a) => serde_json::Value::Array(a.iter().map(to_serde_json).collect()),
        Value::Object(o) => {
            serde_json::Value::Object(o.iter().map(|(k, v)| (k.to_string(), to_serde_json(v))).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn round_trips_through_json() {
        let adapter = JsonAdapter;
        let source = json!({"a": 1, "b": [true, "x", null]}).to_string();
        let value = adapter.parse(&source).unwrap();
        let dumped = adapter.dump(&value).unwrap();
        let reparsed = adapter.parse(&dumped).unwrap();
        assert_eq!(value, reparsed);
    }

    #[test]
    fn integers_stay_integral() {
        let v = from_serde_json(&json!(42));
        assert_eq!(v.as_i64(), Some(42));
    }
}
