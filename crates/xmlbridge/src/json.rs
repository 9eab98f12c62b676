//! Bridge between [`Value`] and `serde_json`

use serde_json::Number as JsonNumber;

use crate::error::Result;
use crate::value::{List, Map, Number, Value};

/// Converts a value to `serde_json::Value`; non-finite floats become `null`
pub fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(Number::Int(n)) => serde_json::Value::Number((*n).into()),
        Value::Number(Number::Float(n)) => JsonNumber::from_f64(*n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::List(list) => serde_json::Value::Array(list.iter().map(to_json).collect()),
        Value::Map(map) => serde_json::Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), to_json(value)))
                .collect(),
        ),
    }
}

/// Converts a `serde_json::Value`, keeping key order. Integers beyond `i64`
/// and floats beyond `f64` are kept as their literal text.
pub fn from_json(value: serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => from_json_number(&n),
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => {
            Value::List(items.into_iter().map(from_json).collect::<List>())
        }
        serde_json::Value::Object(entries) => Value::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key, from_json(value)))
                .collect::<Map>(),
        ),
    }
}

fn from_json_number(n: &JsonNumber) -> Value {
    if let Some(i) = n.as_i64() {
        return Value::Number(Number::Int(i));
    }
    let literal = n.to_string();
    if literal.contains(['.', 'e', 'E']) {
        if let Some(f) = n.as_f64().filter(|f| f.is_finite()) {
            return Value::Number(Number::Float(f));
        }
    }
    Value::String(literal)
}

/// Compact JSON text
pub fn to_json_string(value: &Value) -> Result<String> {
    Ok(serde_json::to_string(&to_json(value))?)
}

pub fn to_json_string_pretty(value: &Value) -> Result<String> {
    Ok(serde_json::to_string_pretty(&to_json(value))?)
}

/// Parses JSON text into a value
pub fn from_json_str(text: &str) -> Result<Value> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    Ok(from_json(json))
}
