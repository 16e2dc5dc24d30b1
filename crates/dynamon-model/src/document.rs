//! Conversion between plain JSON documents and DynamoDB attribute maps.
//!
//! Scan results come back as maps of [`AttributeValue`]; the UI works with
//! plain JSON records. `unwrap_item` is the step that strips the typed
//! wrapper from each row.

use std::collections::HashMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::Value;

use crate::attribute_value::AttributeValue;

/// A raw DynamoDB item.
pub type Item = HashMap<String, AttributeValue>;

/// A plain record as presented to the UI.
pub type Record = serde_json::Map<String, Value>;

/// Convert a JSON value into an attribute value.
#[must_use]
pub fn json_to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(list) => AttributeValue::L(list.iter().map(json_to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(
            map.iter()
                .map(|(k, v)| (k.clone(), json_to_attribute(v)))
                .collect(),
        ),
    }
}

/// Convert an attribute value into plain JSON.
///
/// Numbers that do not fit a JSON number stay strings.
#[must_use]
pub fn attribute_to_json(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => number_to_json(n),
        AttributeValue::B(b) => Value::String(BASE64.encode(b)),
        AttributeValue::Ss(v) => Value::Array(v.iter().cloned().map(Value::String).collect()),
        AttributeValue::Ns(v) => Value::Array(v.iter().map(|n| number_to_json(n)).collect()),
        AttributeValue::Bs(v) => Value::Array(
            v.iter()
                .map(|b| Value::String(BASE64.encode(b)))
                .collect(),
        ),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(list) => Value::Array(list.iter().map(attribute_to_json).collect()),
        AttributeValue::M(map) => Value::Object(unwrap_item(map)),
    }
}

/// Strip the attribute wrapper from every field of an item.
#[must_use]
pub fn unwrap_item(item: &Item) -> Record {
    item.iter()
        .map(|(k, v)| (k.clone(), attribute_to_json(v)))
        .collect()
}

fn number_to_json(n: &str) -> Value {
    if let Ok(i) = n.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(u) = n.parse::<u64>() {
        return Value::from(u);
    }
    n.parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map_or_else(|| Value::String(n.to_owned()), Value::Number)
}
