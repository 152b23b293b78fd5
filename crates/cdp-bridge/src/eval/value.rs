//! Local values produced by resolving remote results
//!
//! [`Value`] is what the resolver hands back to callers. Primitive and
//! structured JSON results map onto the obvious variants; DOM nodes become
//! [`Value::Node`] wrapping a live handle. [`Value::None`] is the single
//! "empty" sentinel: `false`, `0` and `""` are all non-empty values.

use crate::dom::{ElementHandle, Node};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Value {
    /// `null`, `undefined` or no result at all
    #[default]
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Array(Vec<Value>),
    Object(BTreeMap<String, Value>),
    Node(Node),
}

impl Value {
    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer view; floats with no fractional part convert too.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.is_finite() && f.fract() == 0.0 => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Value::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Consumes the value and returns the element it refers to.
    ///
    /// Documents yield their own root element handle.
    pub fn into_element(self) -> Option<ElementHandle> {
        match self {
            Value::Node(node) => Some(node.into_element()),
            _ => None,
        }
    }

    /// Text rendering used by string-typed accessors; `None` renders empty.
    pub fn to_text(&self) -> String {
        match self {
            Value::None => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::Node(node) => node.remote_id().to_string(),
            Value::Array(_) | Value::Object(_) => {
                self.to_json().map(|j| j.to_string()).unwrap_or_default()
            }
        }
    }

    /// Truthiness of a loosely typed result.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0 && !f.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) | Value::Node(_) => true,
        }
    }

    /// Builds a local value from a JSON payload.
    pub fn from_json(json: JsonValue) -> Self {
        match json {
            JsonValue::Null => Value::None,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(s) => Value::String(s),
            JsonValue::Array(items) => {
                Value::Array(items.into_iter().map(Value::from_json).collect())
            }
            JsonValue::Object(map) => Value::Object(
                map.into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Decodes a primitive the protocol could not JSON-encode.
    ///
    /// Handles `NaN`, `Infinity`, `-Infinity`, `-0` and bigint literals (`123n`).
    /// Bigints that do not fit an `i64` are kept as their decimal text.
    pub fn from_unserializable(raw: &str) -> Self {
        match raw {
            "NaN" => Value::Float(f64::NAN),
            "Infinity" => Value::Float(f64::INFINITY),
            "-Infinity" => Value::Float(f64::NEG_INFINITY),
            "-0" => Value::Float(-0.0),
            _ => match raw.strip_suffix('n') {
                Some(digits) => digits
                    .parse::<i64>()
                    .map(Value::Int)
                    .unwrap_or_else(|_| Value::String(digits.to_string())),
                None => Value::String(raw.to_string()),
            },
        }
    }

    /// JSON rendering of the value, if it has one.
    ///
    /// Returns `None` for nodes and non-finite floats, which have no JSON form.
    pub fn to_json(&self) -> Option<JsonValue> {
        match self {
            Value::None => Some(JsonValue::Null),
            Value::Bool(b) => Some(JsonValue::Bool(*b)),
            Value::Int(i) => Some(JsonValue::from(*i)),
            Value::Float(f) => serde_json::Number::from_f64(*f).map(JsonValue::Number),
            Value::String(s) => Some(JsonValue::String(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(Value::to_json)
                .collect::<Option<Vec<_>>>()
                .map(JsonValue::Array),
            Value::Object(map) => map
                .iter()
                .map(|(k, v)| v.to_json().map(|v| (k.clone(), v)))
                .collect::<Option<serde_json::Map<_, _>>>()
                .map(JsonValue::Object),
            Value::Node(_) => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Value::Node(node)
    }
}

impl From<ElementHandle> for Value {
    fn from(element: ElementHandle) -> Self {
        Value::Node(Node::Element(element))
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_literals() {
        assert_eq!(Value::from_json(json!(null)), Value::None);
        assert_eq!(Value::from_json(json!(2)), Value::Int(2));
        assert_eq!(Value::from_json(json!(2.5)), Value::Float(2.5));
        assert_eq!(Value::from_json(json!("a\"b")), Value::String("a\"b".into()));
        assert_eq!(
            Value::from_json(json!([1, "x", false])),
            Value::Array(vec![Value::Int(1), "x".into(), Value::Bool(false)])
        );

        let obj = Value::from_json(json!({"b": 1, "a": [true]}));
        let map = obj.as_object().unwrap();
        assert_eq!(map.get("a"), Some(&Value::Array(vec![Value::Bool(true)])));
        assert_eq!(obj.to_json(), Some(json!({"a": [true], "b": 1})));
    }

    #[test]
    fn test_unserializable_primitives() {
        assert!(Value::from_unserializable("NaN").as_f64().unwrap().is_nan());
        assert_eq!(Value::from_unserializable("-Infinity"), Value::Float(f64::NEG_INFINITY));

        let neg_zero = Value::from_unserializable("-0").as_f64().unwrap();
        assert!(neg_zero == 0.0 && neg_zero.is_sign_negative());

        assert_eq!(Value::from_unserializable("42n"), Value::Int(42));
        assert_eq!(
            Value::from_unserializable("123456789012345678901234567890n"),
            Value::String("123456789012345678901234567890".into())
        );
    }

    #[test]
    fn test_empty_is_distinct_from_falsy() {
        assert!(Value::None.is_none());
        assert!(!Value::Bool(false).is_none());
        assert!(!Value::Int(0).is_none());
        assert!(!Value::String(String::new()).is_none());
        assert!(!Value::Bool(false).is_truthy());
        assert_eq!(Value::None.to_text(), "");
        assert_eq!(Value::Float(f64::NAN).to_json(), None);
    }
}
