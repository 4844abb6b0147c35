//! Scalar values carried by records.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::RecordList;

/// A record value.
///
/// Values deserialize from plain JSON: `null`, booleans, numbers, strings and
/// arrays of objects (nested record lists that drive loop regions). Any other
/// JSON, such as an array of strings, is kept as-is in `Json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// No value; substitutes as the empty string
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Whole number
    Integer(i64),
    /// Floating-point number
    Float(f64),
    /// Text
    Text(String),
    /// Nested records
    List(RecordList),
    /// Any other JSON; substitutes as compact JSON text
    Json(serde_json::Value),
}

impl Value {
    /// Check for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// The text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The nested records, if this is a list.
    pub fn as_list(&self) -> Option<&RecordList> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Text(s) => f.write_str(s),
            Value::List(list) => {
                let json = serde_json::to_string(list).map_err(|_| fmt::Error)?;
                f.write_str(&json)
            }
            Value::Json(json) => write!(f, "{json}"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(n.into())
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<RecordList> for Value {
    fn from(list: RecordList) -> Self {
        Value::List(list)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::from("张三").to_string(), "张三");
        assert_eq!(Value::from(100).to_string(), "100");
        assert_eq!(Value::from(12.5).to_string(), "12.5");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from(None::<String>).to_string(), "");
    }

    #[test]
    fn test_deserialize_untagged() {
        let values: Vec<Value> =
            serde_json::from_str(r#"[null, true, 3, 1.5, "x", [{"Item": "A"}]]"#).unwrap();
        assert!(values[0].is_null());
        assert_eq!(values[1], Value::Bool(true));
        assert_eq!(values[2], Value::Integer(3));
        assert_eq!(values[3], Value::Float(1.5));
        assert_eq!(values[4].as_text(), Some("x"));
        assert_eq!(values[5].as_list().map(|l| l.len()), Some(1));
    }

    #[test]
    fn test_other_json_kept_verbatim() {
        let values: Vec<Value> =
            serde_json::from_str(r#"[["x", "y"], {"a": 1}, [1, 2]]"#).unwrap();
        assert!(values.iter().all(|v| matches!(v, Value::Json(_))));
        assert_eq!(values[0].to_string(), r#"["x","y"]"#);
        assert_eq!(values[1].to_string(), r#"{"a":1}"#);
        assert_eq!(values[2].as_list(), None);
    }
}
