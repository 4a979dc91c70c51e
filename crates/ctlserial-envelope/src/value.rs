use std::fmt;

use serde::{Deserialize, Serialize};

/// A command argument or response value: the link carries integers and text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Text(String),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Int(_) => None,
            Value::Text(s) => Some(s),
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Value::Text(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{n}"),
            Value::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n.into())
    }
}

impl From<u8> for Value {
    fn from(n: u8) -> Self {
        Value::Int(n.into())
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_untagged_and_compact() {
        let values = [Value::from(0), Value::from(-12), Value::from("a\"b\\c")];
        let out = serde_json::to_string(&values).unwrap();
        assert_eq!(out, r#"[0,-12,"a\"b\\c"]"#);
    }

    #[test]
    fn deserializes_mixed_array() {
        let parsed: Vec<Value> = serde_json::from_str(r#"[0,42,"status",123]"#).unwrap();
        assert_eq!(
            parsed,
            vec![
                Value::Int(0),
                Value::Int(42),
                Value::Text("status".into()),
                Value::Int(123)
            ]
        );
    }

    #[test]
    fn rejects_floats_and_nesting() {
        assert!(serde_json::from_str::<Vec<Value>>("[1.5]").is_err());
        assert!(serde_json::from_str::<Vec<Value>>("[[1,2],[3,4]]").is_err());
    }

    #[test]
    fn accessors() {
        assert_eq!(Value::from(3).as_int(), Some(3));
        assert_eq!(Value::from("x").as_str(), Some("x"));
        assert!(Value::from("x").is_text());
        assert_eq!(Value::from("x").as_int(), None);
        assert_eq!(Value::from(3).to_string(), "3");
    }
}
