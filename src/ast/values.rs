use serde::{Deserialize, Serialize};

/// A literal value in a condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Integer
    Int(i64),
    /// Float
    Float(f64),
    /// String
    String(String),
}

impl Value {
    /// Parse a raw token: float if it contains a decimal point, else integer,
    /// else the token is kept as a string.
    pub fn parse_loose(raw: &str) -> Self {
        if raw.contains('.') {
            if let Ok(f) = raw.parse::<f64>() {
                return Value::Float(f);
            }
        } else if let Ok(n) = raw.parse::<i64>() {
            return Value::Int(n);
        }
        Value::String(raw.to_string())
    }

    /// JSON form used in document-store stages.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Int(n) => serde_json::Value::from(*n),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
        }
    }
}

/// SQL literal form. Strings are single-quoted with embedded quotes doubled.
impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_loose() {
        assert_eq!(Value::parse_loose("5000"), Value::Int(5000));
        assert_eq!(Value::parse_loose("2.5"), Value::Float(2.5));
        assert_eq!(Value::parse_loose("male"), Value::String("male".into()));
        assert_eq!(Value::parse_loose("v1.2"), Value::String("v1.2".into()));
    }

    #[test]
    fn test_sql_literal() {
        assert_eq!(Value::Int(25).to_string(), "25");
        assert_eq!(Value::from("o'neil").to_string(), "'o''neil'");
    }
}
