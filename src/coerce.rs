use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoercionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    /// Counts. Unparseable or missing cells become 0.
    Int,
    /// Rates, percentages, distances. Unparseable or missing cells become 0.0.
    Float,
    Text,
    /// Surrogate and foreign keys; null until something assigns them.
    NullableInt,
}

impl SemanticType {
    pub fn default_value(self) -> Value {
        match self {
            SemanticType::Int => Value::Int(0),
            SemanticType::Float => Value::Float(0.0),
            SemanticType::Text => Value::Text(String::new()),
            SemanticType::NullableInt => Value::Null,
        }
    }

    pub fn sql_type(self) -> &'static str {
        match self {
            SemanticType::Int | SemanticType::NullableInt => "INTEGER",
            SemanticType::Float => "REAL",
            SemanticType::Text => "TEXT",
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SemanticType::Int => "int",
            SemanticType::Float => "float",
            SemanticType::Text => "text",
            SemanticType::NullableInt => "nullable_int",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => f.write_str(v),
        }
    }
}

/// Converts one cell to `kind`. Missing (blank) cells yield the type default;
/// malformed cells are an error so the caller can count them before defaulting.
pub fn try_coerce(raw: &str, kind: SemanticType) -> Result<Value, CoercionError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(kind.default_value());
    }
    let parsed = match kind {
        SemanticType::Text => Some(Value::Text(trimmed.to_string())),
        SemanticType::Int | SemanticType::NullableInt => parse_int(trimmed).map(Value::Int),
        SemanticType::Float => parse_float(trimmed).map(Value::Float),
    };
    parsed.ok_or_else(|| CoercionError {
        value: trimmed.to_string(),
        kind,
    })
}

pub fn coerce_or_default(raw: &str, kind: SemanticType) -> Value {
    try_coerce(raw, kind).unwrap_or_else(|_| kind.default_value())
}

fn parse_int(raw: &str) -> Option<i64> {
    let cleaned = strip_thousands(raw);
    if let Ok(v) = cleaned.parse::<i64>() {
        return Some(v);
    }
    // Counts are sometimes dumped as "12.0"; truncate like an integer cast.
    let f = parse_float(&cleaned)?;
    if f.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(f.trunc() as i64)
}

fn parse_float(raw: &str) -> Option<f64> {
    let v = strip_thousands(raw).parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}

fn strip_thousands(raw: &str) -> String {
    raw.chars().filter(|ch| *ch != ',').collect()
}

/// "27-045" (years-days) -> 27.
pub fn parse_age(raw: &str) -> Option<i64> {
    let years = raw.trim().split('-').next()?.trim();
    if years.is_empty() {
        return None;
    }
    parse_int(years)
}

/// "eng ENG" -> "ENG". Values without a space are kept as they are.
pub fn parse_nation(raw: &str) -> String {
    raw.split_whitespace()
        .last()
        .unwrap_or_default()
        .to_string()
}
