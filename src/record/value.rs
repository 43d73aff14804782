//! Typed values and records produced by delimited-text parsing.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A single typed field value.
///
/// Values are produced by [`infer_value`](super::infer_value). Dates always
/// carry an explicit offset: tokens without a zone designator are read as
/// UTC wall-clock times, so a value never depends on the host timezone.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    /// Any finite or non-finite number, including NaN.
    Number(f64),
    Date(DateTime<FixedOffset>),
    String(String),
}

impl Value {
    /// Stable lowercase name of the value's kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::Date(_) => "date",
            Value::String(_) => "string",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Value::Date(d) => Some(d),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) if n.is_nan() => write!(f, "NaN"),
            Value::Number(n) if n.is_infinite() => {
                write!(f, "{}", if *n > 0.0 { "Infinity" } else { "-Infinity" })
            }
            Value::Number(n) => write!(f, "{}", n),
            Value::Date(d) => write!(f, "{}", d.to_rfc3339()),
            Value::String(s) => write!(f, "{}", s),
        }
    }
}

/// Dates serialize as RFC 3339 strings. Non-finite numbers follow
/// `serde_json` and come out as `null`.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => serializer.serialize_f64(*n),
            Value::Date(d) => serializer.serialize_str(&d.to_rfc3339()),
            Value::String(s) => serializer.serialize_str(s),
        }
    }
}

/// One row of a delimited-text dataset, keyed by column name.
///
/// Fields keep the column order of the header row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Appends a field. Duplicate column names are kept; lookups return the
    /// first occurrence.
    pub fn push(&mut self, column: impl Into<String>, value: Value) {
        self.fields.push((column.into(), value));
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn record_preserves_column_order() {
        let mut record = Record::new();
        record.push("b", Value::Number(1.0));
        record.push("a", Value::Null);

        let columns: Vec<&str> = record.columns().collect();
        assert_eq!(columns, vec!["b", "a"]);

        let json = serde_json::to_string(&record).expect("serialize");
        assert_eq!(json, r#"{"b":1.0,"a":null}"#);
    }

    #[test]
    fn duplicate_columns_resolve_to_first() {
        let mut record = Record::new();
        record.push("x", Value::Bool(true));
        record.push("x", Value::Bool(false));

        assert_eq!(record.get("x"), Some(&Value::Bool(true)));
        assert_eq!(record.len(), 2);
    }

    #[test]
    fn date_serializes_as_rfc3339() {
        let date = FixedOffset::east_opt(0)
            .expect("offset")
            .with_ymd_and_hms(2020, 1, 1, 10, 0, 0)
            .single()
            .expect("date");
        let json = serde_json::to_string(&Value::Date(date)).expect("serialize");
        assert_eq!(json, r#""2020-01-01T10:00:00+00:00""#);
    }

    #[test]
    fn display_spells_non_finite_numbers() {
        assert_eq!(Value::Number(f64::NAN).to_string(), "NaN");
        assert_eq!(Value::Number(f64::NEG_INFINITY).to_string(), "-Infinity");
        assert_eq!(Value::Number(42.0).to_string(), "42");
    }
}
