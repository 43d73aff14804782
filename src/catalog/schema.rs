//! Column schema inference for tabular resources.
//!
//! A column's type is the fold of the types of its sampled values, using the
//! same per-token inference as the accessor. Nulls do not contribute,
//! integers widen to numbers, dates widen to date-times, and any other mix
//! becomes `string`. A column with no non-null sample is `any`.

use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::Timelike;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::DatasetError;
use crate::record::{infer_value, Value};

/// Number of data rows sampled per delimited-text file.
pub const SAMPLE_ROWS: usize = 100;

/// Table Schema field types produced by inference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Any,
    Boolean,
    Integer,
    Number,
    Date,
    Datetime,
    String,
    Object,
    Array,
}

impl FieldType {
    /// Type of a single inferred value.
    pub fn of_value(value: &Value) -> Self {
        match value {
            Value::Null => FieldType::Any,
            Value::Bool(_) => FieldType::Boolean,
            Value::Number(n) if n.is_finite() && n.fract() == 0.0 => FieldType::Integer,
            Value::Number(_) => FieldType::Number,
            Value::Date(d) if d.num_seconds_from_midnight() == 0 && d.nanosecond() == 0 => {
                FieldType::Date
            }
            Value::Date(_) => FieldType::Datetime,
            Value::String(_) => FieldType::String,
        }
    }

    /// Type of a single JSON value in a table-shaped JSON resource.
    pub fn of_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => FieldType::Any,
            JsonValue::Bool(_) => FieldType::Boolean,
            JsonValue::Number(n) if n.is_i64() || n.is_u64() => FieldType::Integer,
            JsonValue::Number(_) => FieldType::Number,
            JsonValue::String(s) => match infer_value(s) {
                date @ Value::Date(_) => FieldType::of_value(&date),
                _ => FieldType::String,
            },
            JsonValue::Array(_) => FieldType::Array,
            JsonValue::Object(_) => FieldType::Object,
        }
    }

    /// Widens two observed types into one that holds both.
    pub fn merge(self, other: FieldType) -> FieldType {
        use FieldType::*;
        match (self, other) {
            (a, b) if a == b => a,
            (Any, x) | (x, Any) => x,
            (Integer, Number) | (Number, Integer) => Number,
            (Date, Datetime) | (Datetime, Date) => Datetime,
            _ => String,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Any => "any",
            FieldType::Boolean => "boolean",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Datetime => "datetime",
            FieldType::String => "string",
            FieldType::Object => "object",
            FieldType::Array => "array",
        };
        write!(f, "{}", name)
    }
}

/// A column in a resource schema.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
}

impl Field {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            description: None,
            categories: None,
        }
    }
}

/// Ordered list of columns.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    pub fn field_mut(&mut self, name: &str) -> Option<&mut Field> {
        self.fields.iter_mut().find(|field| field.name == name)
    }
}

/// Infers a schema from the first [`SAMPLE_ROWS`] rows of delimited text.
pub fn infer_delimited_schema<R: std::io::Read>(
    reader: R,
    delimiter: u8,
) -> Result<Schema, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let mut types = vec![FieldType::Any; headers.len()];

    for row in csv_reader.records().take(SAMPLE_ROWS) {
        let row = row?;
        for (slot, field) in types.iter_mut().zip(row.iter()) {
            *slot = slot.merge(FieldType::of_value(&infer_value(field)));
        }
    }

    Ok(Schema {
        fields: headers
            .iter()
            .zip(types)
            .map(|(name, field_type)| Field::new(name, field_type))
            .collect(),
    })
}

/// Reads a delimited-text file and infers its schema.
pub fn read_delimited_schema(path: &Path, delimiter: u8) -> Result<Schema, DatasetError> {
    let file = File::open(path).map_err(DatasetError::Io)?;
    infer_delimited_schema(BufReader::new(file), delimiter).map_err(|source| {
        DatasetError::CsvParse {
            name: path.display().to_string(),
            source,
        }
    })
}

/// Infers a schema from an array of flat JSON objects, or from a single flat
/// object read as a one-row table.
///
/// Columns appear in first-seen order (keys within a row follow
/// `serde_json`'s sorted map order). Returns `None` when the value is not
/// table-shaped: an empty array or object, a non-object row, a nested cell,
/// or a scalar.
pub fn infer_json_schema(value: &JsonValue) -> Option<Schema> {
    let rows = match value {
        JsonValue::Array(rows) if !rows.is_empty() => rows.as_slice(),
        JsonValue::Object(row) if !row.is_empty() => std::slice::from_ref(value),
        _ => return None,
    };
    let mut schema = Schema::default();

    for row in rows.iter().take(SAMPLE_ROWS) {
        let object = row.as_object()?;
        for (name, cell) in object {
            let observed = FieldType::of_json(cell);
            if matches!(observed, FieldType::Object | FieldType::Array) {
                return None;
            }
            match schema.field_mut(name) {
                Some(field) => field.field_type = field.field_type.merge(observed),
                None => schema.fields.push(Field::new(name.clone(), observed)),
            }
        }
    }

    Some(schema)
}
