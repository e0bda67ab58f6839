// src/exec/output.rs

//! Parsing of the warehouse client's `--format=json` output.
//!
//! Accepted row shapes:
//! - blank output or `[]`: the query returned no rows
//! - `[row, ...]`: only the first row is used
//! - a bare `row`
//!
//! where a row is either an object (values taken in column order), an array
//! (positional values), or a single scalar.
//!
//! The `bq` client renders every cell as a JSON string, so cells are typed
//! from the query's result schema (taken from a dry run, see
//! [`parse_dry_run_schema`]). Only INTEGER, FLOAT/NUMERIC and BOOLEAN columns
//! are converted; STRING and every other type stay text.

use serde::Deserialize;
use serde_json::Value as Json;

use crate::branch::{ResultRow, Value};
use crate::errors::{Result, SqlBranchError};

/// One column of a query result schema, as reported by the warehouse.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SchemaField {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    /// `NULLABLE`, `REQUIRED` or `REPEATED`.
    #[serde(default)]
    pub mode: Option<String>,
    /// Sub-fields of a RECORD / STRUCT column.
    #[serde(default)]
    pub fields: Vec<SchemaField>,
}

impl SchemaField {
    fn is_repeated(&self) -> bool {
        self.mode
            .as_deref()
            .is_some_and(|m| m.eq_ignore_ascii_case("REPEATED"))
    }
}

/// Extract `statistics.query.schema.fields` from `bq query --dry_run
/// --format=json` output.
pub fn parse_dry_run_schema(stdout: &str) -> Result<Vec<SchemaField>> {
    let doc: Json = serde_json::from_str(stdout.trim())?;
    let fields = doc
        .pointer("/statistics/query/schema/fields")
        .cloned()
        .ok_or_else(|| {
            SqlBranchError::Other(anyhow::anyhow!(
                "dry run output has no statistics.query.schema.fields"
            ))
        })?;
    Ok(serde_json::from_value(fields)?)
}

/// Parse client stdout into the first result row.
///
/// With `schema = None` the JSON types are taken as they are.
pub fn parse_first_row(stdout: &str, schema: Option<&[SchemaField]>) -> Result<Option<ResultRow>> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let doc: Json = serde_json::from_str(trimmed)?;
    let first = match doc {
        Json::Array(rows) => match rows.into_iter().next() {
            Some(row) => row,
            None => return Ok(None),
        },
        other => other,
    };

    Ok(Some(row_from_json(first, schema)))
}

fn row_from_json(row: Json, schema: Option<&[SchemaField]>) -> ResultRow {
    match row {
        Json::Object(columns) => columns
            .into_iter()
            .enumerate()
            .map(|(i, (name, v))| value_from_json(v, column(schema, i, Some(name.as_str()))))
            .collect(),
        Json::Array(cells) => cells
            .into_iter()
            .enumerate()
            .map(|(i, v)| value_from_json(v, column(schema, i, None)))
            .collect(),
        scalar => ResultRow::new(vec![value_from_json(scalar, column(schema, 0, None))]),
    }
}

/// Schema field for a column: by name when the row is keyed, else by position.
fn column<'s>(schema: Option<&'s [SchemaField]>, pos: usize, name: Option<&str>) -> Option<&'s SchemaField> {
    let fields = schema?;
    match name {
        Some(name) => fields
            .iter()
            .find(|f| f.name == name)
            .or_else(|| fields.get(pos)),
        None => fields.get(pos),
    }
}

fn value_from_json(v: Json, field: Option<&SchemaField>) -> Value {
    match (v, field) {
        (Json::Null, _) => Value::Null,
        (Json::Array(items), Some(f)) if f.is_repeated() => {
            let element = SchemaField {
                mode: None,
                ..f.clone()
            };
            Value::List(
                items
                    .into_iter()
                    .map(|i| value_from_json(i, Some(&element)))
                    .collect(),
            )
        }
        (Json::Object(cols), Some(f)) if !f.fields.is_empty() => Value::Record(
            cols.into_iter()
                .enumerate()
                .map(|(i, (k, v))| {
                    let sub = column(Some(f.fields.as_slice()), i, Some(k.as_str()));
                    (k, value_from_json(v, sub))
                })
                .collect(),
        ),
        (Json::String(s), Some(f)) => typed_cell(s, &f.field_type),
        (Json::Bool(b), _) => Value::Bool(b),
        (Json::Number(n), _) => match n.as_i64() {
            Some(i) => Value::Int(i),
            // u64 beyond i64 range or a real number; truthiness survives the
            // conversion either way.
            None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        (Json::String(s), None) => Value::Text(s),
        (Json::Array(items), _) => {
            Value::List(items.into_iter().map(|i| value_from_json(i, None)).collect())
        }
        (Json::Object(fields), _) => Value::Record(
            fields
                .into_iter()
                .map(|(k, v)| (k, value_from_json(v, None)))
                .collect(),
        ),
    }
}

/// Convert a string cell according to its declared column type. Cells that do
/// not parse as their declared type are kept as text.
fn typed_cell(s: String, field_type: &str) -> Value {
    match field_type.to_ascii_uppercase().as_str() {
        "INTEGER" | "INT64" => s.parse::<i64>().map(Value::Int).unwrap_or(Value::Text(s)),
        "FLOAT" | "FLOAT64" | "NUMERIC" | "BIGNUMERIC" | "DECIMAL" | "BIGDECIMAL" => {
            s.parse::<f64>().map(Value::Float).unwrap_or(Value::Text(s))
        }
        "BOOLEAN" | "BOOL" => match s.to_ascii_lowercase().as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::Text(s),
        },
        _ => Value::Text(s),
    }
}
