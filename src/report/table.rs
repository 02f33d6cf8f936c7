//! Flattening findings into CSV rows.

use std::collections::BTreeSet;

use serde_json::{Map, Value};

use super::ReportError;
use crate::finding::Finding;

/// Separator used when a list field is flattened into one cell.
pub const LIST_SEPARATOR: &str = "; ";

/// Returns the CSV header and rows for `findings`.
///
/// The header is the lexicographically sorted union of every key across
/// rows. List values are joined with [`LIST_SEPARATOR`], nulls become empty
/// cells and numbers are printed plainly.
///
/// # Errors
///
/// Returns [`ReportError::Serialize`] if a finding cannot be converted to a
/// JSON object.
pub fn csv_rows(findings: &[Finding]) -> Result<(Vec<String>, Vec<Vec<String>>), ReportError> {
    let objects = findings
        .iter()
        .map(|finding| {
            serde_json::to_value(finding).map(|value| match value {
                Value::Object(map) => map,
                _ => Map::new(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let header: Vec<String> = objects
        .iter()
        .flat_map(Map::keys)
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let rows = objects
        .iter()
        .map(|object| {
            header
                .iter()
                .map(|key| object.get(key).map(cell).unwrap_or_default())
                .collect()
        })
        .collect();

    Ok((header, rows))
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(cell)
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR),
        other => other.to_string(),
    }
}
