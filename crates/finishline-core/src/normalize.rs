//! Maps vendor-specific result objects onto the canonical schema.

use serde_json::{Map, Value};

use crate::fields::{CanonicalField, lookup_field};
use crate::models::NormalizedRow;

/// Why a source object produced no row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowRejection {
    /// The item was not a JSON object.
    NotAnObject,
    /// None of bib, full_name or first_name could be mapped.
    MissingIdentity,
}

/// Normalize one source object, or `None` if it carries no identity field.
pub fn normalize_result_row(item: &Map<String, Value>) -> Option<NormalizedRow> {
    normalize_checked(item).ok()
}

/// Like [`normalize_result_row`] but reports the discard reason.
pub fn normalize_checked(item: &Map<String, Value>) -> Result<NormalizedRow, RowRejection> {
    let mut row = NormalizedRow::new();

    for (key, value) in item {
        let Some(field) = lookup_field(&key.to_lowercase()) else {
            continue;
        };
        if value.is_object() {
            continue;
        }
        row.insert(field, stringify(value));
    }

    if !row.has_identity() {
        return Err(RowRejection::MissingIdentity);
    }

    if !row.contains(CanonicalField::FullName) && row.contains(CanonicalField::FirstName) {
        let full_name = [CanonicalField::FirstName, CanonicalField::LastName]
            .into_iter()
            .filter_map(|f| row.get(f))
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .trim()
            .to_string();
        row.insert(CanonicalField::FullName, full_name);
    }

    Ok(row)
}

/// Normalize an arbitrary JSON value; non-objects are rejected.
pub fn normalize_value(item: &Value) -> Result<NormalizedRow, RowRejection> {
    match item {
        Value::Object(map) => normalize_checked(map),
        _ => Err(RowRejection::NotAnObject),
    }
}

/// Render a scalar as cell text. `null` becomes the empty string.
fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
