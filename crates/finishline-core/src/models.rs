use std::collections::BTreeMap;

use serde::Serialize;

use crate::fields::{CanonicalField, IDENTITY_FIELDS};

/// Minimum body length (bytes) for a captured response to be considered.
pub const DEFAULT_MIN_BODY_BYTES: usize = 50;

/// One captured JSON network response.
#[derive(Debug, Clone, Serialize)]
pub struct RawPayload {
    pub source_url: String,
    pub status: u16,
    /// Length of the response body in bytes.
    pub byte_size: usize,
    pub json_value: serde_json::Value,
}

impl RawPayload {
    /// Build a payload from a response body, applying the capture filter.
    ///
    /// Returns `None` when the body is not longer than `min_bytes` or does
    /// not parse as JSON.
    pub fn from_body(
        source_url: impl Into<String>,
        status: u16,
        body: &str,
        min_bytes: usize,
    ) -> Option<Self> {
        if body.len() <= min_bytes {
            return None;
        }
        let json_value = serde_json::from_str(body).ok()?;
        Some(Self {
            source_url: source_url.into(),
            status,
            byte_size: body.len(),
            json_value,
        })
    }
}

/// Whether a response content type should be treated as JSON.
pub fn is_json_content_type(content_type: &str) -> bool {
    content_type.to_ascii_lowercase().contains("json")
}

/// An HTML table as read from the DOM.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct RenderedTable {
    /// Cells of the first row, trimmed and lower-cased.
    pub headers: Vec<String>,
    /// Remaining rows, trimmed cell text.
    pub rows: Vec<Vec<String>>,
}

/// Everything captured from one page load.
#[derive(Debug, Clone, Default)]
pub struct CapturedPage {
    pub url: String,
    /// JSON responses in arrival order.
    pub payloads: Vec<RawPayload>,
    /// Tables in document order.
    pub tables: Vec<RenderedTable>,
}

/// One participant mapped onto the canonical schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NormalizedRow {
    fields: BTreeMap<CanonicalField, String>,
}

impl NormalizedRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: CanonicalField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: CanonicalField) -> bool {
        self.fields.contains_key(&field)
    }

    /// Set a field, replacing any previous value.
    pub fn insert(&mut self, field: CanonicalField, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    pub fn fields(&self) -> impl Iterator<Item = CanonicalField> + '_ {
        self.fields.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CanonicalField, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True when at least one identity field is present (even if empty).
    pub fn has_identity(&self) -> bool {
        IDENTITY_FIELDS.iter().any(|f| self.contains(*f))
    }

    /// Value used to detect duplicates: bib, falling back to full name.
    ///
    /// `None` when both are missing or empty.
    pub fn dedup_key(&self) -> Option<&str> {
        [CanonicalField::Bib, CanonicalField::FullName]
            .into_iter()
            .filter_map(|f| self.get(f))
            .find(|v| !v.is_empty())
    }
}

impl<const N: usize> From<[(CanonicalField, &str); N]> for NormalizedRow {
    fn from(pairs: [(CanonicalField, &str); N]) -> Self {
        let mut row = Self::new();
        for (field, value) in pairs {
            row.insert(field, value);
        }
        row
    }
}

/// The terminal, ordered set of extracted rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResultSet {
    rows: Vec<NormalizedRow>,
}

impl ResultSet {
    /// Wrap rows that are already in their final order.
    pub fn from_rows(rows: Vec<NormalizedRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[NormalizedRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NormalizedRow> {
        self.rows.iter()
    }
}

impl IntoIterator for ResultSet {
    type Item = NormalizedRow;
    type IntoIter = std::vec::IntoIter<NormalizedRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a NormalizedRow;
    type IntoIter = std::slice::Iter<'a, NormalizedRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
