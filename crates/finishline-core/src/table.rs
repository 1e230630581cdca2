//! Fallback extraction of result rows from rendered HTML tables.
//!
//! Used only when no JSON payload produced a row. Headers are matched
//! against the same mapping table as the JSON path, then against an ordered
//! fuzzy cascade.

use std::collections::BTreeMap;

use crate::fields::{CanonicalField, RESULTS_KEYWORDS, fuzzy_header_field, lookup_field_substring};
use crate::models::{NormalizedRow, RenderedTable};

/// Minimum total rows (header included) for a table to be considered.
pub const MIN_TABLE_ROWS: usize = 3;

/// Why a table was not used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableSkip {
    /// Fewer than a header and two body rows.
    TooFewRows,
    /// No header cells at all.
    NoHeaders,
    /// Header text has none of the results keywords.
    NotResultsLike,
}

/// Column index to canonical field, for the columns that matched.
pub type HeaderMap = BTreeMap<usize, CanonicalField>;

/// Map one header cell to a canonical field.
pub fn map_header(header: &str) -> Option<CanonicalField> {
    let header = header.trim().to_lowercase();
    lookup_field_substring(&header.replace(' ', "_")).or_else(|| fuzzy_header_field(&header))
}

/// Build the column map for a table's headers.
pub fn build_header_map(headers: &[String]) -> HeaderMap {
    headers
        .iter()
        .enumerate()
        .filter_map(|(i, h)| map_header(h).map(|field| (i, field)))
        .collect()
}

/// Whether the joined header text looks like a results table.
pub fn is_results_header(headers: &[String]) -> bool {
    let joined = headers
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");
    RESULTS_KEYWORDS.iter().any(|kw| joined.contains(kw))
}

/// Extract rows from a single table, or report why it was skipped.
pub fn extract_table_checked(table: &RenderedTable) -> Result<Vec<NormalizedRow>, TableSkip> {
    if table.rows.len() + 1 < MIN_TABLE_ROWS {
        return Err(TableSkip::TooFewRows);
    }
    if table.headers.is_empty() {
        return Err(TableSkip::NoHeaders);
    }
    if !is_results_header(&table.headers) {
        return Err(TableSkip::NotResultsLike);
    }

    let header_map = build_header_map(&table.headers);

    let rows = table
        .rows
        .iter()
        .filter(|cells| !cells.is_empty())
        .filter_map(|cells| {
            let mut row = NormalizedRow::new();
            for (i, cell) in cells.iter().enumerate() {
                if let Some(field) = header_map.get(&i) {
                    row.insert(*field, cell.trim());
                }
            }
            (!row.is_empty()).then_some(row)
        })
        .collect();

    Ok(rows)
}

/// Extract rows from every usable table, in document order.
///
/// Rows are not identity-checked; deduplication is left to the caller.
pub fn extract_table_rows(tables: &[RenderedTable]) -> Vec<NormalizedRow> {
    let mut results = Vec::new();
    for (index, table) in tables.iter().enumerate() {
        match extract_table_checked(table) {
            Ok(rows) => {
                tracing::debug!(index, rows = rows.len(), "Extracted rows from table");
                results.extend(rows);
            }
            Err(reason) => tracing::debug!(index, ?reason, "Skipped table"),
        }
    }
    results
}
