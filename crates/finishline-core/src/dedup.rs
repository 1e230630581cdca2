use std::collections::HashSet;

use crate::models::{NormalizedRow, ResultSet};

/// A row dropped because an earlier row had the same dedup key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateRow {
    /// Position of the dropped row in the input.
    pub index: usize,
    pub key: String,
}

/// Drop rows whose dedup key was already seen, keeping the first occurrence.
///
/// Rows without a usable key (both bib and full name missing or empty) are
/// always kept.
pub fn deduplicate_results(rows: Vec<NormalizedRow>) -> ResultSet {
    let (results, dropped) = deduplicate_checked(rows);
    if !dropped.is_empty() {
        tracing::debug!(
            dropped = dropped.len(),
            kept = results.len(),
            "Removed duplicate rows"
        );
    }
    results
}

/// Like [`deduplicate_results`] but also reports each dropped row.
pub fn deduplicate_checked(rows: Vec<NormalizedRow>) -> (ResultSet, Vec<DuplicateRow>) {
    let mut seen: HashSet<String> = HashSet::new();
    let mut unique = Vec::with_capacity(rows.len());
    let mut dropped = Vec::new();

    for (index, row) in rows.into_iter().enumerate() {
        let duplicate = row
            .dedup_key()
            .filter(|key| !seen.insert(key.to_string()))
            .map(str::to_string);
        if let Some(key) = duplicate {
            dropped.push(DuplicateRow { index, key });
            continue;
        }
        unique.push(row);
    }

    (ResultSet::from_rows(unique), dropped)
}
