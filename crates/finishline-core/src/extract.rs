use std::cmp::Reverse;

use serde_json::Value;

use crate::dedup::deduplicate_results;
use crate::finder::{DEFAULT_MAX_DEPTH, find_result_arrays};
use crate::models::{CapturedPage, NormalizedRow, RawPayload, ResultSet};
use crate::normalize::{RowRejection, normalize_value};
use crate::platform::Platform;
use crate::table::extract_table_rows;

/// Raw keys an STS item must carry (at least one) to be normalized.
pub const STS_REQUIRED_KEYS: &[&str] = &["bibno", "bib_no", "first_name", "finished_time", "gun_time"];

/// How captured payloads are turned into rows for a given platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Sports Timing Solutions: only items with a known STS key.
    Sts,
    /// MySamay: every object item, arrival order.
    MySamay,
    /// Everything else: largest payload first.
    Generic,
}

impl Strategy {
    pub fn for_platform(platform: Option<Platform>) -> Self {
        match platform {
            Some(Platform::SportsTimingSolutions) => Strategy::Sts,
            Some(Platform::MySamay) => Strategy::MySamay,
            _ => Strategy::Generic,
        }
    }

    fn accepts(self, item: &Value) -> bool {
        match self {
            Strategy::Sts => item
                .as_object()
                .is_some_and(|map| STS_REQUIRED_KEYS.iter().any(|k| map.contains_key(*k))),
            Strategy::MySamay | Strategy::Generic => item.is_object(),
        }
    }
}

/// Where the final rows came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionSource {
    Json,
    Dom,
    Empty,
}

/// Result of running the extraction pipeline on one captured page.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub results: ResultSet,
    pub source: ExtractionSource,
}

/// Run a strategy over captured JSON payloads and deduplicate the rows.
pub fn extract_json_rows(payloads: &[RawPayload], strategy: Strategy, max_depth: usize) -> ResultSet {
    let mut ordered: Vec<&RawPayload> = payloads.iter().collect();
    if strategy == Strategy::Generic {
        ordered.sort_by_key(|p| Reverse(p.byte_size));
    }

    let mut rows: Vec<NormalizedRow> = Vec::new();
    for payload in ordered {
        for candidate in find_result_arrays(&payload.json_value, max_depth) {
            let before = rows.len();
            let mut rejected = 0usize;
            for item in candidate.iter().filter(|item| strategy.accepts(item)) {
                match normalize_value(item) {
                    Ok(row) => rows.push(row),
                    Err(RowRejection::MissingIdentity | RowRejection::NotAnObject) => rejected += 1,
                }
            }
            tracing::debug!(
                url = %payload.source_url,
                items = candidate.len(),
                rows = rows.len() - before,
                rejected,
                "Normalized candidate array"
            );
        }
    }

    deduplicate_results(rows)
}

/// Turns captured pages into result sets.
///
/// JSON payloads are tried first; rendered tables are only consulted when
/// the JSON path yields no rows.
#[derive(Debug, Clone)]
pub struct ResultsExtractor {
    max_depth: usize,
}

impl Default for ResultsExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultsExtractor {
    pub fn new() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Override the JSON traversal depth limit.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn extract(&self, page: &CapturedPage, platform: Option<Platform>) -> Extraction {
        let strategy = Strategy::for_platform(platform);
        tracing::info!(
            payloads = page.payloads.len(),
            ?strategy,
            "Extracting rows from captured JSON"
        );

        let results = extract_json_rows(&page.payloads, strategy, self.max_depth);
        if !results.is_empty() {
            tracing::info!(rows = results.len(), "Extracted rows from JSON payloads");
            return Extraction {
                results,
                source: ExtractionSource::Json,
            };
        }

        tracing::info!(
            tables = page.tables.len(),
            "No rows in JSON payloads, falling back to DOM tables"
        );
        let rows = extract_table_rows(&page.tables);
        if rows.is_empty() {
            return Extraction {
                results: ResultSet::default(),
                source: ExtractionSource::Empty,
            };
        }

        let results = deduplicate_results(rows);
        tracing::info!(rows = results.len(), "Extracted rows from DOM tables");
        Extraction {
            results,
            source: ExtractionSource::Dom,
        }
    }
}
