//! Locates arrays of participant records inside arbitrary JSON.

use serde_json::Value;

use crate::scorer::{CANDIDATE_THRESHOLD, score_result_array};

/// Default recursion limit for [`find_result_arrays`].
pub const DEFAULT_MAX_DEPTH: usize = 5;

/// Why an array reached by the finder is not a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArraySkip {
    /// Empty, or its first element is not an object.
    NotObjects,
    /// Score at or below [`CANDIDATE_THRESHOLD`].
    BelowThreshold(i32),
    /// Nested deeper than the depth limit.
    TooDeep,
}

/// Collect every array in `value` that scores above the candidate threshold.
///
/// Objects are walked depth-first in source key order. Arrays are scored but
/// never descended into. Branches deeper than `max_depth` yield nothing.
pub fn find_result_arrays(value: &Value, max_depth: usize) -> Vec<&[Value]> {
    scan_arrays(value, max_depth)
        .into_iter()
        .filter_map(Result::ok)
        .collect()
}

/// Every array the finder reaches, in traversal order, with its outcome.
pub fn scan_arrays(value: &Value, max_depth: usize) -> Vec<Result<&[Value], ArraySkip>> {
    let mut outcomes = Vec::new();
    visit(value, 0, max_depth, &mut outcomes);
    outcomes
}

fn visit<'a>(
    value: &'a Value,
    depth: usize,
    max_depth: usize,
    out: &mut Vec<Result<&'a [Value], ArraySkip>>,
) {
    match value {
        Value::Array(_) if depth > max_depth => {
            tracing::trace!(depth, "array beyond depth limit");
            out.push(Err(ArraySkip::TooDeep));
        }
        Value::Array(items) => {
            if !matches!(items.first(), Some(Value::Object(_))) {
                out.push(Err(ArraySkip::NotObjects));
                return;
            }
            let score = score_result_array(items);
            if score > CANDIDATE_THRESHOLD {
                out.push(Ok(items.as_slice()));
            } else {
                tracing::trace!(score, len = items.len(), depth, "array below threshold");
                out.push(Err(ArraySkip::BelowThreshold(score)));
            }
        }
        Value::Object(map) if depth <= max_depth => {
            for child in map.values() {
                if child.is_array() || child.is_object() {
                    visit(child, depth + 1, max_depth, out);
                }
            }
        }
        _ => {}
    }
}
