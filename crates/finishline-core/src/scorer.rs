//! Scores how "results-like" a JSON array looks.

use std::collections::HashSet;

use serde_json::Value;

use crate::fields::{MODERATE_KEYS, STRONG_KEYS};

/// Arrays must score strictly above this to count as candidates.
pub const CANDIDATE_THRESHOLD: i32 = 2;

/// Score an array by the keys of its first element and by its length.
///
/// Only `array[0]` is sampled. Returns 0 for an empty array or one whose
/// first element is not an object.
pub fn score_result_array(array: &[Value]) -> i32 {
    let Some(Value::Object(sample)) = array.first() else {
        return 0;
    };

    let keys: HashSet<String> = sample.keys().map(|k| k.to_lowercase()).collect();

    let strong = STRONG_KEYS.iter().filter(|k| keys.contains(**k)).count() as i32;
    let moderate = MODERATE_KEYS.iter().filter(|k| keys.contains(**k)).count() as i32;

    let mut score = strong * 2 + moderate;
    if array.len() > 20 {
        score += 2;
    }
    if array.len() > 100 {
        score += 2;
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn repeat(item: Value, n: usize) -> Vec<Value> {
        vec![item; n]
    }

    #[test]
    fn test_empty_and_non_object_arrays_score_zero() {
        assert_eq!(score_result_array(&[]), 0);
        assert_eq!(score_result_array(&[json!(1), json!({"bib": 1})]), 0);
    }

    #[test]
    fn test_strong_and_moderate_keys() {
        let arr = [json!({"bibno": "101", "chip_time": "00:45:12", "first_name": "Asha"})];
        assert_eq!(score_result_array(&arr), 5);
    }

    #[test]
    fn test_keys_are_case_insensitive() {
        let arr = [json!({"BIB": "1", "Overall_Rank": "2"})];
        assert_eq!(score_result_array(&arr), 4);
    }

    #[test]
    fn test_unknown_keys_score_nothing() {
        let arr = [json!({"title": "ad", "href": "/promo", "image": "x.png"})];
        assert_eq!(score_result_array(&arr), 0);
    }

    #[test]
    fn test_length_bonus_boundaries() {
        let item = json!({"name": "x"});
        assert_eq!(score_result_array(&repeat(item.clone(), 20)), 1);
        assert_eq!(score_result_array(&repeat(item.clone(), 21)), 3);
        assert_eq!(score_result_array(&repeat(item.clone(), 100)), 3);
        assert_eq!(score_result_array(&repeat(item, 101)), 5);
    }

    #[test]
    fn test_adding_strong_key_never_decreases_score() {
        let base = json!({"name": "x", "city": "Pune"});
        let before = score_result_array(&[base.clone()]);
        for key in STRONG_KEYS {
            let mut extended = base.clone();
            extended[*key] = json!("1");
            assert!(score_result_array(&[extended]) >= before, "key {key}");
        }
    }

    #[test]
    fn test_only_first_element_is_sampled() {
        let arr = [json!({"misc": 1}), json!({"bibno": 1, "chip_time": 2})];
        assert_eq!(score_result_array(&arr), 0);
    }
}
