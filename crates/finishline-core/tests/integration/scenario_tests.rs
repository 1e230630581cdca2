use finishline_core::fields::CanonicalField as F;
use finishline_core::testutil::make_payload;
use finishline_core::{
    CapturedPage, ExtractionSource, NormalizedRow, ResultsExtractor, find_result_arrays,
    normalize_result_row, score_result_array, write_csv,
};
use serde_json::json;

fn scenario_a_array() -> serde_json::Value {
    json!([
        {"bibno": "101", "first_name": "Asha", "last_name": "Rao", "finished_time": "00:45:12", "overall_rank": "3"},
        {"bibno": "102", "full_name": "Dev Kumar", "chip_time": "00:46:01", "overall_rank": "4"}
    ])
}

#[test]
fn scenario_a_normalizes_and_orders_columns() {
    let data = scenario_a_array();
    let items = data.as_array().unwrap();
    assert!(score_result_array(items) >= 7);

    let page = CapturedPage {
        url: "https://results.example.com/race".into(),
        payloads: vec![make_payload("https://results.example.com/api", data.clone())],
        tables: vec![],
    };
    let extraction = ResultsExtractor::new().extract(&page, None);
    assert_eq!(extraction.source, ExtractionSource::Json);

    let rows = extraction.results.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(
        rows[0],
        NormalizedRow::from([
            (F::Bib, "101"),
            (F::FirstName, "Asha"),
            (F::LastName, "Rao"),
            (F::FullName, "Asha Rao"),
            (F::ChipTime, "00:45:12"),
            (F::OverallRank, "3"),
        ])
    );
    assert_eq!(
        rows[1],
        NormalizedRow::from([
            (F::Bib, "102"),
            (F::FullName, "Dev Kumar"),
            (F::ChipTime, "00:46:01"),
            (F::OverallRank, "4"),
        ])
    );

    let mut buf = Vec::new();
    write_csv(&extraction.results, &mut buf).unwrap();
    let csv = String::from_utf8(buf).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next(),
        Some("bib,full_name,first_name,last_name,chip_time,overall_rank")
    );
    assert_eq!(lines.next(), Some("101,Asha Rao,Asha,Rao,00:45:12,3"));
    assert_eq!(lines.next(), Some("102,Dev Kumar,,,00:46:01,4"));
    assert_eq!(lines.next(), None);
}

#[test]
fn scenario_b_first_processed_array_wins() {
    let data = json!({
        "latest": [
            {"bibno": "101", "full_name": "Asha Rao", "chip_time": "00:45:12"}
        ],
        "archive": [
            {"bibno": "101", "full_name": "Asha Rao", "chip_time": "00:47:30"},
            {"bibno": "103", "full_name": "Ravi Shah", "chip_time": "00:49:00"}
        ]
    });
    assert_eq!(find_result_arrays(&data, 5).len(), 2);

    let page = CapturedPage {
        url: "https://results.example.com/race".into(),
        payloads: vec![make_payload("https://results.example.com/api", data)],
        tables: vec![],
    };
    let results = ResultsExtractor::new().extract(&page, None).results;

    assert_eq!(results.len(), 2);
    assert_eq!(results.rows()[0].get(F::ChipTime), Some("00:45:12"));
    assert_eq!(results.rows()[1].get(F::Bib), Some("103"));
}

#[test]
fn scenario_d_identity_less_objects_never_surface() {
    let item = json!({"club": "Runners Co", "city": "Pune"});
    assert!(normalize_result_row(item.as_object().unwrap()).is_none());

    let data = json!({"results": [
        {"bibno": "1", "full_name": "A", "rank": 1},
        {"club": "Runners Co", "city": "Pune"}
    ]});
    let page = CapturedPage {
        url: "https://x".into(),
        payloads: vec![make_payload("https://x/api", data)],
        tables: vec![],
    };
    let results = ResultsExtractor::new().extract(&page, None).results;
    assert_eq!(results.len(), 1);
    assert!(results.iter().all(NormalizedRow::has_identity));
}

#[test]
fn json_results_hold_identity_and_unique_keys() {
    let runners: Vec<_> = (0..150)
        .map(|i| {
            json!({
                "bib_number": format!("{}", i % 120),
                "runner_name": format!("Runner {}", i % 120),
                "gun_time": "01:00:00",
            })
        })
        .collect();
    let data = json!({"meta": {"count": 150}, "payload": {"entries": runners}});
    let page = CapturedPage {
        url: "https://x".into(),
        payloads: vec![make_payload("https://x/api", data)],
        tables: vec![],
    };
    let results = ResultsExtractor::new().extract(&page, None).results;

    assert_eq!(results.len(), 120);
    let mut keys: Vec<_> = results.iter().filter_map(|r| r.dedup_key()).collect();
    assert!(results.iter().all(NormalizedRow::has_identity));
    let total = keys.len();
    keys.sort_unstable();
    keys.dedup();
    assert_eq!(keys.len(), total);
}
