use finishline_core::fields::CanonicalField as F;
use finishline_core::testutil::{MockCapture, make_payload, make_table};
use finishline_core::{
    CapturedPage, ExtractionSource, NormalizedRow, ResultsPipeline, extract_table_rows,
    ordered_columns,
};
use serde_json::json;

#[test]
fn scenario_c_dom_fallback_skips_sponsor_table() {
    let tables = vec![
        make_table(
            &["Bib", "Name", "Finish Time"],
            &[&["55", "Ravi Shah", "01:02:33"], &["56", "Meera Iyer", "01:04:10"]],
        ),
        make_table(
            &["Sponsor", "Logo"],
            &[&["Acme Shoes", "acme.png"], &["Hydra Drinks", "hydra.png"]],
        ),
    ];

    let rows = extract_table_rows(&tables);

    assert_eq!(rows.len(), 2);
    assert_eq!(
        rows[0],
        NormalizedRow::from([
            (F::Bib, "55"),
            (F::FullName, "Ravi Shah"),
            (F::ChipTime, "01:02:33"),
        ])
    );
}

#[test]
fn single_data_row_table_is_too_short() {
    let tables = vec![make_table(
        &["Bib", "Name", "Finish Time"],
        &[&["55", "Ravi Shah", "01:02:33"]],
    )];
    assert!(extract_table_rows(&tables).is_empty());
}

#[tokio::test]
async fn pipeline_falls_back_when_json_has_no_results() {
    let page = CapturedPage {
        url: "https://timingindia.com/event/42".into(),
        payloads: vec![
            make_payload(
                "https://timingindia.com/api/menu",
                json!({"items": [{"label": "Home", "href": "/"}, {"label": "Events", "href": "/events"}]}),
            ),
            make_payload(
                "https://timingindia.com/api/sponsors",
                json!([{"name": "Acme"}, {"name": "Hydra"}]),
            ),
        ],
        tables: vec![make_table(
            &["Pos", "Bib No", "Runner Name", "Gun Time", "Net Time", "Category"],
            &[
                &["1", "501", "Kiran Rao", "00:35:10", "00:35:02", "M 18-35"],
                &["2", "502", "Sana Ali", "00:36:44", "00:36:40", "F 18-35"],
            ],
        )],
    };
    let pipeline = ResultsPipeline::new(MockCapture::new(page));

    let extraction = pipeline
        .run("https://timingindia.com/event/42", None)
        .await
        .unwrap();

    assert_eq!(extraction.source, ExtractionSource::Dom);
    let row = &extraction.results.rows()[1];
    assert_eq!(row.get(F::OverallRank), Some("2"));
    assert_eq!(row.get(F::Bib), Some("502"));
    assert_eq!(row.get(F::FullName), Some("Sana Ali"));
    assert_eq!(row.get(F::GunTime), Some("00:36:44"));
    assert_eq!(row.get(F::ChipTime), Some("00:36:40"));
    assert_eq!(row.get(F::Category), Some("F 18-35"));

    assert_eq!(
        ordered_columns(&extraction.results),
        [
            F::Bib,
            F::FullName,
            F::Category,
            F::ChipTime,
            F::GunTime,
            F::OverallRank
        ]
    );
}
