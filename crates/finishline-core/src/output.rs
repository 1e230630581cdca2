//! Column ordering and CSV output.

use std::collections::BTreeSet;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDateTime;

use crate::error::AppError;
use crate::fields::{COLUMN_ORDER, CanonicalField};
use crate::models::ResultSet;

/// Compute the output columns for a result set.
///
/// Preferred fields present in any row come first, in preferred order,
/// followed by every other present field in lexicographic order.
pub fn ordered_columns(results: &ResultSet) -> Vec<CanonicalField> {
    let present: BTreeSet<CanonicalField> = results.iter().flat_map(|row| row.fields()).collect();

    let mut columns: Vec<CanonicalField> = COLUMN_ORDER
        .iter()
        .copied()
        .filter(|f| present.contains(f))
        .collect();

    let mut extras: Vec<CanonicalField> =
        present.into_iter().filter(|f| !f.is_preferred()).collect();
    extras.sort_by_key(|f| f.as_str());

    columns.extend(extras);
    columns
}

/// Write the result set as CSV. An empty set writes nothing.
///
/// Returns the number of data rows written.
pub fn write_csv<W: Write>(results: &ResultSet, writer: W) -> Result<usize, AppError> {
    if results.is_empty() {
        return Ok(0);
    }

    let columns = ordered_columns(results);
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(columns.iter().map(|c| c.as_str()))?;
    for row in results {
        csv_writer.write_record(columns.iter().map(|c| row.get(*c).unwrap_or("")))?;
    }
    csv_writer.flush()?;

    Ok(results.len())
}

/// Write the result set to a new file at `path`.
pub fn write_csv_file(results: &ResultSet, path: &Path) -> Result<usize, AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::OutputError(format!("Failed to create {}: {e}", path.display()))
    })?;
    let written = write_csv(results, file)?;
    tracing::info!(rows = written, path = %path.display(), "CSV written");
    Ok(written)
}

/// Replace every character outside `[A-Za-z0-9_-]` with `_`.
pub fn sanitize_name(query: &str) -> String {
    query
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Default output filename: `<sanitized-query>_results_<YYYYMMDD_HHMMSS>.csv`.
pub fn default_output_name(query: &str, now: NaiveDateTime) -> String {
    format!(
        "{}_results_{}.csv",
        sanitize_name(query),
        now.format("%Y%m%d_%H%M%S")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::CanonicalField as F;
    use crate::models::NormalizedRow;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn to_string(results: &ResultSet) -> String {
        let mut buf = Vec::new();
        write_csv(results, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_preferred_columns_then_extras() {
        let results = ResultSet::from_rows(vec![
            NormalizedRow::from([(F::ChipTime, "00:40:00"), (F::Age, "31")]),
            NormalizedRow::from([(F::Bib, "7"), (F::Club, "Striders")]),
        ]);
        assert_eq!(
            ordered_columns(&results),
            [F::Bib, F::Club, F::ChipTime, F::Age]
        );
    }

    #[test]
    fn test_column_order_independent_of_row_order() {
        let a = NormalizedRow::from([(F::GenderRank, "1"), (F::Age, "30")]);
        let b = NormalizedRow::from([(F::FirstName, "Asha"), (F::Bib, "1")]);
        let forward = ResultSet::from_rows(vec![a.clone(), b.clone()]);
        let backward = ResultSet::from_rows(vec![b, a]);
        assert_eq!(ordered_columns(&forward), ordered_columns(&backward));
    }

    #[test]
    fn test_missing_cells_are_empty() {
        let results = ResultSet::from_rows(vec![
            NormalizedRow::from([(F::Bib, "1"), (F::FullName, "Asha Rao")]),
            NormalizedRow::from([(F::Bib, "2"), (F::ChipTime, "00:41:00")]),
        ]);
        assert_eq!(
            to_string(&results),
            "bib,full_name,chip_time\n1,Asha Rao,\n2,,00:41:00\n"
        );
    }

    #[test]
    fn test_fields_are_quoted() {
        let results = ResultSet::from_rows(vec![NormalizedRow::from([
            (F::Bib, "1"),
            (F::FullName, "Rao, Asha \"AR\""),
        ])]);
        assert_eq!(
            to_string(&results),
            "bib,full_name\n1,\"Rao, Asha \"\"AR\"\"\"\n"
        );
    }

    #[test]
    fn test_empty_set_writes_nothing() {
        assert_eq!(to_string(&ResultSet::default()), "");
    }

    #[test]
    fn test_write_csv_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("out.csv");
        let results = ResultSet::from_rows(vec![NormalizedRow::from([(F::Bib, "9")])]);

        assert_eq!(write_csv_file(&results, &path).unwrap(), 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "bib\n9\n");
    }

    #[test]
    fn test_write_csv_file_bad_path() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("missing").join("out.csv");
        let results = ResultSet::from_rows(vec![NormalizedRow::from([(F::Bib, "9")])]);

        let err = write_csv_file(&results, &path).unwrap_err();
        assert!(matches!(err, AppError::OutputError(_)));
    }

    #[test]
    fn test_sanitize_and_default_name() {
        assert_eq!(
            sanitize_name("2025 Bengaluru 10K Challenge!"),
            "2025_Bengaluru_10K_Challenge_"
        );
        assert_eq!(sanitize_name("tcs-world_10k"), "tcs-world_10k");
        assert_eq!(sanitize_name("Café"), "Caf_");

        let now = NaiveDate::from_ymd_opt(2025, 5, 18)
            .unwrap()
            .and_hms_opt(7, 3, 9)
            .unwrap();
        assert_eq!(
            default_output_name("TCS World 10K", now),
            "TCS_World_10K_results_20250518_070309.csv"
        );
    }
}
