pub mod config;
pub mod dedup;
pub mod error;
pub mod extract;
pub mod fields;
pub mod finder;
pub mod models;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod platform;
pub mod scorer;
pub mod table;
pub mod testutil;
pub mod traits;

pub use config::CaptureConfig;
pub use dedup::{DuplicateRow, deduplicate_checked, deduplicate_results};
pub use error::AppError;
pub use extract::{Extraction, ExtractionSource, ResultsExtractor, Strategy};
pub use fields::CanonicalField;
pub use finder::{ArraySkip, find_result_arrays, scan_arrays};
pub use models::{CapturedPage, NormalizedRow, RawPayload, RenderedTable, ResultSet};
pub use normalize::normalize_result_row;
pub use output::{default_output_name, ordered_columns, write_csv, write_csv_file};
pub use pipeline::ResultsPipeline;
pub use platform::{Platform, detect_platform};
pub use scorer::score_result_array;
pub use table::extract_table_rows;
pub use traits::PageCapture;
