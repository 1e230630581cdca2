//! Test utilities: mock implementations of the core traits.
//!
//! Handwritten mocks for dependency injection in unit tests. State lives in
//! `Arc<Mutex<_>>` so tests can assert on recorded calls.

use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::models::{CapturedPage, RawPayload, RenderedTable};
use crate::traits::PageCapture;

// ---------------------------------------------------------------------------
// MockCapture
// ---------------------------------------------------------------------------

/// Mock capture that replays queued pages and records requested URLs.
#[derive(Clone, Default)]
pub struct MockCapture {
    /// Queue of responses. Each call pops the first element.
    /// If empty, returns a page with nothing captured.
    responses: Arc<Mutex<Vec<Result<CapturedPage, AppError>>>>,
    pub requested: Arc<Mutex<Vec<String>>>,
}

impl MockCapture {
    pub fn new(page: CapturedPage) -> Self {
        Self::with_responses(vec![Ok(page)])
    }

    pub fn with_error(error: AppError) -> Self {
        Self::with_responses(vec![Err(error)])
    }

    pub fn with_responses(responses: Vec<Result<CapturedPage, AppError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            requested: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl PageCapture for MockCapture {
    async fn capture(&self, url: &str) -> Result<CapturedPage, AppError> {
        self.requested.lock().unwrap().push(url.to_string());
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(CapturedPage {
                url: url.to_string(),
                ..CapturedPage::default()
            })
        } else {
            responses.remove(0)
        }
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A payload whose byte size is the length of its serialized JSON.
pub fn make_payload(url: &str, json_value: serde_json::Value) -> RawPayload {
    RawPayload {
        source_url: url.to_string(),
        status: 200,
        byte_size: json_value.to_string().len(),
        json_value,
    }
}

/// A table from string slices; headers are passed through as given.
pub fn make_table(headers: &[&str], rows: &[&[&str]]) -> RenderedTable {
    RenderedTable {
        headers: headers.iter().map(|h| h.to_string()).collect(),
        rows: rows
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect(),
    }
}
