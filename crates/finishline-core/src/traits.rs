use std::future::Future;

use crate::error::AppError;
use crate::models::CapturedPage;

/// Loads a results page and records what it produced.
///
/// Implementations return JSON payloads in arrival order, already filtered
/// to JSON content types, bodies over the size floor and valid JSON, plus
/// the page's tables in document order.
pub trait PageCapture: Send + Sync {
    fn capture(&self, url: &str) -> impl Future<Output = Result<CapturedPage, AppError>> + Send;
}
