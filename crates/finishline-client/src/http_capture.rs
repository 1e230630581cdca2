use finishline_core::error::AppError;
use finishline_core::models::{CapturedPage, RawPayload, is_json_content_type};
use finishline_core::traits::PageCapture;
use finishline_core::CaptureConfig;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;

use crate::html::parse_html_tables;

pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (compatible; finishline/0.1; +race-results)";

/// Plain HTTP capture using reqwest.
///
/// Does not run JavaScript: a JSON endpoint yields one payload, a
/// server-rendered page yields its tables. Use [`crate::BrowserCapture`]
/// (feature `browser`) for single-page apps.
#[derive(Clone)]
pub struct HttpCapture {
    client: Client,
    timeout_secs: u64,
    min_body_bytes: usize,
}

impl HttpCapture {
    pub fn new() -> Result<Self, AppError> {
        Self::with_config(&CaptureConfig::default())
    }

    pub fn with_config(config: &CaptureConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            timeout_secs: config.timeout.as_secs(),
            min_body_bytes: config.min_body_bytes,
        })
    }
}

impl PageCapture for HttpCapture {
    async fn capture(&self, url: &str) -> Result<CapturedPage, AppError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout_secs)
            } else if e.is_connect() {
                AppError::NetworkError(format!("Connection failed: {e}"))
            } else {
                AppError::HttpError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpError(format!(
                "HTTP {} for {}",
                status.as_u16(),
                url
            )));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let body = response
            .text()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to read response body: {e}")))?;

        tracing::debug!(bytes = body.len(), %content_type, "Fetched {}", url);

        Ok(page_from_response(
            url,
            status.as_u16(),
            &content_type,
            &body,
            self.min_body_bytes,
        ))
    }
}

/// Turn a single HTTP response into a captured page.
fn page_from_response(
    url: &str,
    status: u16,
    content_type: &str,
    body: &str,
    min_body_bytes: usize,
) -> CapturedPage {
    let mut page = CapturedPage {
        url: url.to_string(),
        ..CapturedPage::default()
    };

    if is_json_content_type(content_type) {
        page.payloads
            .extend(RawPayload::from_body(url, status, body, min_body_bytes));
    } else {
        page.tables = parse_html_tables(body);
    }

    page
}
