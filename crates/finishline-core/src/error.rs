use thiserror::Error;

/// Application-wide error types for finishline.
///
/// The extraction engine itself never returns these; they belong to the
/// capture, discovery and output layers around it.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP request failed (fetching a page or search results).
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Headless browser failed to launch, navigate or answer a CDP command.
    #[error("Browser error: {0}")]
    BrowserError(String),

    /// Page load timed out.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Network/connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// No results page could be found for a race name.
    #[error("Discovery error: {0}")]
    DiscoveryError(String),

    /// Writing the result file failed.
    #[error("Output error: {0}")]
    OutputError(String),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// JSON serialization/deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Generic error.
    #[error("{0}")]
    Generic(String),
}

impl From<csv::Error> for AppError {
    fn from(e: csv::Error) -> Self {
        AppError::OutputError(e.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(e: std::io::Error) -> Self {
        AppError::OutputError(e.to_string())
    }
}

impl AppError {
    /// Returns true if this error is transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::NetworkError(_) | AppError::Timeout(_) => true,
            AppError::HttpError(msg) | AppError::BrowserError(msg) => {
                msg.contains("timeout") || msg.contains("connect") || msg.contains("reset")
            }
            _ => false,
        }
    }
}
