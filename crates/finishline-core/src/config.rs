use std::time::Duration;

use crate::error::AppError;
use crate::models::DEFAULT_MIN_BODY_BYTES;

/// Default search endpoint used for results-page discovery.
pub const DEFAULT_SEARCH_URL: &str = "https://www.google.com/search";

/// Settings for page capture and discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureConfig {
    /// Navigation timeout for a results page.
    pub timeout: Duration,
    /// Wait after navigation before reading captured responses.
    pub settle: Duration,
    /// How many times to scroll to the bottom to trigger lazy loading.
    pub scroll_passes: u32,
    /// Maximum clicks on a single pagination / "load more" control.
    pub max_clicks: u32,
    /// Responses with bodies this size or smaller are ignored.
    pub min_body_bytes: usize,
    pub search_url: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            settle: Duration::from_millis(3000),
            scroll_passes: 3,
            max_clicks: 10,
            min_body_bytes: DEFAULT_MIN_BODY_BYTES,
            search_url: DEFAULT_SEARCH_URL.to_string(),
        }
    }
}

impl CaptureConfig {
    /// Read configuration from environment variables.
    ///
    /// - `FINISHLINE_TIMEOUT_SECS` (optional, defaults to 30, at least 1)
    /// - `FINISHLINE_SETTLE_MS` (optional, defaults to 3000)
    /// - `FINISHLINE_SCROLL_PASSES` (optional, defaults to 3)
    /// - `FINISHLINE_MAX_CLICKS` (optional, defaults to 10)
    /// - `FINISHLINE_MIN_BODY_BYTES` (optional, defaults to 50)
    /// - `FINISHLINE_SEARCH_URL` (optional)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let defaults = Self::default();

        let timeout_secs: u64 = parse_var(&lookup, "FINISHLINE_TIMEOUT_SECS", 30)?;
        if timeout_secs == 0 {
            return Err(AppError::ConfigError(
                "FINISHLINE_TIMEOUT_SECS must be at least 1".into(),
            ));
        }
        let settle_ms: u64 = parse_var(&lookup, "FINISHLINE_SETTLE_MS", 3000)?;

        Ok(Self {
            timeout: Duration::from_secs(timeout_secs),
            settle: Duration::from_millis(settle_ms),
            scroll_passes: parse_var(&lookup, "FINISHLINE_SCROLL_PASSES", defaults.scroll_passes)?,
            max_clicks: parse_var(&lookup, "FINISHLINE_MAX_CLICKS", defaults.max_clicks)?,
            min_body_bytes: parse_var(
                &lookup,
                "FINISHLINE_MIN_BODY_BYTES",
                defaults.min_body_bytes,
            )?,
            search_url: lookup("FINISHLINE_SEARCH_URL").unwrap_or(defaults.search_url),
        })
    }

    /// Replace the navigation timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
    default: T,
) -> Result<T, AppError> {
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| {
            AppError::ConfigError(format!(
                "Invalid {name} '{raw}': must be a non-negative integer"
            ))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = CaptureConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CaptureConfig::default());
        assert_eq!(config.min_body_bytes, 50);
    }

    #[test]
    fn test_overrides() {
        let config = CaptureConfig::from_lookup(lookup(&[
            ("FINISHLINE_TIMEOUT_SECS", "45"),
            ("FINISHLINE_SETTLE_MS", "500"),
            ("FINISHLINE_MAX_CLICKS", " 2 "),
            ("FINISHLINE_SEARCH_URL", "https://duckduckgo.com/html/"),
        ]))
        .unwrap();
        assert_eq!(config.timeout, Duration::from_secs(45));
        assert_eq!(config.settle, Duration::from_millis(500));
        assert_eq!(config.max_clicks, 2);
        assert_eq!(config.scroll_passes, 3);
        assert_eq!(config.search_url, "https://duckduckgo.com/html/");
    }

    #[test]
    fn test_invalid_values() {
        let err = CaptureConfig::from_lookup(lookup(&[("FINISHLINE_SCROLL_PASSES", "many")]))
            .unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
        assert!(err.to_string().contains("FINISHLINE_SCROLL_PASSES"));

        let err =
            CaptureConfig::from_lookup(lookup(&[("FINISHLINE_TIMEOUT_SECS", "0")])).unwrap_err();
        assert!(matches!(err, AppError::ConfigError(_)));
    }
}
