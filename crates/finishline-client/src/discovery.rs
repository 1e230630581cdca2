//! Best-effort discovery of a results page from a race name.

use std::collections::HashSet;

use finishline_core::error::AppError;
use finishline_core::platform::{PLATFORMS, Platform, detect_platform};
use finishline_core::CaptureConfig;
use reqwest::Client;
use url::Url;

use crate::html::extract_links;
use crate::http_capture::USER_AGENT;

/// A possible results page on a known platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub url: String,
    pub platform: Platform,
}

/// Finds results pages by scraping a web search for the race name.
#[derive(Clone)]
pub struct SearchDiscovery {
    client: Client,
    search_url: String,
}

impl SearchDiscovery {
    pub fn new(config: &CaptureConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            search_url: config.search_url.clone(),
        })
    }

    /// Search for `<race_name> results` and return links on known platforms.
    ///
    /// When the general search finds nothing, each platform is searched
    /// with its site restriction. Search failures are logged and end the
    /// search early; they never fail the call.
    pub async fn discover(&self, race_name: &str) -> Vec<Candidate> {
        let mut seen = HashSet::new();

        let query = format!("{race_name} results");
        tracing::info!("Searching: {}", query);
        let mut candidates = match self.search(&query).await {
            Ok(links) => select_candidates(links, None, &mut seen),
            Err(e) => {
                tracing::warn!("Search failed ({e}). A results URL can be given directly.");
                return Vec::new();
            }
        };

        if candidates.is_empty() {
            for info in PLATFORMS {
                let query = format!("{race_name} {}", info.search_suffix);
                tracing::debug!("Searching: {}", query);
                match self.search(&query).await {
                    Ok(links) => {
                        candidates.extend(select_candidates(links, Some(info.platform), &mut seen))
                    }
                    Err(e) => {
                        tracing::warn!("Search failed ({e}). A results URL can be given directly.");
                        break;
                    }
                }
            }
        }

        tracing::info!(found = candidates.len(), "Discovery finished");
        candidates
    }

    async fn search(&self, query: &str) -> Result<Vec<String>, AppError> {
        let url = Url::parse_with_params(&self.search_url, &[("q", query)])
            .map_err(|e| AppError::ConfigError(format!("Invalid search URL: {e}")))?;

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| AppError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::HttpError(format!(
                "HTTP {} for {}",
                status.as_u16(),
                url
            )));
        }

        let html = response
            .text()
            .await
            .map_err(|e| AppError::HttpError(format!("Failed to read response body: {e}")))?;

        Ok(extract_links(&html, &url))
    }
}

/// Keep the first occurrence of each link hosted on a known platform.
///
/// With `only`, links on other platforms are ignored.
pub fn select_candidates(
    links: Vec<String>,
    only: Option<Platform>,
    seen: &mut HashSet<String>,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();
    for link in links {
        let Some(platform) = detect_platform(&link) else {
            continue;
        };
        if only.is_some_and(|p| p != platform) || seen.contains(&link) {
            continue;
        }
        seen.insert(link.clone());
        candidates.push(Candidate {
            url: link,
            platform,
        });
    }
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn links(urls: &[&str]) -> Vec<String> {
        urls.iter().map(|u| u.to_string()).collect()
    }

    #[test]
    fn test_select_known_platforms_once() {
        let mut seen = HashSet::new();
        let found = select_candidates(
            links(&[
                "https://www.google.com/preferences",
                "https://mysamay.in/race/results/abc",
                "https://example.com/blog/race-report",
                "https://mysamay.in/race/results/abc",
                "https://sportstimingsolutions.in/results?q=tcs",
            ]),
            None,
            &mut seen,
        );

        assert_eq!(
            found,
            [
                Candidate {
                    url: "https://mysamay.in/race/results/abc".into(),
                    platform: Platform::MySamay,
                },
                Candidate {
                    url: "https://sportstimingsolutions.in/results?q=tcs".into(),
                    platform: Platform::SportsTimingSolutions,
                },
            ]
        );
    }

    #[test]
    fn test_platform_restriction_and_seen_links() {
        let mut seen = HashSet::new();
        seen.insert("https://my.raceresult.com/1/".to_string());

        let found = select_candidates(
            links(&[
                "https://my.raceresult.com/1/",
                "https://mysamay.in/race/results/abc",
                "https://my.raceresult.com/2/",
            ]),
            Some(Platform::RaceResult),
            &mut seen,
        );

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].url, "https://my.raceresult.com/2/");
        assert!(seen.contains("https://my.raceresult.com/2/"));
    }

    #[tokio::test]
    async fn test_unreachable_search_yields_nothing() {
        let config = CaptureConfig {
            search_url: "http://127.0.0.1:9/search".into(),
            timeout: std::time::Duration::from_secs(2),
            ..CaptureConfig::default()
        };
        let discovery = SearchDiscovery::new(&config).unwrap();

        assert!(discovery.discover("Bengaluru 10K").await.is_empty());
    }
}
