use crate::error::AppError;
use crate::extract::{Extraction, ResultsExtractor};
use crate::platform::{Platform, detect_platform};
use crate::traits::PageCapture;

/// Orchestrates one results page: capture → extract → (fallback) → result set.
///
/// Generic over the capture collaborator, so the extraction logic can be
/// exercised without a browser or network.
pub struct ResultsPipeline<C>
where
    C: PageCapture,
{
    capture: C,
    extractor: ResultsExtractor,
}

impl<C> ResultsPipeline<C>
where
    C: PageCapture,
{
    pub fn new(capture: C) -> Self {
        Self {
            capture,
            extractor: ResultsExtractor::new(),
        }
    }

    pub fn with_extractor(capture: C, extractor: ResultsExtractor) -> Self {
        Self { capture, extractor }
    }

    /// Capture `url` and extract its results.
    ///
    /// `platform` overrides detection from the URL; `None` detects it, and
    /// an unknown host uses the generic strategy.
    pub async fn run(&self, url: &str, platform: Option<Platform>) -> Result<Extraction, AppError> {
        let platform = platform.or_else(|| detect_platform(url));
        match platform {
            Some(p) => tracing::info!("Detected platform: {}", p.name()),
            None => tracing::info!("Unknown platform, using generic extraction"),
        }

        tracing::info!("Loading {}", url);
        let page = self.capture.capture(url).await?;
        tracing::info!(
            payloads = page.payloads.len(),
            tables = page.tables.len(),
            "Captured page"
        );

        Ok(self.extractor.extract(&page, platform))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractionSource;
    use crate::fields::CanonicalField as F;
    use crate::models::CapturedPage;
    use crate::testutil::*;

    fn sts_page() -> CapturedPage {
        CapturedPage {
            url: "https://sportstimingsolutions.in/results?q=x".into(),
            payloads: vec![make_payload(
                "https://sportstimingsolutions.in/api/results",
                serde_json::json!({"data": {"results": [
                    {"bibno": "11", "first_name": "Asha", "finished_time": "00:45:12"},
                    {"bib_number": "12", "full_name": "Dev", "chip_time": "00:46:01"},
                ]}}),
            )],
            tables: vec![],
        }
    }

    #[tokio::test]
    async fn detects_platform_from_url() {
        let capture = MockCapture::new(sts_page());
        let pipeline = ResultsPipeline::new(capture.clone());

        let extraction = pipeline
            .run("https://sportstimingsolutions.in/results?q=x", None)
            .await
            .unwrap();

        // STS filtering drops the row keyed only by bib_number.
        assert_eq!(extraction.source, ExtractionSource::Json);
        assert_eq!(extraction.results.len(), 1);
        assert_eq!(extraction.results.rows()[0].get(F::FullName), Some("Asha"));
        assert_eq!(
            capture.requested.lock().unwrap().as_slice(),
            ["https://sportstimingsolutions.in/results?q=x"]
        );
    }

    #[tokio::test]
    async fn explicit_platform_overrides_detection() {
        let pipeline = ResultsPipeline::new(MockCapture::new(sts_page()));

        let extraction = pipeline
            .run(
                "https://sportstimingsolutions.in/results?q=x",
                Some(Platform::MySamay),
            )
            .await
            .unwrap();

        assert_eq!(extraction.results.len(), 2);
    }

    #[tokio::test]
    async fn empty_capture_is_not_an_error() {
        let pipeline = ResultsPipeline::new(MockCapture::default());

        let extraction = pipeline.run("https://example.com/race", None).await.unwrap();

        assert_eq!(extraction.source, ExtractionSource::Empty);
        assert!(extraction.results.is_empty());
    }

    #[tokio::test]
    async fn capture_error_propagates() {
        let pipeline = ResultsPipeline::new(MockCapture::with_error(AppError::Timeout(30)));

        let err = pipeline.run("https://example.com/race", None).await.unwrap_err();

        assert!(matches!(err, AppError::Timeout(30)));
    }
}
