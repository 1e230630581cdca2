/// Smoke-test for `BrowserCapture`.
///
/// Launches a headless Chromium, captures a results page and prints what was
/// recorded: JSON responses, rendered tables and the extracted rows.
///
/// Run with:
///   cargo run --example capture_smoke --features browser -- <URL>
use finishline_client::BrowserCapture;
use finishline_core::traits::PageCapture;
use finishline_core::{CaptureConfig, ResultsExtractor, detect_platform};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://example.com".to_string());

    println!("Launching headless browser…");
    let capture = BrowserCapture::with_config(CaptureConfig::from_env()?).await?;

    println!("Capturing {url} …");
    let page = capture.capture(&url).await?;

    println!(
        "Recorded {} JSON responses, {} tables",
        page.payloads.len(),
        page.tables.len()
    );
    for payload in &page.payloads {
        println!("  {} ({} bytes)", payload.source_url, payload.byte_size);
    }

    let extraction = ResultsExtractor::new().extract(&page, detect_platform(&url));
    println!(
        "Extracted {} rows via {:?}",
        extraction.results.len(),
        extraction.source
    );
    if let Some(first) = extraction.results.iter().next() {
        println!("First row: {}", serde_json::to_string(first)?);
    }
    Ok(())
}
