use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[cfg(feature = "browser")]
use finishline_client::BrowserCapture;
#[cfg(not(feature = "browser"))]
use finishline_client::HttpCapture;
use finishline_client::SearchDiscovery;
use finishline_core::extract::ExtractionSource;
use finishline_core::traits::PageCapture;
use finishline_core::{
    AppError, CaptureConfig, Platform, ResultsPipeline, default_output_name, detect_platform,
    ordered_columns, write_csv_file,
};

/// Characters of pretty-printed JSON shown per payload in `--debug` mode.
const PREVIEW_CHARS: usize = 200;

#[derive(Parser)]
#[command(
    name = "finishline",
    version,
    about = "Extract race results from timing platforms into CSV"
)]
struct Cli {
    /// Race name to search for (e.g. "TCS World 10K Bengaluru 2024")
    #[arg(required_unless_present = "url")]
    race: Option<String>,

    /// Results page URL, skips discovery
    #[arg(short, long)]
    url: Option<String>,

    /// Output CSV path (defaults to <race>_results_<timestamp>.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Dump every captured JSON response instead of extracting
    #[arg(short, long, default_value_t = false, requires = "url")]
    debug: bool,

    /// Page-load timeout in seconds
    #[arg(long, env = "FINISHLINE_TIMEOUT_SECS", value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("finishline=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = CaptureConfig::from_env().context("Invalid configuration")?;
    if let Some(secs) = cli.timeout {
        config = config.with_timeout(Duration::from_secs(secs));
    }

    let (url, platform) = match &cli.url {
        Some(url) => (url.clone(), detect_platform(url)),
        None => {
            let race = cli.race.as_deref().unwrap_or_default();
            discover_url(race, &config).await?
        }
    };

    #[cfg(feature = "browser")]
    let capture = BrowserCapture::with_config(config.clone())
        .await
        .context("Failed to launch browser")?;
    #[cfg(not(feature = "browser"))]
    let capture = HttpCapture::with_config(&config).context("Failed to create HTTP client")?;

    if cli.debug {
        return cmd_debug(&capture, &url).await;
    }

    let query = cli.race.as_deref().unwrap_or("race");
    cmd_extract(capture, &url, platform, query, cli.output).await
}

/// Pick the first results page found by searching for `race`.
async fn discover_url(race: &str, config: &CaptureConfig) -> Result<(String, Option<Platform>)> {
    let discovery = SearchDiscovery::new(config).context("Failed to create search client")?;
    let candidates = discovery.discover(race).await;

    for candidate in &candidates {
        tracing::info!("Candidate: {} ({})", candidate.url, candidate.platform);
    }

    let first = candidates.into_iter().next().ok_or_else(|| {
        AppError::DiscoveryError(format!(
            "no results page found for '{race}', pass one with --url"
        ))
    })?;

    Ok((first.url, Some(first.platform)))
}

async fn cmd_extract<C: PageCapture>(
    capture: C,
    url: &str,
    platform: Option<Platform>,
    query: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let pipeline = ResultsPipeline::new(capture);
    let extraction = pipeline
        .run(url, platform)
        .await
        .with_context(|| format!("Failed to load {url}"))?;

    if extraction.results.is_empty() {
        println!("No results extracted from {url}.");
        println!("Possible reasons:");
        println!("  - results sit behind a search form or login");
        println!("  - the platform serves them in an unrecognized format");
        println!("Run again with --debug --url <URL> to inspect captured responses.");
        return Ok(());
    }

    let path = output.unwrap_or_else(|| {
        PathBuf::from(default_output_name(
            query,
            chrono::Local::now().naive_local(),
        ))
    });
    let written = write_csv_file(&extraction.results, &path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    let source = match extraction.source {
        ExtractionSource::Json => "JSON responses",
        ExtractionSource::Dom => "page tables",
        ExtractionSource::Empty => "nothing",
    };
    let columns = ordered_columns(&extraction.results);
    let fields: Vec<&str> = columns.iter().map(|c| c.as_str()).collect();

    println!("Saved {written} results from {source} to {}", path.display());
    println!("Columns: {}", columns.len());
    println!("Fields: {}", fields.join(", "));

    Ok(())
}

/// Print every captured JSON response with a short preview.
async fn cmd_debug<C: PageCapture>(capture: &C, url: &str) -> Result<()> {
    let page = capture
        .capture(url)
        .await
        .with_context(|| format!("Failed to load {url}"))?;

    println!(
        "Captured {} JSON responses and {} tables from {}",
        page.payloads.len(),
        page.tables.len(),
        url
    );

    for (i, payload) in page.payloads.iter().enumerate() {
        let pretty = serde_json::to_string_pretty(&payload.json_value)?;
        println!(
            "\n[{}] {} (status {}, {} bytes)",
            i + 1,
            payload.source_url,
            payload.status,
            payload.byte_size
        );
        println!("{}", preview(&pretty, PREVIEW_CHARS));
    }

    Ok(())
}

fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
