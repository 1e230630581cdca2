use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventLoadingFinished, EventResponseReceived, GetResponseBodyParams, RequestId,
};
use chromiumoxide::{Browser, BrowserConfig, Page};
use finishline_core::error::AppError;
use finishline_core::models::{CapturedPage, RawPayload, is_json_content_type};
use finishline_core::traits::PageCapture;
use finishline_core::CaptureConfig;
use futures::{Stream, StreamExt};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::html::parse_html_tables;

/// Delay after each scroll or pagination click.
const ACTION_DELAY: Duration = Duration::from_millis(1500);

/// How long a stopped recorder keeps waiting for responses still loading.
const RESPONSE_DRAIN: Duration = Duration::from_millis(500);

/// Controls that reveal more results, tried in order.
const LOAD_MORE_CONTROLS: &[LoadMore] = &[
    LoadMore::Text("Load More"),
    LoadMore::Text("Show More"),
    LoadMore::Text("View All"),
    LoadMore::Text("Next"),
    LoadMore::Button("More"),
    LoadMore::Css(".load-more"),
    LoadMore::Css(".show-more"),
    LoadMore::Css(".pagination .next"),
];

#[derive(Debug, Clone, Copy)]
enum LoadMore {
    /// Visible button/link whose text contains this label (case-insensitive).
    Text(&'static str),
    /// Visible `<button>` whose text contains this label.
    Button(&'static str),
    /// First visible element matching this selector.
    Css(&'static str),
}

impl LoadMore {
    /// JavaScript that clicks the control if visible and reports whether it did.
    fn click_script(self) -> String {
        let (kind, needle) = match self {
            LoadMore::Text(label) => ("text", label),
            LoadMore::Button(label) => ("button", label),
            LoadMore::Css(selector) => ("css", selector),
        };
        let needle = serde_json::Value::from(needle);
        format!(
            r#"(() => {{
    const kind = "{kind}";
    const needle = {needle};
    const visible = (el) => el && el.offsetParent !== null && !el.disabled;
    let target = null;
    if (kind === "css") {{
        target = Array.from(document.querySelectorAll(needle)).find(visible) || null;
    }} else {{
        const wanted = needle.toLowerCase();
        const scope = kind === "button" ? "button" : "button, a, [role=button]";
        target = Array.from(document.querySelectorAll(scope))
            .find((el) => visible(el) && (el.innerText || "").trim().toLowerCase().includes(wanted)) || null;
    }}
    if (!target) return false;
    target.click();
    return true;
}})()"#
        )
    }
}

/// A JSON response whose body may still be loading.
#[derive(Debug, Clone)]
struct ResponseMeta {
    request_id: String,
    url: String,
    status: u16,
    mime_type: String,
}

/// Background task collecting JSON payloads for one tab.
struct Recorder {
    stop: oneshot::Sender<()>,
    task: JoinHandle<Vec<RawPayload>>,
}

impl Recorder {
    /// Signal the task to stop, let it drain, and return what it captured.
    async fn finish(self) -> Vec<RawPayload> {
        let Recorder { stop, mut task } = self;
        let _ = stop.send(());
        match tokio::time::timeout(RESPONSE_DRAIN * 2, &mut task).await {
            Ok(Ok(payloads)) => payloads,
            Ok(Err(e)) => {
                tracing::warn!("Response recorder failed: {e}");
                Vec::new()
            }
            Err(_) => {
                tracing::warn!("Response recorder did not stop, discarding its payloads");
                task.abort();
                Vec::new()
            }
        }
    }
}

/// Pair response metadata with finished loads and fetch JSON bodies.
///
/// Runs until `stop` fires, then keeps handling queued events until no
/// response is pending or [`RESPONSE_DRAIN`] has passed.
async fn collect_json_responses<R, L, B, Fut>(
    mut received: R,
    mut finished: L,
    fetch_body: B,
    mut stop: oneshot::Receiver<()>,
    min_body_bytes: usize,
) -> Vec<RawPayload>
where
    R: Stream<Item = ResponseMeta> + Unpin,
    L: Stream<Item = String> + Unpin,
    B: Fn(String) -> Fut,
    Fut: Future<Output = Option<String>>,
{
    let mut payloads = Vec::new();
    let mut pending: HashMap<String, ResponseMeta> = HashMap::new();
    let mut stopping = false;
    let mut deadline = Instant::now();

    while !(stopping && pending.is_empty()) {
        tokio::select! {
            biased;
            Some(meta) = received.next() => {
                if is_json_content_type(&meta.mime_type) {
                    pending.insert(meta.request_id.clone(), meta);
                }
            }
            Some(request_id) = finished.next() => {
                let Some(meta) = pending.remove(&request_id) else {
                    continue;
                };
                let Some(body) = fetch_body(meta.request_id).await else {
                    tracing::trace!(url = %meta.url, "No response body");
                    continue;
                };
                if let Some(payload) =
                    RawPayload::from_body(meta.url, meta.status, &body, min_body_bytes)
                {
                    tracing::debug!(url = %payload.source_url, bytes = payload.byte_size, "Captured JSON response");
                    payloads.push(payload);
                }
            }
            _ = &mut stop, if !stopping => {
                stopping = true;
                deadline = Instant::now() + RESPONSE_DRAIN;
            }
            _ = tokio::time::sleep_until(deadline), if stopping => {
                tracing::debug!(pending = pending.len(), "Stopped with responses still loading");
                break;
            }
            else => break,
        }
    }

    payloads
}

/// Headless-browser capture using Chromium via the Chrome DevTools Protocol.
///
/// Records every JSON network response the results page makes while it
/// loads, scrolls and paginates, then reads the rendered DOM for tables.
///
/// A single Chromium process is shared across all clones; each capture
/// opens and closes its own tab.
#[derive(Clone)]
pub struct BrowserCapture {
    browser: Arc<Browser>,
    config: CaptureConfig,
}

impl BrowserCapture {
    /// Launches a headless Chromium browser with default settings.
    pub async fn new() -> Result<Self, AppError> {
        Self::with_config(CaptureConfig::default()).await
    }

    /// Launches a headless Chromium browser.
    ///
    /// Requires a Chromium / Chrome binary reachable via `$PATH`, `CHROME_BIN`
    /// or one of the well-known install locations.
    pub async fn with_config(config: CaptureConfig) -> Result<Self, AppError> {
        let mut builder = BrowserConfig::builder();
        builder = builder.no_sandbox().disable_default_args();

        if let Some(bin) = Self::find_chrome_binary() {
            tracing::info!("Using Chrome binary: {}", bin.display());
            builder = builder.chrome_executable(bin);
        }

        let browser_config = builder
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-setuid-sandbox")
            .arg("--disable-extensions")
            .arg("--no-first-run")
            .build()
            .map_err(|e| AppError::BrowserError(format!("Browser config error: {e}")))?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| AppError::BrowserError(format!("Failed to launch browser: {e}")))?;

        // The CDP handler must be polled for the connection to make progress.
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    tracing::warn!("Browser CDP handler error: {event:?}");
                    break;
                }
            }
        });

        Ok(Self {
            browser: Arc::new(browser),
            config,
        })
    }

    /// Locate a real Chrome/Chromium binary.
    ///
    /// The snap wrapper at `/snap/bin/chromium` strips unknown flags, so the
    /// binary inside the snap is preferred. `None` lets `chromiumoxide` do
    /// its own lookup.
    fn find_chrome_binary() -> Option<PathBuf> {
        if let Ok(p) = std::env::var("CHROME_BIN") {
            let path = PathBuf::from(&p);
            if path.exists() {
                return Some(path);
            }
        }

        [
            "/snap/chromium/current/usr/lib/chromium-browser/chrome",
            "/var/lib/flatpak/exports/bin/org.chromium.Chromium",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/google-chrome",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
        ]
        .iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
    }

    /// Record JSON responses on `page` until the returned recorder is finished.
    async fn record_json_responses(&self, page: &Page) -> Result<Recorder, AppError> {
        let cdp_err =
            |e: chromiumoxide::error::CdpError| AppError::BrowserError(format!("CDP error: {e}"));

        page.execute(EnableParams::default()).await.map_err(cdp_err)?;
        let received = page
            .event_listener::<EventResponseReceived>()
            .await
            .map_err(cdp_err)?
            .map(|event| ResponseMeta {
                request_id: event.request_id.inner().clone(),
                url: event.response.url.clone(),
                status: u16::try_from(event.response.status).unwrap_or_default(),
                mime_type: event.response.mime_type.clone(),
            });
        let finished = page
            .event_listener::<EventLoadingFinished>()
            .await
            .map_err(cdp_err)?
            .map(|event| event.request_id.inner().clone());

        let page = page.clone();
        let fetch_body = move |request_id: String| {
            let page = page.clone();
            async move {
                match page
                    .execute(GetResponseBodyParams::new(RequestId::new(request_id)))
                    .await
                {
                    Ok(reply) if !reply.result.base64_encoded => Some(reply.result.body.clone()),
                    _ => None,
                }
            }
        };

        let (stop, stop_rx) = oneshot::channel();
        let task = tokio::spawn(collect_json_responses(
            received,
            finished,
            fetch_body,
            stop_rx,
            self.config.min_body_bytes,
        ));

        Ok(Recorder { stop, task })
    }

    /// Scroll for lazy loading, then work through pagination controls.
    async fn reveal_more(&self, page: &Page) {
        for _ in 0..self.config.scroll_passes {
            if let Err(e) = page
                .evaluate("window.scrollTo(0, document.body.scrollHeight)")
                .await
            {
                tracing::debug!("Scroll failed: {e}");
                break;
            }
            tokio::time::sleep(ACTION_DELAY).await;
        }

        for control in LOAD_MORE_CONTROLS {
            let script = control.click_script();
            let mut clicks = 0;
            while clicks < self.config.max_clicks {
                let clicked = match page.evaluate(script.as_str()).await {
                    Ok(result) => result.into_value::<bool>().unwrap_or(false),
                    Err(_) => false,
                };
                if !clicked {
                    break;
                }
                clicks += 1;
                tokio::time::sleep(ACTION_DELAY).await;
            }
            if clicks > 0 {
                tracing::info!(?control, clicks, "Clicked pagination control");
            }
        }
    }
}

impl PageCapture for BrowserCapture {
    async fn capture(&self, url: &str) -> Result<CapturedPage, AppError> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| AppError::BrowserError(format!("Failed to open tab: {e}")))?;

        let recorder = self.record_json_responses(&page).await?;

        let timeout = self.config.timeout;
        let navigation = tokio::time::timeout(timeout, async {
            page.goto(url)
                .await
                .map_err(|e| AppError::HttpError(format!("Failed to navigate to {url}: {e}")))?;
            page.wait_for_navigation()
                .await
                .map_err(|e| AppError::HttpError(format!("Page did not finish loading: {e}")))?;
            Ok::<(), AppError>(())
        })
        .await;

        match navigation {
            Ok(Ok(())) => {
                tokio::time::sleep(self.config.settle).await;
                self.reveal_more(&page).await;
            }
            // Still read whatever rendered; the DOM fallback may work.
            Ok(Err(e)) => tracing::warn!("Error loading page: {e}"),
            Err(_) => tracing::warn!("Page load exceeded {}s", timeout.as_secs()),
        }

        let html = page.content().await.map_err(|e| {
            AppError::BrowserError(format!("Failed to read page content: {e}"))
        });

        let payloads = recorder.finish().await;
        let _ = page.close().await;

        let tables = match html {
            Ok(html) => parse_html_tables(&html),
            Err(e) if payloads.is_empty() => return Err(e),
            Err(e) => {
                tracing::warn!("{e}");
                Vec::new()
            }
        };

        Ok(CapturedPage {
            url: url.to_string(),
            payloads,
            tables,
        })
    }
}
