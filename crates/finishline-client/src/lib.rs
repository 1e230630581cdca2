pub mod discovery;
pub mod html;
pub mod http_capture;

#[cfg(feature = "browser")]
pub mod browser_capture;

pub use discovery::{Candidate, SearchDiscovery};
pub use html::parse_html_tables;
pub use http_capture::HttpCapture;

#[cfg(feature = "browser")]
pub use browser_capture::BrowserCapture;
