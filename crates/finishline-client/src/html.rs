//! HTML helpers built on `scraper`: table reading and link collection.

use finishline_core::RenderedTable;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Read every `<table>` in the document.
///
/// The first `<tr>` supplies the headers (`th` and `td`, trimmed and
/// lower-cased); each later `<tr>` supplies a body row of its `td` cells.
/// Tables without any `<tr>` are left out.
pub fn parse_html_tables(html: &str) -> Vec<RenderedTable> {
    let document = Html::parse_document(html);
    let (Ok(table_sel), Ok(row_sel), Ok(header_sel), Ok(cell_sel)) = (
        Selector::parse("table"),
        Selector::parse("tr"),
        Selector::parse("th, td"),
        Selector::parse("td"),
    ) else {
        return Vec::new();
    };

    document
        .select(&table_sel)
        .filter_map(|table| {
            let mut rows = table.select(&row_sel);
            let header_row = rows.next()?;
            let headers = header_row
                .select(&header_sel)
                .map(|cell| cell_text(cell).to_lowercase())
                .collect();
            let body = rows
                .map(|row| row.select(&cell_sel).map(cell_text).collect())
                .collect();
            Some(RenderedTable {
                headers,
                rows: body,
            })
        })
        .collect()
}

/// Visible text of a cell with runs of whitespace collapsed.
fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collect absolute `http(s)` links from `a[href]`, resolved against `base`.
///
/// Search-engine redirect wrappers (`/url?q=<target>`) are unwrapped.
pub fn extract_links(html: &str, base: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(link_sel) = Selector::parse("a[href]") else {
        return Vec::new();
    };

    document
        .select(&link_sel)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| base.join(href).ok())
        .map(unwrap_redirect)
        .filter(|url| matches!(url.scheme(), "http" | "https"))
        .map(String::from)
        .collect()
}

fn unwrap_redirect(url: Url) -> Url {
    if url.path() != "/url" {
        return url;
    }
    let target = url
        .query_pairs()
        .find(|(k, _)| k == "q" || k == "url")
        .and_then(|(_, target)| Url::parse(&target).ok());
    target.unwrap_or(url)
}
