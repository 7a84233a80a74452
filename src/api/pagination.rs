use axum::http::{header::HOST, HeaderMap, Uri};
use serde::Serialize;
use url::Url;

use crate::filter::Page;

const PAGE_PARAM: &str = "page";

/// Page-number pagination envelope.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<T>,
}

impl<T> PaginatedResponse<T> {
    /// Wrap one page of results, linking neighbours relative to `request_url`.
    pub fn new(page: &Page, request_url: Option<&Url>, results: Vec<T>) -> Self {
        let link = |number: u64| request_url.map(|url| page_link(url, number));

        Self {
            count: page.count,
            next: if page.has_next() { link(page.number + 1) } else { None },
            previous: if page.has_previous() { link(page.number - 1) } else { None },
            results,
        }
    }
}

/// Absolute URL of the current request, as the client addressed it.
pub fn request_url(headers: &HeaderMap, uri: &Uri) -> Option<Url> {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| *v == "https" || *v == "http")
        .unwrap_or("http");

    let host = headers
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .or_else(|| uri.authority().map(|a| a.as_str().to_owned()))?;

    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

    match Url::parse(&format!("{}://{}{}", scheme, host, path_and_query)) {
        Ok(url) => Some(url),
        Err(e) => {
            tracing::warn!("Cannot build absolute URL for host '{}': {}", host, e);
            None
        }
    }
}

/// Link to `number`, keeping every other query parameter in sorted order.
/// Page 1 is addressed without a `page` parameter.
pub fn page_link(url: &Url, number: u64) -> String {
    let mut pairs: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != PAGE_PARAM)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    if number > 1 {
        pairs.push((PAGE_PARAM.to_string(), number.to_string()));
    }
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    let mut link = url.clone();
    link.set_fragment(None);
    if pairs.is_empty() {
        link.set_query(None);
    } else {
        link.query_pairs_mut().clear().extend_pairs(pairs);
    }
    link.to_string()
}
