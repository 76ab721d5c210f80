//! Page metadata and the page walker for Fiken list endpoints.
//!
//! Fiken reports pagination only through response headers; list bodies are
//! plain JSON arrays. The walker drives page indices `0, 1, 2, ...` and stops
//! once `page + 1 >= page_count`, so a missing or zero page count still
//! results in exactly one fetch.

use reqwest::header::HeaderMap;
use serde::Serialize;
use std::future::Future;

pub const HEADER_PAGE: &str = "Fiken-Api-Page";
pub const HEADER_PAGE_SIZE: &str = "Fiken-Api-Page-Size";
pub const HEADER_PAGE_COUNT: &str = "Fiken-Api-Page-Count";
pub const HEADER_RESULT_COUNT: &str = "Fiken-Api-Result-Count";

pub const DEFAULT_PAGE_SIZE: u32 = 25;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Pagination metadata of one response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    /// Zero-based index of the returned page
    pub page: u32,
    pub page_size: u32,
    pub page_count: u32,
    /// Total number of items across all pages
    pub result_count: u32,
}

impl PaginationInfo {
    /// Read the four pagination headers. Missing or non-numeric values become 0.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            page: header_u32(headers, HEADER_PAGE),
            page_size: header_u32(headers, HEADER_PAGE_SIZE),
            page_count: header_u32(headers, HEADER_PAGE_COUNT),
            result_count: header_u32(headers, HEADER_RESULT_COUNT),
        }
    }

    pub fn has_more(&self) -> bool {
        self.page + 1 < self.page_count
    }
}

fn header_u32(headers: &HeaderMap, name: &str) -> u32 {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0)
}

/// Clamp a requested page size into `1..=MAX_PAGE_SIZE`.
/// Non-positive sizes fall back to `DEFAULT_PAGE_SIZE`.
pub fn clamp_page_size(requested: i64) -> u32 {
    if requested <= 0 {
        DEFAULT_PAGE_SIZE
    } else if requested > MAX_PAGE_SIZE as i64 {
        MAX_PAGE_SIZE
    } else {
        requested as u32
    }
}

/// One page the walker wants fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Query parameters Fiken expects for this page.
    pub fn query_pairs(&self) -> [(&'static str, String); 2] {
        [
            ("page", self.page.to_string()),
            ("pageSize", self.page_size.to_string()),
        ]
    }
}

/// Items of one fetched page together with its metadata.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: PaginationInfo,
}

/// Pull-based walker state: which page comes next, if any.
#[derive(Debug, Clone)]
pub struct PageCursor {
    page_size: u32,
    next_page: Option<u32>,
    fetched: u32,
}

impl PageCursor {
    pub fn new(page_size: i64) -> Self {
        Self {
            page_size: clamp_page_size(page_size),
            next_page: Some(0),
            fetched: 0,
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn next_request(&self) -> Option<PageRequest> {
        self.next_page.map(|page| PageRequest {
            page,
            page_size: self.page_size,
        })
    }

    /// Record the page count reported for the page just fetched.
    pub fn advance(&mut self, page_count: u32) {
        if let Some(page) = self.next_page {
            self.fetched += 1;
            self.next_page = if page + 1 >= page_count {
                None
            } else {
                Some(page + 1)
            };
        }
    }

    /// Stop without fetching further pages.
    pub fn finish(&mut self) {
        self.next_page = None;
    }

    pub fn is_done(&self) -> bool {
        self.next_page.is_none()
    }

    pub fn pages_fetched(&self) -> u32 {
        self.fetched
    }
}

/// Drive `fetch_page` over every page of a collection.
///
/// The callback performs one page request, stores the page's items wherever
/// the caller keeps them, and reports the total page count. The first error
/// ends the walk and is returned unchanged; no later page is requested.
/// Returns the number of pages fetched.
pub async fn walk_pages<F, Fut, E>(page_size: i64, mut fetch_page: F) -> Result<u32, E>
where
    F: FnMut(PageRequest) -> Fut,
    Fut: Future<Output = Result<u32, E>>,
{
    let mut cursor = PageCursor::new(page_size);
    while let Some(request) = cursor.next_request() {
        let page_count = fetch_page(request).await?;
        log::debug!(
            "fetched page {} of {} (page size {})",
            request.page + 1,
            page_count.max(1),
            request.page_size
        );
        cursor.advance(page_count);
    }
    Ok(cursor.pages_fetched())
}
