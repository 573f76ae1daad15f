//! Page sentinel handling.
//!
//! The blog store returns at most `PAGE_SIZE + 1` items per page. A full
//! extra item means a next page exists; it is dropped before the page is
//! returned. This avoids a separate count query.

use serde::Serialize;

/// Posts per page on the blog store.
pub const PAGE_SIZE: usize = 10;

/// Items the blog store sends when another page follows.
pub const SENTINEL_LEN: usize = PAGE_SIZE + 1;

/// A normalized page, as sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub posts: Vec<T>,
    pub last_page: bool,
}

/// Trim the sentinel item and derive the last-page flag.
pub fn normalize<T>(mut raw: Vec<T>) -> Page<T> {
    if raw.len() > SENTINEL_LEN {
        tracing::warn!(
            received = raw.len(),
            expected_max = SENTINEL_LEN,
            "Blog store sent an oversized page, truncating"
        );
    }

    // Oversized pages are cut to a full page too, not passed through whole.
    if raw.len() >= SENTINEL_LEN {
        raw.truncate(PAGE_SIZE);
        Page {
            posts: raw,
            last_page: false,
        }
    } else {
        Page {
            posts: raw,
            last_page: true,
        }
    }
}

/// A listing request after input coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number, never zero.
    pub page: u32,
    pub tag: Option<String>,
}

impl PageRequest {
    pub fn new(raw_page: Option<&str>, tag: Option<String>) -> Self {
        Self {
            page: resolve_page_number(raw_page),
            tag,
        }
    }
}

/// Parse a client-supplied page number.
///
/// Missing, non-numeric, zero, and negative values all mean page 1; bad
/// pagination input never fails a request.
pub fn resolve_page_number(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(1)
}
