//! Blog store data types and error definitions.

use axum::body::Bytes;
use futures_util::stream::BoxStream;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Fallback content type for images when the blog store sends none.
pub const DEFAULT_IMAGE_CONTENT_TYPE: &str = "application/octet-stream";

/// A blog post as served by the blog store.
///
/// Fields the gateway does not know about are kept in `extra` and written
/// back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub slug: String,
    pub title: String,
    pub subtitle: String,
    /// Rendered body. The tag listing of the store sends it blank.
    #[serde(default)]
    pub content: String,
    pub date: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Outcome of a single-post lookup that reached the blog store.
#[derive(Debug, Clone, PartialEq)]
pub enum PostLookup {
    Found(Post),
    NotFound,
}

impl PostLookup {
    pub fn into_option(self) -> Option<Post> {
        match self {
            PostLookup::Found(post) => Some(post),
            PostLookup::NotFound => None,
        }
    }
}

/// An image response from the blog store, body not yet read.
pub struct UpstreamImage {
    pub content_type: String,
    pub body: BoxStream<'static, Result<Bytes, reqwest::Error>>,
}

impl std::fmt::Debug for UpstreamImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstreamImage")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Errors that can occur while talking to the blog store.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Transport failure: connection refused, DNS, reset.
    #[error("blog store unavailable: {0}")]
    Unavailable(String),

    /// The call did not complete within the configured deadline.
    #[error("blog store timed out after {0} seconds")]
    Timeout(u64),

    /// The blog store answered with a non-success status.
    #[error("blog store returned {status} for {url}")]
    Status { status: u16, url: String },

    /// The body could not be read as the expected JSON or text.
    #[error("malformed blog store response: {0}")]
    Malformed(String),

    /// The requested image or document does not exist upstream.
    #[error("not found upstream: {0}")]
    NotFound(String),
}

impl UpstreamError {
    pub(crate) fn from_transport(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout(timeout_secs)
        } else if err.is_decode() {
            UpstreamError::Malformed(err.to_string())
        } else {
            UpstreamError::Unavailable(err.to_string())
        }
    }
}

/// Result type for blog store operations.
pub type UpstreamResult<T> = Result<T, UpstreamError>;
