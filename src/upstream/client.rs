//! Blog store HTTP client with timeout and error handling.
//!
//! # Responsibilities
//! - Build upstream URLs with percent-encoded path segments
//! - Issue exactly one GET per operation, never retried
//! - Bound every call with the configured deadline
//! - Classify failures into `UpstreamError`

use std::future::Future;
use std::time::Duration;

use axum::body::Bytes;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::time::timeout;
use url::Url;

use crate::config::UpstreamConfig;
use crate::observability::metrics;
use crate::upstream::types::{
    Post, PostLookup, UpstreamError, UpstreamImage, UpstreamResult, DEFAULT_IMAGE_CONTENT_TYPE,
};

const USER_AGENT: &str = concat!("blog-gateway/", env!("CARGO_PKG_VERSION"));

/// Client for the blog store.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct BlogStoreClient {
    http: reqwest::Client,
    base_url: Url,
    timeout_secs: u64,
}

impl BlogStoreClient {
    /// Create a new client from the upstream configuration.
    pub fn new(config: &UpstreamConfig) -> UpstreamResult<Self> {
        let base = config.base_url();
        let base_url = Url::parse(&base).map_err(|e| {
            UpstreamError::Unavailable(format!("invalid blog store address '{}': {}", base, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(UpstreamError::Unavailable(format!(
                "blog store address '{}' cannot carry a path",
                base
            )));
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs));
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let http = builder
            .build()
            .map_err(|e| UpstreamError::Unavailable(format!("failed to build HTTP client: {}", e)))?;

        tracing::info!(
            base_url = %base_url,
            request_timeout_secs = config.request_timeout_secs,
            "Blog store client initialized"
        );

        Ok(Self {
            http,
            base_url,
            timeout_secs: config.request_timeout_secs,
        })
    }

    /// `GET /posts/{page}`: one page of the default listing, up to 11 posts.
    pub async fn fetch_posts_page(&self, page: u32) -> UpstreamResult<Vec<Post>> {
        let url = self.endpoint(&["posts", &page.to_string()]);
        observe("posts_page", async {
            let (status, body) = self.fetch_bytes(&url).await?;
            ensure_success(status, &url)?;
            decode_json(&body)
        })
        .await
    }

    /// `GET /filter/tags/{tag}?page={page}`: one page of posts carrying `tag`.
    pub async fn fetch_posts_page_by_tag(&self, tag: &str, page: u32) -> UpstreamResult<Vec<Post>> {
        let mut url = self.endpoint(&["filter", "tags", tag]);
        url.query_pairs_mut().append_pair("page", &page.to_string());
        observe("posts_page_by_tag", async {
            let (status, body) = self.fetch_bytes(&url).await?;
            ensure_success(status, &url)?;
            decode_json(&body)
        })
        .await
    }

    /// `GET /post/{slug}`.
    ///
    /// A 404 or an empty/falsy body is a miss, not an error.
    pub async fn fetch_post_by_slug(&self, slug: &str) -> UpstreamResult<PostLookup> {
        let url = self.endpoint(&["post", slug]);
        observe("post", async {
            let (status, body) = self.fetch_bytes(&url).await?;
            if status == StatusCode::NOT_FOUND {
                return Ok(PostLookup::NotFound);
            }
            ensure_success(status, &url)?;
            decode_post_body(&body)
        })
        .await
    }

    /// `GET /post/{slug}/{image}`.
    ///
    /// Only the response head is awaited under the deadline; the body is
    /// handed back as a stream so it is never buffered here.
    pub async fn fetch_post_image(&self, slug: &str, image: &str) -> UpstreamResult<UpstreamImage> {
        let url = self.endpoint(&["post", slug, image]);
        observe("post_image", async {
            let response = self.deadline(self.http.get(url.clone()).send()).await?;
            let status = response.status();
            if status == StatusCode::NOT_FOUND {
                return Err(UpstreamError::NotFound(format!("image {}/{}", slug, image)));
            }
            ensure_success(status, &url)?;

            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.is_empty())
                .unwrap_or(DEFAULT_IMAGE_CONTENT_TYPE)
                .to_string();

            Ok(UpstreamImage {
                content_type,
                body: response.bytes_stream().boxed(),
            })
        })
        .await
    }

    /// `GET /feed.rss`: the raw RSS document.
    pub async fn fetch_feed(&self) -> UpstreamResult<String> {
        let url = self.endpoint(&["feed.rss"]);
        observe("feed", async {
            let (status, body) = self.fetch_bytes(&url).await?;
            if status == StatusCode::NOT_FOUND {
                return Err(UpstreamError::NotFound("feed.rss".to_string()));
            }
            ensure_success(status, &url)?;
            String::from_utf8(body.to_vec())
                .map_err(|e| UpstreamError::Malformed(format!("feed is not UTF-8: {}", e)))
        })
        .await
    }

    /// Base URL of the blog store.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append percent-encoded path segments to the base URL.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`: the base URL always accepts path segments.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// GET `url` and read the whole body, all under one deadline.
    async fn fetch_bytes(&self, url: &Url) -> UpstreamResult<(StatusCode, Bytes)> {
        tracing::debug!(upstream_url = %url, "Calling blog store");
        self.deadline(async {
            let response = self.http.get(url.clone()).send().await?;
            let status = response.status();
            let body = response.bytes().await?;
            Ok::<_, reqwest::Error>((status, body))
        })
        .await
    }

    async fn deadline<T, F>(&self, fut: F) -> UpstreamResult<T>
    where
        F: Future<Output = Result<T, reqwest::Error>>,
    {
        match timeout(Duration::from_secs(self.timeout_secs), fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(UpstreamError::from_transport(e, self.timeout_secs)),
            Err(_) => Err(UpstreamError::Timeout(self.timeout_secs)),
        }
    }
}

impl std::fmt::Debug for BlogStoreClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlogStoreClient")
            .field("base_url", &self.base_url.as_str())
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

async fn observe<T, F>(operation: &'static str, fut: F) -> UpstreamResult<T>
where
    F: Future<Output = UpstreamResult<T>>,
{
    let result = fut.await;
    let outcome = match &result {
        Ok(_) => "ok",
        Err(UpstreamError::NotFound(_)) => "not_found",
        Err(UpstreamError::Timeout(_)) => "timeout",
        Err(_) => "error",
    };
    metrics::record_upstream(operation, outcome);
    result
}

fn ensure_success(status: StatusCode, url: &Url) -> UpstreamResult<()> {
    if status.is_success() {
        Ok(())
    } else {
        Err(UpstreamError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}

fn decode_json<T: DeserializeOwned>(body: &[u8]) -> UpstreamResult<T> {
    serde_json::from_slice(body).map_err(|e| UpstreamError::Malformed(e.to_string()))
}

/// Interpret a `/post/{slug}` body.
///
/// The store answers `{"post": {...}}`. Blank bodies, JSON falsy values,
/// and objects without a `post` value are misses. Anything else that does
/// not decode is malformed.
pub(crate) fn decode_post_body(body: &[u8]) -> UpstreamResult<PostLookup> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(PostLookup::NotFound);
    }

    let value: Value = decode_json(body)?;
    match value {
        Value::Null | Value::Bool(false) => Ok(PostLookup::NotFound),
        Value::String(ref s) if s.is_empty() => Ok(PostLookup::NotFound),
        Value::Number(ref n) if n.as_f64() == Some(0.0) => Ok(PostLookup::NotFound),
        Value::Object(mut map) => match map.remove("post") {
            None | Some(Value::Null) => Ok(PostLookup::NotFound),
            Some(post) => serde_json::from_value(post)
                .map(PostLookup::Found)
                .map_err(|e| UpstreamError::Malformed(format!("post: {}", e))),
        },
        other => Err(UpstreamError::Malformed(format!(
            "expected an object with a post, got {}",
            other
        ))),
    }
}
