//! Response encoding.
//!
//! # Responsibilities
//! - Lists as `{ posts, lastPage }`, single posts as `{ post? }`
//! - Images streamed through with the upstream content type
//! - The feed passed through verbatim with fixed caching headers
//! - Upstream failures mapped to HTTP statuses with a JSON error body
//!
//! # Design Decisions
//! - Image bodies are never buffered
//! - Feed headers are constants and ignore whatever the blog store sent

use axum::{
    body::Body,
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE},
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::upstream::types::DEFAULT_IMAGE_CONTENT_TYPE;
use crate::upstream::{Post, PostLookup, UpstreamError, UpstreamImage};

/// Content type of the RSS feed.
pub const RSS_CONTENT_TYPE: &str = "application/rss+xml";

/// Caching policy of the RSS feed: browsers revalidate, shared caches keep
/// it for an hour.
pub const FEED_CACHE_CONTROL: &str = "max-age=0, s-maxage=3600";

/// Body of `GET /api/getters/post/{slug}`. A miss serializes as `{}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Post>,
}

impl From<PostLookup> for PostBody {
    fn from(lookup: PostLookup) -> Self {
        Self {
            post: lookup.into_option(),
        }
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Stream an upstream image to the client.
pub fn image_response(image: UpstreamImage) -> Response {
    let content_type = HeaderValue::from_str(&image.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_IMAGE_CONTENT_TYPE));

    let mut response = Response::new(Body::from_stream(image.body));
    response.headers_mut().insert(CONTENT_TYPE, content_type);
    response
}

/// Pass the RSS document through with the fixed feed headers.
pub fn feed_response(xml: String) -> Response {
    (
        [
            (CONTENT_TYPE, RSS_CONTENT_TYPE),
            (CACHE_CONTROL, FEED_CACHE_CONTROL),
        ],
        xml,
    )
        .into_response()
}

/// 404 for paths outside the routing table.
pub async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "no such route".to_string(),
        }),
    )
        .into_response()
}

impl UpstreamError {
    /// Status returned to the client for this failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            UpstreamError::NotFound(_) => StatusCode::NOT_FOUND,
            UpstreamError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            UpstreamError::Unavailable(_)
            | UpstreamError::Status { .. }
            | UpstreamError::Malformed(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for UpstreamError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            UpstreamError::NotFound(what) => {
                tracing::debug!(resource = %what, "Blog store has no such resource");
            }
            other => {
                tracing::error!(error = %other, status = status.as_u16(), "Blog store request failed");
            }
        }

        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Bytes};
    use futures_util::StreamExt;
    use serde_json::Map;

    fn sample_post() -> Post {
        Post {
            slug: "hello".into(),
            title: "Hello".into(),
            subtitle: "".into(),
            content: "body".into(),
            date: "2024-05-01".into(),
            tags: vec!["rust".into()],
            extra: Map::new(),
        }
    }

    #[test]
    fn test_post_body_omits_missing_post() {
        let json = serde_json::to_string(&PostBody::from(PostLookup::NotFound)).unwrap();
        assert_eq!(json, "{}");

        let json = serde_json::to_value(PostBody::from(PostLookup::Found(sample_post()))).unwrap();
        assert_eq!(json["post"]["slug"], "hello");
    }

    #[test]
    fn test_feed_headers_are_fixed() {
        let response = feed_response("<rss/>".into());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], RSS_CONTENT_TYPE);
        assert_eq!(response.headers()[CACHE_CONTROL], FEED_CACHE_CONTROL);
    }

    #[tokio::test]
    async fn test_image_response_streams_body() {
        let chunks: Vec<Result<Bytes, reqwest::Error>> =
            vec![Ok(Bytes::from_static(b"\x89PN")), Ok(Bytes::from_static(b"G"))];
        let image = UpstreamImage {
            content_type: "image/png".into(),
            body: futures_util::stream::iter(chunks).boxed(),
        };

        let response = image_response(image);
        assert_eq!(response.headers()[CONTENT_TYPE], "image/png");
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"\x89PNG");
    }

    #[test]
    fn test_image_response_rejects_bad_content_type() {
        let image = UpstreamImage {
            content_type: "bad\nvalue".into(),
            body: futures_util::stream::empty().boxed(),
        };
        let response = image_response(image);
        assert_eq!(response.headers()[CONTENT_TYPE], DEFAULT_IMAGE_CONTENT_TYPE);
    }

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            UpstreamError::Unavailable("refused".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            UpstreamError::Timeout(5).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            UpstreamError::Status {
                status: 500,
                url: "http://db/feed.rss".into()
            }
            .status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            UpstreamError::Malformed("eof".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            UpstreamError::NotFound("image a/b.png".into()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[tokio::test]
    async fn test_error_body_is_json() {
        let response = UpstreamError::Unavailable("connection refused".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "blog store unavailable: connection refused");
    }
}
