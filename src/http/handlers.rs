//! Route handlers.
//!
//! Each handler makes exactly one blog store call. Listing handlers accept
//! the page number either as the last path segment or as `?page=`; the path
//! wins when both are given.
//!
//! Page extraction never rejects a request. Repeated or undecodable `page`
//! values, and page segments that are not valid UTF-8 once decoded, all
//! reach `PageRequest::new` and fall back to page 1 there.

use axum::{
    extract::{rejection::PathRejection, Path, RawQuery, State},
    http::Uri,
    response::Response,
    Json,
};
use percent_encoding::percent_decode_str;
use serde::Serialize;

use crate::http::response::{feed_response, image_response, PostBody};
use crate::http::server::AppState;
use crate::pagination::{normalize, Page, PageRequest};
use crate::upstream::{Post, UpstreamError};

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
}

/// `GET /api/getters/posts`
pub async fn list_posts(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<Page<Post>>, UpstreamError> {
    let page = page_param(query.as_deref());
    serve_page(&state, PageRequest::new(page.as_deref(), None)).await
}

/// `GET /api/getters/posts/{page}`
pub async fn list_posts_page(
    State(state): State<AppState>,
    uri: Uri,
    page: Result<Path<String>, PathRejection>,
) -> Result<Json<Page<Post>>, UpstreamError> {
    let page = match page {
        Ok(Path(page)) => page,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Undecodable page segment");
            lossy_segment(&uri, 4).unwrap_or_default()
        }
    };
    serve_page(&state, PageRequest::new(Some(&page), None)).await
}

/// `GET /api/filter/tags/{tagname}`
pub async fn list_posts_by_tag(
    State(state): State<AppState>,
    Path(tag): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Json<Page<Post>>, UpstreamError> {
    let page = page_param(query.as_deref());
    serve_page(&state, PageRequest::new(page.as_deref(), Some(tag))).await
}

/// `GET /api/filter/tags/{tagname}/{page}`
pub async fn list_posts_by_tag_page(
    State(state): State<AppState>,
    uri: Uri,
    params: Result<Path<(String, String)>, PathRejection>,
) -> Result<Json<Page<Post>>, UpstreamError> {
    let (tag, page) = match params {
        Ok(Path(params)) => params,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "Undecodable tag listing segments");
            (
                lossy_segment(&uri, 4).unwrap_or_default(),
                lossy_segment(&uri, 5).unwrap_or_default(),
            )
        }
    };
    serve_page(&state, PageRequest::new(Some(&page), Some(tag))).await
}

/// First `page` pair of a raw query string.
fn page_param(query: Option<&str>) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == "page")
        .map(|(_, value)| value.into_owned())
}

/// Path segment `index` (the leading slash counts as segment 0), decoded
/// with invalid UTF-8 replaced.
fn lossy_segment(uri: &Uri, index: usize) -> Option<String> {
    let segment = uri.path().split('/').nth(index)?;
    Some(percent_decode_str(segment).decode_utf8_lossy().into_owned())
}

async fn serve_page(
    state: &AppState,
    request: PageRequest,
) -> Result<Json<Page<Post>>, UpstreamError> {
    let raw = match &request.tag {
        Some(tag) => {
            state
                .upstream
                .fetch_posts_page_by_tag(tag, request.page)
                .await?
        }
        None => state.upstream.fetch_posts_page(request.page).await?,
    };

    let page = normalize(raw);
    tracing::debug!(
        page = request.page,
        tag = request.tag.as_deref().unwrap_or(""),
        returned = page.posts.len(),
        last_page = page.last_page,
        "Served post listing"
    );
    Ok(Json(page))
}

/// `GET /api/getters/post/{slug}`
///
/// A missing post is a 200 with no `post` field.
pub async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PostBody>, UpstreamError> {
    let lookup = state.upstream.fetch_post_by_slug(&slug).await?;
    let body = PostBody::from(lookup);
    if body.post.is_none() {
        tracing::debug!(slug = %slug, "Post not found");
    }
    Ok(Json(body))
}

/// `GET /posts/{slug}/{image}`
pub async fn get_post_image(
    State(state): State<AppState>,
    Path((slug, image)): Path<(String, String)>,
) -> Result<Response, UpstreamError> {
    let upstream = state.upstream.fetch_post_image(&slug, &image).await?;
    Ok(image_response(upstream))
}

/// `GET /feed.rss`
pub async fn get_feed(State(state): State<AppState>) -> Result<Response, UpstreamError> {
    let xml = state.upstream.fetch_feed().await?;
    Ok(feed_response(xml))
}

/// `GET /health`: liveness only, never calls the blog store.
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_param_takes_first_value() {
        assert_eq!(page_param(Some("page=3&page=9")).as_deref(), Some("3"));
        assert_eq!(page_param(Some("sort=new&page=2")).as_deref(), Some("2"));
        assert_eq!(page_param(Some("pages=2")), None);
        assert_eq!(page_param(Some("")), None);
        assert_eq!(page_param(None), None);
    }

    #[test]
    fn test_page_param_never_fails_on_bad_encoding() {
        let page = page_param(Some("page=%FF")).unwrap();
        assert_eq!(PageRequest::new(Some(&page), None).page, 1);
    }

    #[test]
    fn test_lossy_segment() {
        let uri: Uri = "/api/filter/tags/web%20dev/%FF".parse().unwrap();
        assert_eq!(lossy_segment(&uri, 4).as_deref(), Some("web dev"));
        assert_eq!(lossy_segment(&uri, 5).as_deref(), Some("\u{FFFD}"));
        assert_eq!(lossy_segment(&uri, 6), None);

        let page = lossy_segment(&uri, 5).unwrap();
        assert_eq!(PageRequest::new(Some(&page), None).page, 1);
    }
}
