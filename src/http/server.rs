//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router holding the full route table
//! - Wire up middleware (request ID, tracing, timeout, metrics)
//! - Bind server to listener and shut down gracefully

use std::time::Duration;

use axum::{middleware, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::GatewayConfig;
use crate::http::handlers;
use crate::http::request::{make_request_span, propagate_request_id_layer, set_request_id_layer};
use crate::http::response::not_found;
use crate::lifecycle::shutdown;
use crate::observability::metrics::track_requests;
use crate::upstream::{BlogStoreClient, UpstreamResult};

/// Application state injected into handlers.
///
/// Read-only after startup; the client's connection pool is the only
/// thing shared between requests.
#[derive(Clone, Debug)]
pub struct AppState {
    pub upstream: BlogStoreClient,
}

/// HTTP server for the blog gateway.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: GatewayConfig) -> UpstreamResult<Self> {
        let upstream = BlogStoreClient::new(&config.upstream)?;
        let state = AppState { upstream };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// This is the whole external contract of the gateway:
    ///
    /// | Route                                  | Upstream call                   |
    /// |----------------------------------------|---------------------------------|
    /// | `/api/getters/posts[/{page}]`          | `GET /posts/{page}`             |
    /// | `/api/filter/tags/{tagname}[/{page}]`  | `GET /filter/tags/{tag}?page=n` |
    /// | `/api/getters/post/{slug}`             | `GET /post/{slug}`              |
    /// | `/posts/{slug}/{image}`                | `GET /post/{slug}/{image}`      |
    /// | `/feed.rss`                            | `GET /feed.rss`                 |
    /// | `/health`                              | none                            |
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        Router::new()
            .route("/api/getters/posts", get(handlers::list_posts))
            .route("/api/getters/posts/{page}", get(handlers::list_posts_page))
            .route("/api/filter/tags/{tagname}", get(handlers::list_posts_by_tag))
            .route(
                "/api/filter/tags/{tagname}/{page}",
                get(handlers::list_posts_by_tag_page),
            )
            .route("/api/getters/post/{slug}", get(handlers::get_post))
            .route("/posts/{slug}/{image}", get(handlers::get_post_image))
            .route("/feed.rss", get(handlers::get_feed))
            .route("/health", get(handlers::health))
            .fallback(not_found)
            .with_state(state)
            .route_layer(middleware::from_fn(track_requests))
            .layer(
                ServiceBuilder::new()
                    .layer(set_request_id_layer())
                    .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
                    .layer(propagate_request_id_layer())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            )
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            blog_db = %self.config.upstream.blog_db,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}
