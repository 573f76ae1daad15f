//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and the blog store client produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (fmt layer)
//!     → Prometheus scrape on observability.metrics_address
//! ```
//!
//! # Design Decisions
//! - Request ID is attached by the http layer and shows up in access spans
//! - Metrics are labelled by route pattern, never by raw path

pub mod logging;
pub mod metrics;
