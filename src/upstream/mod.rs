//! Blog store integration subsystem.
//!
//! # Data Flow
//! ```text
//! Handler (slug / tag / page / image)
//!     → client.rs (URL building, one GET under a deadline)
//!     → types.rs (Post, PostLookup, UpstreamImage, UpstreamError)
//!     → back to the handler for normalizing and encoding
//! ```
//!
//! # Constraints
//! - Blog store address comes from configuration (`BLOG_DB`)
//! - One upstream call per inbound request, no retries
//! - Dropping the caller's future cancels the upstream call

pub mod client;
pub mod types;

pub use client::BlogStoreClient;
pub use types::{Post, PostLookup, UpstreamError, UpstreamImage, UpstreamResult};
