//! Blog gateway library.
//!
//! Sits between browser clients and the blog store, turning page, tag, and
//! slug requests into blog store queries and reshaping the answers.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pagination;
pub mod upstream;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
