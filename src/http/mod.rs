//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, route table, middleware)
//!     → request.rs (request ID, access span)
//!     → handlers.rs (page coercion, one blog store call)
//!     → [pagination normalizer for listings]
//!     → response.rs (JSON / streamed image / feed, error mapping)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, HttpServer};
