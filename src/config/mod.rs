//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional, path from GATEWAY_CONFIG)
//!     → loader.rs (parse & deserialize, env overrides: BLOG_DB, GATEWAY_BIND_ADDR)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → cloned into the subsystems at startup
//! ```
//!
//! # Design Decisions
//! - Config is read once at process start and never mutated
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_from_env, ConfigError};
pub use schema::GatewayConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::UpstreamConfig;
