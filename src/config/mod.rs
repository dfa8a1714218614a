//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse, deserialize, apply TIPPER_* credential overrides)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → pieces cloned into each subsystem at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; credentials never change at runtime
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::AppConfig;
pub use schema::CacheConfig;
pub use schema::ConnectivityConfig;
pub use schema::Credentials;
pub use schema::HttpConfig;
pub use schema::ObservabilityConfig;
pub use schema::RefresherConfig;
pub use schema::RetryPolicy;
pub use schema::UpstreamConfig;
