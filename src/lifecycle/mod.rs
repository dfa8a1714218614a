//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → health/cache/client → spawn refresher → bind HTTP
//!
//! Shutdown (shutdown.rs):
//!     SIGINT/SIGTERM → broadcast → refresher exits loop, server drains → exit
//! ```

pub mod shutdown;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{run, StartupError};
