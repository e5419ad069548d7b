//! Courier Runtime - Orchestration layer for the Courier webhook dispatcher.
//!
//! This crate provides:
//! - Layered configuration loading (`ConfigLoader`, `CourierConfig`)
//! - Logging initialization (`LoggingBuilder`)
//! - Runtime orchestration (`CourierRuntime`): serves the webhook endpoint
//!   and feeds every delivery into a `Dispatcher`
//!
//! ```ignore
//! use courier_runtime::{ConfigLoader, CourierRuntime};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::new().load()?;
//!     let mut dispatcher = config.dispatch.dispatcher();
//!     dispatcher.route("menu", "start", on_start)?;
//!
//!     CourierRuntime::from_config(config, dispatcher)?.run().await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod runtime;

pub use config::{ConfigError, ConfigLoader, ConfigResult, CourierConfig};
pub use error::{RuntimeError, RuntimeResult};
pub use logging::{LoggingBuilder, SpanEvents};
pub use runtime::CourierRuntime;

// Re-export tracing for use by handlers
pub use tracing;

/// Prelude module for convenient logging imports.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
