//! Configuration module for the Courier runtime.
//!
//! Layered loading through figment, a typed schema for logging, dispatch
//! and webhook settings, and validation of the merged result.

pub mod error;
pub mod loader;
pub mod schema;
pub mod validation;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile};
pub use schema::{
    CourierConfig, DispatchConfig, LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig,
    SpanEventConfig, WebhookConfig,
};
pub use validation::validate_config;
