//! # Courier
//!
//! A typed dispatcher for Messenger-style webhook events.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐     ┌───────────────┐     ┌─────────────────────────────────────┐
//! │   Webhook    │────▶│  EventBatch   │────▶│ Dispatcher                          │
//! │  (axum POST) │     │  (decoded)    │     │  pre hook → primary → route → post  │
//! └──────────────┘     └───────────────┘     └─────────────────────────────────────┘
//!                                                       │ route
//!                                     ┌─────────────────┴─────────────────┐
//!                                     ▼                                   ▼
//!                          DynamicResolver ("mod:fn")        PatternRegistry (regex)
//! ```
//!
//! - **Events**: one typed variant per Messenger callback kind
//! - **Handlers**: async functions taking nothing or `Arc<Event>`
//! - **Routing**: quick-reply and postback payloads go either to a named
//!   `module:function` handler or to every matching regex rule
//! - **Runtime**: config, logging and the webhook listener
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use courier::prelude::*;
//!
//! async fn on_start(event: Arc<Event>) {
//!     tracing::info!(sender = event.sender_id(), "started");
//! }
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
//!
//! ## Features
//!
//! - `toml-config` *(default)*: TOML configuration files
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use courier_core as core;
pub use courier_framework as framework;
pub use courier_runtime as runtime;
pub use courier_transport as transport;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use courier::prelude::*;
/// ```
pub mod prelude {
    pub use std::sync::Arc;

    // Runtime - main entry point
    pub use courier_runtime::{ConfigLoader, CourierConfig, CourierRuntime};

    // Events
    pub use courier_core::{Event, EventBatch, EventKind, MessageEvent, PostbackEvent};

    // Dispatch
    pub use courier_framework::{DispatchMode, Dispatcher, PatternTargets};

    // Errors handlers may return
    pub use courier_core::HandlerError;
}
