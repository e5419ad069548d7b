//! # Courier Transport
//!
//! The network edge of Courier: an HTTP endpoint that receives webhook
//! deliveries and hands decoded batches to a [`BatchSink`](courier_core::BatchSink).
//!
//! ## Features
//!
//! - `http-server`: the axum-based [`WebhookServer`]
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │  courier-framework  │  (Dispatcher implements BatchSink)
//! ├─────────────────────┤
//! │  courier-transport  │  <- This crate (decode + status mapping)
//! ├─────────────────────┤
//! │  Network (TCP/HTTP) │
//! └─────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use courier_transport::WebhookServer;
//!
//! let handle = WebhookServer::new()
//!     .listen("0.0.0.0:8080", "/webhook", Arc::new(dispatcher))
//!     .await?;
//!
//! // ... later
//! handle.stop();
//! ```

#[cfg(feature = "http-server")]
pub mod http;
pub mod listener;

#[cfg(feature = "http-server")]
pub use http::{WebhookServer, webhook_router};
pub use listener::ListenerHandle;
