//! HTTP webhook receiver.

#[cfg(feature = "http-server")]
mod server;
#[cfg(feature = "http-server")]
pub use server::{WebhookServer, webhook_router};
