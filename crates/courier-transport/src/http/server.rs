//! Webhook HTTP server.
//!
//! Accepts `POST <path>` deliveries, decodes them into an [`EventBatch`] and
//! hands the batch to a [`BatchSink`]. The response status reflects the
//! outcome:
//!
//! | Outcome                        | Status |
//! |--------------------------------|--------|
//! | batch dispatched               | 200    |
//! | body is not a valid delivery   | 400    |
//! | a handler failed               | 500    |

use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use courier_core::{BatchSink, BoxedSink, EventBatch, TransportResult};
use tracing::{debug, error, info, trace};

use crate::listener::ListenerHandle;

/// HTTP webhook server.
#[derive(Debug, Default, Clone, Copy)]
pub struct WebhookServer;

impl WebhookServer {
    /// Creates a new webhook server.
    pub fn new() -> Self {
        Self
    }

    /// Binds `addr` and serves deliveries on `path` until the handle is stopped.
    pub async fn listen(
        &self,
        addr: &str,
        path: &str,
        sink: BoxedSink,
    ) -> TransportResult<ListenerHandle> {
        let path = normalize_path(path);
        let router = webhook_router(&path, sink);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        let actual_addr = listener.local_addr()?;

        info!(addr = %actual_addr, path = %path, "Webhook server listening");

        let (shutdown_tx, mut shutdown_rx) = tokio::sync::oneshot::channel();

        tokio::spawn(async move {
            let server = axum::serve(listener, router);

            tokio::select! {
                result = server => {
                    if let Err(e) = result {
                        error!(error = %e, "Webhook server error");
                    }
                }
                _ = &mut shutdown_rx => {
                    info!("Webhook server shutting down");
                }
            }
        });

        Ok(ListenerHandle::new(actual_addr, shutdown_tx))
    }
}

struct ServerState {
    sink: BoxedSink,
}

/// Builds the webhook router without binding a socket.
pub fn webhook_router(path: &str, sink: BoxedSink) -> Router {
    let state = Arc::new(ServerState { sink });
    Router::new()
        .route(&normalize_path(path), post(webhook_handler))
        .with_state(state)
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

async fn webhook_handler(State(state): State<Arc<ServerState>>, body: Bytes) -> Response {
    trace!(len = body.len(), "Received webhook POST");

    let batch = match EventBatch::decode(&body) {
        Ok(batch) => batch,
        Err(e) => {
            error!(error = %e, "Rejected malformed webhook delivery");
            return (StatusCode::BAD_REQUEST, "invalid delivery").into_response();
        }
    };

    let events = batch.len();
    match state.sink.deliver(batch).await {
        Ok(()) => {
            debug!(events, "Webhook delivery dispatched");
            (StatusCode::OK, "ok").into_response()
        }
        Err(e) => {
            error!(error = %e, "Webhook delivery failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "handler failed").into_response()
        }
    }
}
