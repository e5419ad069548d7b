//! Runtime orchestration.
//!
//! [`CourierRuntime`] owns a frozen [`Dispatcher`] and the webhook listener
//! feeding it.
//!
//! ```rust,ignore
//! use courier_runtime::{CourierRuntime, config::ConfigLoader};
//!
//! let config = ConfigLoader::new().load()?;
//! let mut dispatcher = config.dispatch.dispatcher();
//! dispatcher.on(EventKind::Message, on_message);
//!
//! CourierRuntime::from_config(config, dispatcher)?.run().await?;
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use courier_core::BoxedSink;
use courier_framework::Dispatcher;
use courier_transport::{ListenerHandle, WebhookServer};
use tokio::signal;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::config::{ConfigLoader, CourierConfig, validate_config};
use crate::error::{RuntimeError, RuntimeResult};
use crate::logging;

/// The Courier runtime.
pub struct CourierRuntime {
    config: CourierConfig,
    dispatcher: Arc<Dispatcher>,
    listener: Mutex<Option<ListenerHandle>>,
}

impl CourierRuntime {
    /// Creates a runtime from a validated configuration.
    ///
    /// Initializes logging from `config.logging` unless a subscriber is
    /// already installed.
    pub fn from_config(config: CourierConfig, dispatcher: Dispatcher) -> RuntimeResult<Self> {
        validate_config(&config)?;
        logging::init_from_config(&config.logging);

        if dispatcher.mode() != config.dispatch.mode {
            warn!(
                configured = ?config.dispatch.mode,
                actual = ?dispatcher.mode(),
                "Dispatcher mode differs from configuration"
            );
        }

        info!(
            log_level = %config.logging.level,
            dispatch_mode = ?dispatcher.mode(),
            "Runtime initialized from configuration"
        );

        Ok(Self {
            config,
            dispatcher: Arc::new(dispatcher),
            listener: Mutex::new(None),
        })
    }

    /// Loads configuration from the default locations and builds a runtime.
    pub fn load(dispatcher: Dispatcher) -> RuntimeResult<Self> {
        let config = ConfigLoader::new().load()?;
        Self::from_config(config, dispatcher)
    }

    /// Returns the configuration.
    pub fn config(&self) -> &CourierConfig {
        &self.config
    }

    /// Returns the shared dispatcher.
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Returns whether the webhook receiver is running.
    pub async fn is_running(&self) -> bool {
        self.listener.lock().await.is_some()
    }

    /// Returns the receiver's bound address while running.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.listener
            .lock()
            .await
            .as_ref()
            .map(ListenerHandle::local_addr)
    }

    /// Starts the webhook receiver.
    pub async fn start(&self) -> RuntimeResult<()> {
        let mut listener = self.listener.lock().await;
        if listener.is_some() {
            warn!("Runtime is already running");
            return Ok(());
        }

        let webhook = &self.config.webhook;
        let sink: BoxedSink = self.dispatcher.clone();
        let handle = WebhookServer::new()
            .listen(&webhook.addr(), &webhook.path, sink)
            .await?;

        info!(addr = %handle.local_addr(), path = %webhook.path, "Runtime started");
        *listener = Some(handle);
        Ok(())
    }

    /// Stops the webhook receiver.
    pub async fn stop(&self) {
        match self.listener.lock().await.take() {
            Some(handle) => {
                handle.stop();
                info!("Runtime stopped");
            }
            None => warn!("Runtime is not running"),
        }
    }

    /// Runs until Ctrl+C or SIGTERM.
    pub async fn run(&self) -> RuntimeResult<()> {
        self.start().await?;
        info!("Courier is now running. Press Ctrl+C to stop.");

        let result = wait_for_shutdown().await;
        self.stop().await;
        result
    }

    /// Runs until `shutdown` completes.
    pub async fn run_until<F>(&self, shutdown: F) -> RuntimeResult<()>
    where
        F: std::future::Future<Output = ()>,
    {
        self.start().await?;
        shutdown.await;
        self.stop().await;
        Ok(())
    }
}

impl std::fmt::Debug for CourierRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CourierRuntime")
            .field("config", &self.config)
            .field("dispatcher", &self.dispatcher)
            .finish_non_exhaustive()
    }
}

async fn wait_for_shutdown() -> RuntimeResult<()> {
    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
            .map_err(RuntimeError::Signal)?;

        tokio::select! {
            result = signal::ctrl_c() => {
                result.map_err(RuntimeError::Signal)?;
                info!("Received Ctrl+C, shutting down");
            }
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
            }
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c().await.map_err(RuntimeError::Signal)?;
        info!("Received Ctrl+C, shutting down");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::{Event, EventKind};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn local_config() -> CourierConfig {
        let mut config = CourierConfig::default();
        config.webhook.host = "127.0.0.1".to_string();
        // Any free port; validation only rejects 0.
        config.webhook.port = free_port();
        config
    }

    fn free_port() -> u16 {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = CourierConfig::default();
        config.webhook.path = "no-slash".to_string();
        let result = CourierRuntime::from_config(config, Dispatcher::new());
        assert!(matches!(result, Err(RuntimeError::Config(_))));
    }

    #[tokio::test]
    async fn test_start_and_stop() {
        let runtime = CourierRuntime::from_config(local_config(), Dispatcher::new()).unwrap();
        assert!(!runtime.is_running().await);

        runtime.start().await.unwrap();
        assert!(runtime.is_running().await);
        assert!(runtime.local_addr().await.is_some());

        // Second start is a no-op.
        runtime.start().await.unwrap();

        runtime.stop().await;
        assert!(!runtime.is_running().await);
        assert!(runtime.local_addr().await.is_none());
    }

    #[tokio::test]
    async fn test_run_until_serves_webhooks() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        let mut dispatcher = Dispatcher::new();
        dispatcher.on(EventKind::Read, move |_event: Arc<Event>| {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });

        let config = local_config();
        let addr = config.webhook.addr();
        let runtime = CourierRuntime::from_config(config, dispatcher).unwrap();

        let client = async {
            let body = r#"{"object":"page","entry":[{"messaging":[{"sender":{"id":"u"},"recipient":{"id":"p"},"read":{"watermark":1}}]}]}"#;
            let request = format!(
                "POST /webhook HTTP/1.1\r\nHost: localhost\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );

            // The listener is bound before the shutdown future is polled.
            let mut stream = tokio::net::TcpStream::connect(&addr).await.unwrap();
            stream.write_all(request.as_bytes()).await.unwrap();
            let mut response = String::new();
            stream.read_to_string(&mut response).await.unwrap();
            assert!(response.starts_with("HTTP/1.1 200"), "{response}");
        };

        runtime.run_until(client).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(!runtime.is_running().await);
    }
}
