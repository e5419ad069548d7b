//! Listener lifecycle.

use std::net::SocketAddr;

use tokio::sync::oneshot;

/// Handle to a running listener.
///
/// Dropping the handle stops the listener, same as calling [`stop`](Self::stop).
#[derive(Debug)]
pub struct ListenerHandle {
    local_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl ListenerHandle {
    /// Creates a new listener handle.
    pub fn new(local_addr: SocketAddr, shutdown_tx: oneshot::Sender<()>) -> Self {
        Self {
            local_addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Returns the address the listener is actually bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stops the listener.
    pub fn stop(mut self) {
        self.signal();
    }

    fn signal(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.signal();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_stop_and_drop_signal_shutdown() {
        let addr: SocketAddr = "127.0.0.1:8080".parse().unwrap();

        let (tx, rx) = oneshot::channel();
        let handle = ListenerHandle::new(addr, tx);
        assert_eq!(handle.local_addr(), addr);
        handle.stop();
        assert!(rx.await.is_ok());

        let (tx, rx) = oneshot::channel();
        drop(ListenerHandle::new(addr, tx));
        assert!(rx.await.is_ok());
    }
}
