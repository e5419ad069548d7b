//! Tower integration for the dispatcher.
//!
//! [`DispatchService`] implements `tower::Service<EventBatch>`, so a built
//! [`Dispatcher`] can sit behind ordinary tower middleware:
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use tower::ServiceBuilder;
//! use tower::timeout::TimeoutLayer;
//!
//! let service = ServiceBuilder::new()
//!     .layer(TimeoutLayer::new(Duration::from_secs(10)))
//!     .service(dispatcher.into_service());
//! ```

use std::sync::Arc;
use std::task::{Context, Poll};

use courier_core::{DispatchError, EventBatch};
use futures::future::BoxFuture;
use tower::Service;

use crate::dispatcher::Dispatcher;

/// A cloneable tower service over a shared [`Dispatcher`].
///
/// Always ready; each call dispatches one batch to completion.
#[derive(Debug, Clone)]
pub struct DispatchService {
    dispatcher: Arc<Dispatcher>,
}

impl DispatchService {
    /// Wraps a shared dispatcher.
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Returns the wrapped dispatcher.
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }
}

impl Service<EventBatch> for DispatchService {
    type Response = ();
    type Error = DispatchError;
    type Future = BoxFuture<'static, Result<(), DispatchError>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, batch: EventBatch) -> Self::Future {
        let dispatcher = Arc::clone(&self.dispatcher);
        Box::pin(async move { dispatcher.dispatch(&batch).await })
    }
}

impl Dispatcher {
    /// Freezes the dispatcher into a tower service.
    pub fn into_service(self) -> DispatchService {
        DispatchService::new(Arc::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::{Envelope, Event, EventKind, HandlerError, PostbackEvent};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    fn batch(payload: &str) -> EventBatch {
        EventBatch::new([Event::from(PostbackEvent::new(
            Envelope::new("u", "p"),
            payload,
        ))])
    }

    #[tokio::test]
    async fn test_oneshot_dispatches_batch() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);

        let mut dispatcher = Dispatcher::new();
        dispatcher.on(EventKind::Postback, move || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });

        let service = dispatcher.into_service();
        service.clone().oneshot(batch("a:b")).await.unwrap();
        service.oneshot(batch("a:b")).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_service_surfaces_handler_errors() {
        let mut dispatcher = Dispatcher::new();
        dispatcher
            .route("a", "b", || async { Err::<(), _>(HandlerError::msg("nope")) })
            .unwrap();

        let err = dispatcher
            .into_service()
            .oneshot(batch("a:b"))
            .await
            .unwrap_err();
        assert_eq!(err.index(), 0);
    }

    #[test]
    fn test_service_is_always_ready() {
        let mut service = Dispatcher::new().into_service();
        let mut ready = tokio_test::task::spawn(service.ready());
        assert!(ready.poll().is_ready());
    }
}
