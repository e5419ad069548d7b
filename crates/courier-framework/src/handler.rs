//! Handler system for Courier.
//!
//! A handler is any async function that takes either nothing or the
//! `Arc<Event>` being dispatched, and returns `()` or a `Result`:
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use courier_core::Event;
//!
//! async fn on_any() {
//!     tracing::info!("something happened");
//! }
//!
//! async fn on_postback(event: Arc<Event>) -> Result<(), std::io::Error> {
//!     tracing::info!(payload = ?event.payload(), "button tapped");
//!     Ok(())
//! }
//! ```
//!
//! Handlers are type-erased into a [`BoxedHandler`] at registration time, so
//! every registry stores the same shape regardless of the original signature.

use std::future::Future;
use std::sync::Arc;

use courier_core::{BoxError, Event, HandlerError, HandlerResult};
use futures::future::BoxFuture;

// ============================================================================
// HandlerResponse - Handle handler return values
// ============================================================================

/// A type that a handler may return.
///
/// `()` always succeeds; `Result<(), E>` fails with `E` wrapped in a
/// [`HandlerError`].
pub trait HandlerResponse: Send {
    /// Converts the return value into a handler result.
    fn into_result(self) -> HandlerResult;
}

impl HandlerResponse for () {
    fn into_result(self) -> HandlerResult {
        Ok(())
    }
}

impl<E> HandlerResponse for Result<(), E>
where
    E: Into<BoxError> + Send,
{
    fn into_result(self) -> HandlerResult {
        self.map_err(HandlerError::new)
    }
}

// ============================================================================
// Handler Trait
// ============================================================================

/// The core trait for event handlers.
///
/// Implemented for async functions and closures of the shapes
/// `Fn() -> Fut` and `Fn(Arc<Event>) -> Fut`. The type parameter only
/// disambiguates the two blanket implementations.
pub trait Handler<T>: Clone + Send + Sync + 'static {
    /// Calls the handler for one event.
    fn call(self, event: Arc<Event>) -> BoxFuture<'static, HandlerResult>;
}

impl<F, Fut, Res> Handler<()> for F
where
    F: FnOnce() -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Res> + Send + 'static,
    Res: HandlerResponse + 'static,
{
    fn call(self, _event: Arc<Event>) -> BoxFuture<'static, HandlerResult> {
        Box::pin(async move { self().await.into_result() })
    }
}

impl<F, Fut, Res> Handler<(Arc<Event>,)> for F
where
    F: FnOnce(Arc<Event>) -> Fut + Clone + Send + Sync + 'static,
    Fut: Future<Output = Res> + Send + 'static,
    Res: HandlerResponse + 'static,
{
    fn call(self, event: Arc<Event>) -> BoxFuture<'static, HandlerResult> {
        Box::pin(async move { self(event).await.into_result() })
    }
}

// ============================================================================
// BoxedHandler - Type-erased handler stored in registries
// ============================================================================

/// A type-erased handler that can be stored in collections.
///
/// Internally a closure that captures the original handler and calls a
/// clone of it on each invocation.
pub type BoxedHandler = Arc<dyn Fn(Arc<Event>) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// Converts a handler function into a boxed handler.
pub fn into_handler<H, T>(handler: H) -> BoxedHandler
where
    H: Handler<T>,
    T: 'static,
{
    Arc::new(move |event| handler.clone().call(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::{Envelope, PostbackEvent};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn event() -> Arc<Event> {
        Arc::new(PostbackEvent::new(Envelope::new("user", "page"), "menu:start").into())
    }

    #[tokio::test]
    async fn test_unit_handler_without_arguments() {
        let counter = Arc::new(AtomicUsize::new(0));
        let c = Arc::clone(&counter);
        let handler = into_handler(move || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
            }
        });

        handler(event()).await.unwrap();
        handler(event()).await.unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_handler_receives_event() {
        let handler = into_handler(|event: Arc<Event>| async move {
            assert_eq!(event.payload(), Some("menu:start"));
        });
        assert!(handler(event()).await.is_ok());
    }

    #[tokio::test]
    async fn test_result_error_becomes_handler_error() {
        let handler = into_handler(|_event: Arc<Event>| async move {
            Err::<(), _>(std::io::Error::other("disk on fire"))
        });
        let err = handler(event()).await.unwrap_err();
        assert_eq!(err.to_string(), "disk on fire");
    }
}
