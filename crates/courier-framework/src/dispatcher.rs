//! Event dispatcher for Courier.
//!
//! The [`Dispatcher`] owns every registry and walks a decoded
//! [`EventBatch`] strictly in order. For each event:
//!
//! 1. the pre hook for its kind runs, if any
//! 2. the primary handler for its kind runs, if any (a miss is only logged)
//! 3. quick-reply messages and postbacks are routed by payload, either
//!    through the [`DynamicResolver`] or through the [`PatternRegistry`]
//!    depending on the dispatcher's [`DispatchMode`]
//! 4. the post hook for its kind runs, if any
//!
//! Every handler is awaited before the next one starts. The first handler
//! error aborts the batch and is returned to the caller; routing misses
//! never are.
//!
//! ```rust,ignore
//! use courier_framework::{Dispatcher, DispatchMode, PatternTargets};
//! use courier_core::EventKind;
//!
//! let mut dispatcher = Dispatcher::with_mode(DispatchMode::Pattern);
//! dispatcher
//!     .on(EventKind::Message, log_message)
//!     .on_pattern(["COLOR_.*"], PatternTargets::ALL, on_color)?;
//!
//! dispatcher.dispatch(&batch).await?;
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use courier_core::{
    BatchSink, ConfigurationError, DispatchError, DispatchResult, Event, EventBatch, EventKind,
    HandlerResult,
};
use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, debug_span, trace_span, warn};

use crate::handler::{BoxedHandler, Handler, into_handler};
use crate::pattern::{PatternRegistry, PatternSet, PatternTargets};
use crate::registry::{HandlerRegistry, Stage};
use crate::resolver::DynamicResolver;

/// How payload-carrying events are routed.
///
/// Fixed per dispatcher; never inferred from the payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// Treat payloads as `module:function` references into the resolver.
    #[default]
    Dynamic,
    /// Invoke every pattern rule whose pattern matches the payload.
    Pattern,
}

/// The central event dispatcher.
///
/// Registration methods take `&mut self` and are meant for startup;
/// [`dispatch`](Self::dispatch) takes `&self`, so a built dispatcher can be
/// shared behind an `Arc` by every request.
#[derive(Default, Clone)]
pub struct Dispatcher {
    mode: DispatchMode,
    handlers: HandlerRegistry,
    patterns: PatternRegistry,
    resolver: DynamicResolver,
    unresolved: Option<BoxedHandler>,
}

impl Dispatcher {
    /// Creates an empty dispatcher in [`DispatchMode::Dynamic`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty dispatcher with the given routing mode.
    pub fn with_mode(mode: DispatchMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// Returns the routing mode.
    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    /// Sets the primary handler for `kind`, replacing any previous one.
    pub fn on<H, T>(&mut self, kind: EventKind, handler: H) -> &mut Self
    where
        H: Handler<T>,
        T: 'static,
    {
        self.handlers.set(Stage::Primary, kind, into_handler(handler));
        self
    }

    /// Sets the hook that runs before the primary handler for `kind`.
    pub fn on_pre<H, T>(&mut self, kind: EventKind, handler: H) -> &mut Self
    where
        H: Handler<T>,
        T: 'static,
    {
        self.handlers.set(Stage::Pre, kind, into_handler(handler));
        self
    }

    /// Sets the hook that runs after routing for `kind`.
    pub fn on_post<H, T>(&mut self, kind: EventKind, handler: H) -> &mut Self
    where
        H: Handler<T>,
        T: 'static,
    {
        self.handlers.set(Stage::Post, kind, into_handler(handler));
        self
    }

    /// Routes payloads matching any of `patterns` to `handler`.
    ///
    /// Only consulted in [`DispatchMode::Pattern`].
    pub fn on_pattern<I, S, H, T>(
        &mut self,
        patterns: I,
        targets: PatternTargets,
        handler: H,
    ) -> Result<&mut Self, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        H: Handler<T>,
        T: 'static,
    {
        self.patterns
            .register(patterns, targets, into_handler(handler))?;
        Ok(self)
    }

    /// Registers `handler` as the target of payload `module:function`.
    ///
    /// Only consulted in [`DispatchMode::Dynamic`].
    pub fn route<H, T>(
        &mut self,
        module: impl Into<String>,
        function: impl Into<String>,
        handler: H,
    ) -> Result<&mut Self, ConfigurationError>
    where
        H: Handler<T>,
        T: 'static,
    {
        self.resolver
            .register(module, function, into_handler(handler))?;
        Ok(self)
    }

    /// Sets the handler that receives events whose payload cannot be resolved.
    pub fn on_unresolved<H, T>(&mut self, handler: H) -> &mut Self
    where
        H: Handler<T>,
        T: 'static,
    {
        self.unresolved = Some(into_handler(handler));
        self
    }

    /// Returns the static handler registry.
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.handlers
    }

    /// Returns the pattern registry.
    pub fn patterns(&self) -> &PatternRegistry {
        &self.patterns
    }

    /// Returns the dynamic resolver.
    pub fn resolver(&self) -> &DynamicResolver {
        &self.resolver
    }

    /// Dispatches every event of `batch`, in order.
    ///
    /// Returns the first handler error, tagged with the index and kind of
    /// the event being processed. Events after the failing one are not
    /// dispatched.
    pub async fn dispatch(&self, batch: &EventBatch) -> DispatchResult<()> {
        let span = debug_span!("dispatch", events = batch.len(), mode = ?self.mode);

        async {
            for (index, event) in batch.iter().enumerate() {
                let kind = event.kind();
                self.dispatch_event(event)
                    .instrument(trace_span!("event", index, %kind))
                    .await
                    .map_err(|source| DispatchError::Handler {
                        index,
                        kind,
                        source,
                    })?;
            }
            debug!("Batch dispatched");
            Ok::<(), DispatchError>(())
        }
        .instrument(span)
        .await
    }

    async fn dispatch_event(&self, event: &Arc<Event>) -> HandlerResult {
        let kind = event.kind();

        if let Some(hook) = self.handlers.get(Stage::Pre, kind) {
            hook(Arc::clone(event)).await?;
        }

        match self.handlers.get(Stage::Primary, kind) {
            Some(handler) => handler(Arc::clone(event)).await?,
            None => warn!(%kind, "No handler registered for event kind"),
        }

        let set = match event.as_ref() {
            Event::Message(message) if message.is_quick_reply() => Some(PatternSet::QuickReply),
            Event::Postback(_) => Some(PatternSet::Button),
            _ => None,
        };
        if let (Some(set), Some(payload)) = (set, event.payload()) {
            self.route_payload(event, set, payload).await?;
        }

        if let Some(hook) = self.handlers.get(Stage::Post, kind) {
            hook(Arc::clone(event)).await?;
        }

        Ok(())
    }

    async fn route_payload(&self, event: &Arc<Event>, set: PatternSet, payload: &str) -> HandlerResult {
        match self.mode {
            DispatchMode::Dynamic => self.resolve_payload(event, payload).await,
            DispatchMode::Pattern => {
                let matched = self.patterns.matching(set, payload);
                if matched.is_empty() {
                    debug!(payload, ?set, "No pattern matched payload");
                }
                for handler in matched {
                    handler(Arc::clone(event)).await?;
                }
                Ok(())
            }
        }
    }

    async fn resolve_payload(&self, event: &Arc<Event>, payload: &str) -> HandlerResult {
        match self.resolver.resolve(payload) {
            Ok(handler) => handler(Arc::clone(event)).await,
            Err(err) => match &self.unresolved {
                Some(fallback) => {
                    debug!(error = %err, "Routing event to unresolved-route handler");
                    fallback(Arc::clone(event)).await
                }
                None if err.is_unresolved() => {
                    warn!(error = %err, "Dropping event with unresolved route");
                    Ok(())
                }
                None => {
                    warn!(error = %err, payload, "Dropping event with malformed route payload");
                    Ok(())
                }
            },
        }
    }
}

#[async_trait]
impl BatchSink for Dispatcher {
    async fn deliver(&self, batch: EventBatch) -> DispatchResult<()> {
        self.dispatch(&batch).await
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("mode", &self.mode)
            .field("handlers", &self.handlers)
            .field("patterns", &self.patterns)
            .field("resolver", &self.resolver)
            .field("has_unresolved", &self.unresolved.is_some())
            .finish()
    }
}
