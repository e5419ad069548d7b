//! Static handler registry.
//!
//! Three independent tables keyed by [`EventKind`]: pre hooks, primary
//! handlers and post hooks. Each table holds at most one handler per kind;
//! registering again replaces the previous handler.

use std::collections::HashMap;
use std::fmt;

use courier_core::EventKind;
use tracing::debug;

use crate::handler::BoxedHandler;

/// Which table of the registry a handler lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Runs before the primary handler.
    Pre,
    /// The main handler for an event kind.
    Primary,
    /// Runs after the primary handler and payload routing.
    Post,
}

impl Stage {
    /// Returns a short name for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pre => "pre",
            Self::Primary => "primary",
            Self::Post => "post",
        }
    }
}

/// Per-kind handler tables.
#[derive(Default, Clone)]
pub struct HandlerRegistry {
    pre: HashMap<EventKind, BoxedHandler>,
    primary: HashMap<EventKind, BoxedHandler>,
    post: HashMap<EventKind, BoxedHandler>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn table(&self, stage: Stage) -> &HashMap<EventKind, BoxedHandler> {
        match stage {
            Stage::Pre => &self.pre,
            Stage::Primary => &self.primary,
            Stage::Post => &self.post,
        }
    }

    fn table_mut(&mut self, stage: Stage) -> &mut HashMap<EventKind, BoxedHandler> {
        match stage {
            Stage::Pre => &mut self.pre,
            Stage::Primary => &mut self.primary,
            Stage::Post => &mut self.post,
        }
    }

    /// Registers `handler` for `kind`, returning the handler it replaced.
    pub fn set(
        &mut self,
        stage: Stage,
        kind: EventKind,
        handler: BoxedHandler,
    ) -> Option<BoxedHandler> {
        let previous = self.table_mut(stage).insert(kind, handler);
        if previous.is_some() {
            debug!(stage = stage.as_str(), %kind, "Replaced existing handler");
        }
        previous
    }

    /// Returns the handler registered for exactly `kind`.
    pub fn get(&self, stage: Stage, kind: EventKind) -> Option<&BoxedHandler> {
        self.table(stage).get(&kind)
    }

    /// Returns `true` if a handler is registered for `kind`.
    pub fn contains(&self, stage: Stage, kind: EventKind) -> bool {
        self.table(stage).contains_key(&kind)
    }

    /// Returns the number of handlers in one table.
    pub fn len(&self, stage: Stage) -> usize {
        self.table(stage).len()
    }

    /// Returns `true` if no table holds a handler.
    pub fn is_empty(&self) -> bool {
        self.pre.is_empty() && self.primary.is_empty() && self.post.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("pre", &self.pre.keys().collect::<Vec<_>>())
            .field("primary", &self.primary.keys().collect::<Vec<_>>())
            .field("post", &self.post.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::into_handler;
    use courier_core::{Envelope, Event, MessageEvent};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting(counter: &Arc<AtomicUsize>, amount: usize) -> BoxedHandler {
        let counter = Arc::clone(counter);
        into_handler(move || {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(amount, Ordering::SeqCst);
            }
        })
    }

    #[test]
    fn test_miss_is_none() {
        let registry = HandlerRegistry::new();
        assert!(registry.get(Stage::Primary, EventKind::Message).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_tables_are_independent() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut registry = HandlerRegistry::new();
        registry.set(Stage::Pre, EventKind::Read, counting(&counter, 1));

        assert!(registry.contains(Stage::Pre, EventKind::Read));
        assert!(!registry.contains(Stage::Primary, EventKind::Read));
        assert!(!registry.contains(Stage::Post, EventKind::Read));
        assert_eq!(registry.len(Stage::Pre), 1);
    }

    #[tokio::test]
    async fn test_last_registration_wins() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut registry = HandlerRegistry::new();

        assert!(
            registry
                .set(Stage::Primary, EventKind::Message, counting(&counter, 1))
                .is_none()
        );
        assert!(
            registry
                .set(Stage::Primary, EventKind::Message, counting(&counter, 10))
                .is_some()
        );

        let event: Arc<Event> =
            Arc::new(MessageEvent::text(Envelope::new("u", "p"), "m1", "hi").into());
        let handler = registry.get(Stage::Primary, EventKind::Message).unwrap();
        handler(event).await.unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 10);
        assert_eq!(registry.len(Stage::Primary), 1);
    }
}
