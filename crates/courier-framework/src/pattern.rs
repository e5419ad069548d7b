//! Payload pattern routing.
//!
//! A pattern rule maps a regular expression to a handler. Patterns are
//! matched against the *whole* payload: `"menu"` matches `"menu"` but not
//! `"menu:start"`. Every rule whose pattern matches is returned, in
//! registration order, so one payload may fan out to several handlers.
//!
//! ```rust,ignore
//! let mut patterns = PatternRegistry::new();
//! patterns.register(["COLOR_(RED|BLUE)"], PatternTargets::ALL, into_handler(on_color))?;
//! patterns.register(["COLOR_.*"], PatternTargets::QUICK_REPLY, into_handler(audit))?;
//!
//! // Both rules match, `on_color` first.
//! assert_eq!(patterns.match_quick_reply("COLOR_RED").len(), 2);
//! ```
//!
//! Patterns are compiled when registered, so a malformed pattern is a
//! startup error and matching never fails. Compiled matchers are memoized by
//! pattern string and shared between the two rule sets.

use std::collections::HashMap;
use std::fmt;

use courier_core::ConfigurationError;
use regex::Regex;
use tracing::trace;

use crate::handler::BoxedHandler;

/// Which rule set(s) a registration installs into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternTargets {
    /// Apply to quick-reply message payloads.
    pub quick_reply: bool,
    /// Apply to postback button payloads.
    pub button: bool,
}

impl PatternTargets {
    /// Quick replies only.
    pub const QUICK_REPLY: Self = Self {
        quick_reply: true,
        button: false,
    };

    /// Postback buttons only.
    pub const BUTTON: Self = Self {
        quick_reply: false,
        button: true,
    };

    /// Both quick replies and postback buttons.
    pub const ALL: Self = Self {
        quick_reply: true,
        button: true,
    };
}

impl Default for PatternTargets {
    fn default() -> Self {
        Self::ALL
    }
}

/// One of the two rule sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternSet {
    /// Rules applied to quick-reply message payloads.
    QuickReply,
    /// Rules applied to postback payloads.
    Button,
}

#[derive(Clone)]
struct PatternRule {
    pattern: String,
    matcher: Regex,
    handler: BoxedHandler,
}

#[derive(Default, Clone)]
struct RuleSet {
    rules: Vec<PatternRule>,
}

impl RuleSet {
    /// Replaces the handler of an existing pattern in place, or appends a new rule.
    fn insert(&mut self, pattern: &str, matcher: &Regex, handler: &BoxedHandler) {
        if let Some(rule) = self.rules.iter_mut().find(|r| r.pattern == pattern) {
            rule.handler = handler.clone();
        } else {
            self.rules.push(PatternRule {
                pattern: pattern.to_string(),
                matcher: matcher.clone(),
                handler: handler.clone(),
            });
        }
    }

    fn matching<'a>(&'a self, payload: &str) -> Vec<&'a BoxedHandler> {
        self.rules
            .iter()
            .filter(|rule| rule.matcher.is_match(payload))
            .inspect(|rule| trace!(pattern = %rule.pattern, payload, "Pattern matched"))
            .map(|rule| &rule.handler)
            .collect()
    }

    fn patterns(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.pattern.as_str())
    }
}

/// Stores quick-reply and button pattern rules.
#[derive(Default, Clone)]
pub struct PatternRegistry {
    quick_reply: RuleSet,
    button: RuleSet,
    compiled: HashMap<String, Regex>,
}

impl PatternRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the full-string matcher for `pattern`, compiling it if not yet cached.
    ///
    /// The pattern must be valid on its own before it is anchored, so a
    /// fragment such as `a)|(?:b` cannot escape the anchors.
    fn compile(&self, pattern: &str) -> Result<Regex, ConfigurationError> {
        if let Some(matcher) = self.compiled.get(pattern) {
            return Ok(matcher.clone());
        }

        let invalid = |e: regex::Error| ConfigurationError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        };
        Regex::new(pattern).map_err(invalid)?;
        Regex::new(&format!("^(?:{pattern})$")).map_err(invalid)
    }

    /// Installs `handler` under every pattern into the selected rule sets.
    ///
    /// Registering a pattern that already exists in a set replaces its
    /// handler but keeps its position. If any pattern fails to compile,
    /// nothing is registered or cached.
    pub fn register<I, S>(
        &mut self,
        patterns: I,
        targets: PatternTargets,
        handler: BoxedHandler,
    ) -> Result<(), ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let compiled = patterns
            .into_iter()
            .map(|p| {
                let pattern = p.as_ref().to_string();
                self.compile(&pattern).map(|matcher| (pattern, matcher))
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (pattern, matcher) in &compiled {
            self.compiled
                .entry(pattern.clone())
                .or_insert_with(|| matcher.clone());
            if targets.quick_reply {
                self.quick_reply.insert(pattern, matcher, &handler);
            }
            if targets.button {
                self.button.insert(pattern, matcher, &handler);
            }
        }

        Ok(())
    }

    /// Returns the handlers of every rule in `set` matching `payload`, in registration order.
    pub fn matching<'a>(&'a self, set: PatternSet, payload: &str) -> Vec<&'a BoxedHandler> {
        match set {
            PatternSet::QuickReply => self.quick_reply.matching(payload),
            PatternSet::Button => self.button.matching(payload),
        }
    }

    /// Returns the quick-reply handlers matching `payload`.
    pub fn match_quick_reply<'a>(&'a self, payload: &str) -> Vec<&'a BoxedHandler> {
        self.matching(PatternSet::QuickReply, payload)
    }

    /// Returns the button handlers matching `payload`.
    pub fn match_button<'a>(&'a self, payload: &str) -> Vec<&'a BoxedHandler> {
        self.matching(PatternSet::Button, payload)
    }

    /// Returns the number of rules in `set`.
    pub fn len(&self, set: PatternSet) -> usize {
        match set {
            PatternSet::QuickReply => self.quick_reply.rules.len(),
            PatternSet::Button => self.button.rules.len(),
        }
    }

    /// Returns `true` if neither set holds a rule.
    pub fn is_empty(&self) -> bool {
        self.quick_reply.rules.is_empty() && self.button.rules.is_empty()
    }

    /// Returns the number of distinct compiled patterns.
    pub fn compiled_count(&self) -> usize {
        self.compiled.len()
    }
}

impl fmt::Debug for PatternRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternRegistry")
            .field("quick_reply", &self.quick_reply.patterns().collect::<Vec<_>>())
            .field("button", &self.button.patterns().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::into_handler;
    use courier_core::{Envelope, Event, PostbackEvent};
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<&'static str>>>;

    fn labelled(log: &Log, label: &'static str) -> BoxedHandler {
        let log = Arc::clone(log);
        into_handler(move || {
            let log = Arc::clone(&log);
            async move {
                log.lock().unwrap().push(label);
            }
        })
    }

    async fn run_all(handlers: Vec<&BoxedHandler>) {
        let event: Arc<Event> = Arc::new(PostbackEvent::new(Envelope::new("u", "p"), "x").into());
        for handler in handlers {
            handler(Arc::clone(&event)).await.unwrap();
        }
    }

    #[test]
    fn test_match_is_anchored_at_both_ends() {
        let log = Log::default();
        let mut registry = PatternRegistry::new();
        registry
            .register(["foo"], PatternTargets::ALL, labelled(&log, "foo"))
            .unwrap();

        assert_eq!(registry.match_button("foo").len(), 1);
        assert!(registry.match_button("foobar").is_empty());
        assert!(registry.match_button("barfoo").is_empty());
    }

    #[test]
    fn test_alternation_is_anchored_as_a_whole() {
        let log = Log::default();
        let mut registry = PatternRegistry::new();
        registry
            .register(["yes|no"], PatternTargets::ALL, labelled(&log, "answer"))
            .unwrap();

        assert_eq!(registry.match_quick_reply("no").len(), 1);
        assert!(registry.match_quick_reply("yes please").is_empty());
        assert!(registry.match_quick_reply("maybe no").is_empty());
    }

    #[tokio::test]
    async fn test_all_matches_fan_out_in_registration_order() {
        let log = Log::default();
        let mut registry = PatternRegistry::new();
        registry
            .register(["COLOR_.*"], PatternTargets::ALL, labelled(&log, "any"))
            .unwrap();
        registry
            .register(["SIZE_.*"], PatternTargets::ALL, labelled(&log, "size"))
            .unwrap();
        registry
            .register(["COLOR_RED"], PatternTargets::ALL, labelled(&log, "red"))
            .unwrap();

        run_all(registry.match_button("COLOR_RED")).await;
        assert_eq!(*log.lock().unwrap(), vec!["any", "red"]);
    }

    #[tokio::test]
    async fn test_same_pattern_replaces_handler_in_place() {
        let log = Log::default();
        let mut registry = PatternRegistry::new();
        registry
            .register(["A"], PatternTargets::ALL, labelled(&log, "first"))
            .unwrap();
        registry
            .register(["."], PatternTargets::ALL, labelled(&log, "dot"))
            .unwrap();
        registry
            .register(["A"], PatternTargets::ALL, labelled(&log, "second"))
            .unwrap();

        assert_eq!(registry.len(PatternSet::Button), 2);
        run_all(registry.match_button("A")).await;
        assert_eq!(*log.lock().unwrap(), vec!["second", "dot"]);
    }

    #[test]
    fn test_targets_select_rule_sets() {
        let log = Log::default();
        let mut registry = PatternRegistry::new();
        registry
            .register(["QR"], PatternTargets::QUICK_REPLY, labelled(&log, "qr"))
            .unwrap();
        registry
            .register(["BTN"], PatternTargets::BUTTON, labelled(&log, "btn"))
            .unwrap();

        assert_eq!(registry.match_quick_reply("QR").len(), 1);
        assert!(registry.match_button("QR").is_empty());
        assert_eq!(registry.match_button("BTN").len(), 1);
        assert!(registry.match_quick_reply("BTN").is_empty());
    }

    #[test]
    fn test_matchers_are_compiled_once_per_pattern() {
        let log = Log::default();
        let mut registry = PatternRegistry::new();
        registry
            .register(["a", "b"], PatternTargets::ALL, labelled(&log, "x"))
            .unwrap();
        registry
            .register(["a"], PatternTargets::BUTTON, labelled(&log, "y"))
            .unwrap();

        assert_eq!(registry.compiled_count(), 2);
    }

    #[test]
    fn test_invalid_pattern_is_rejected_atomically() {
        let log = Log::default();
        let mut registry = PatternRegistry::new();
        let err = registry
            .register(["ok", "(unclosed"], PatternTargets::ALL, labelled(&log, "x"))
            .unwrap_err();

        assert!(matches!(
            err,
            ConfigurationError::InvalidPattern { ref pattern, .. } if pattern == "(unclosed"
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unbalanced_pattern_cannot_escape_anchors() {
        let log = Log::default();
        let mut registry = PatternRegistry::new();
        let err = registry
            .register(["a)|(?:b"], PatternTargets::ALL, labelled(&log, "x"))
            .unwrap_err();

        assert!(matches!(
            err,
            ConfigurationError::InvalidPattern { ref pattern, .. } if pattern == "a)|(?:b"
        ));
        assert!(registry.is_empty());
        assert!(registry.match_button("abcdef").is_empty());
    }

    #[test]
    fn test_rejected_registration_leaves_cache_untouched() {
        let log = Log::default();
        let mut registry = PatternRegistry::new();
        registry
            .register(["kept"], PatternTargets::ALL, labelled(&log, "kept"))
            .unwrap();
        registry
            .register(["fresh", "(unclosed"], PatternTargets::ALL, labelled(&log, "x"))
            .unwrap_err();

        assert_eq!(registry.compiled_count(), 1);
        assert_eq!(registry.len(PatternSet::Button), 1);
    }
}
