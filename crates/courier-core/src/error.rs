//! Unified error types for Courier.
//!
//! The taxonomy separates routing-layer misses, which are recoverable and
//! only logged, from application-layer failures, which always propagate:
//!
//! - [`DecodeError`] - the inbound batch failed schema validation
//! - [`RouteError`] - a dynamic payload could not be resolved to a handler
//! - [`HandlerError`] - application code returned an error
//! - [`ConfigurationError`] - a registration was rejected at startup
//! - [`DispatchError`] - a batch was aborted by a failing handler
//! - [`TransportError`] - the webhook receiver could not be started

use thiserror::Error;

use crate::event::EventKind;

/// A type-erased error returned by application handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

// =============================================================================
// Decode Errors
// =============================================================================

/// Errors raised while decoding a webhook body into an [`EventBatch`](crate::EventBatch).
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The body is not valid JSON or misses required fields.
    #[error("schema validation failed: {0}")]
    Schema(#[from] serde_json::Error),

    /// A messaging object carried none of the known event fields.
    #[error("messaging #{index} carries no recognised event")]
    UnknownEvent {
        /// Position of the messaging object in the flattened batch.
        index: usize,
    },

    /// A messaging object carried more than one event field.
    #[error("messaging #{index} carries more than one event")]
    AmbiguousEvent {
        /// Position of the messaging object in the flattened batch.
        index: usize,
    },
}

// =============================================================================
// Route Errors
// =============================================================================

/// Reasons a dynamic payload could not be turned into a handler.
///
/// Every variant is a routing miss, never an application failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The payload is not of the form `<module>:<function>`.
    #[error("payload '{payload}' does not match '<module>:<function>'")]
    MalformedPayload {
        /// The offending payload.
        payload: String,
    },

    /// No module is registered under this path.
    #[error("module '{module}' is not registered")]
    ModuleNotFound {
        /// The requested module path.
        module: String,
    },

    /// The module exists but does not expose the function.
    #[error("module '{module}' has no function '{function}'")]
    FunctionNotFound {
        /// The requested module path.
        module: String,
        /// The requested function name.
        function: String,
    },
}

impl RouteError {
    /// Returns `true` for a well-formed payload whose target does not exist.
    pub fn is_unresolved(&self) -> bool {
        !matches!(self, Self::MalformedPayload { .. })
    }
}

// =============================================================================
// Handler Errors
// =============================================================================

/// An error produced by application-supplied handler code.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct HandlerError(BoxError);

impl HandlerError {
    /// Wraps any error value.
    pub fn new(err: impl Into<BoxError>) -> Self {
        Self(err.into())
    }

    /// Creates an error from a plain message.
    pub fn msg(msg: impl Into<String>) -> Self {
        Self(msg.into().into())
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Errors raised while registering routes.
#[derive(Debug, Clone, Error)]
pub enum ConfigurationError {
    /// A payload pattern is not a valid regular expression.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The rejected pattern.
        pattern: String,
        /// Why compilation failed.
        reason: String,
    },

    /// A dynamic route was registered with an empty or ill-formed key.
    #[error("invalid route '{module}:{function}'")]
    InvalidRoute {
        /// Module path part of the key.
        module: String,
        /// Function name part of the key.
        function: String,
    },
}

// =============================================================================
// Dispatch Errors
// =============================================================================

/// Errors returned from dispatching a batch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A handler failed while processing an event; the rest of the batch was skipped.
    #[error("handler failed on {kind} event #{index}: {source}")]
    Handler {
        /// Position of the event in the batch.
        index: usize,
        /// Kind of the event being processed.
        kind: EventKind,
        /// The handler's error.
        #[source]
        source: HandlerError,
    },
}

impl DispatchError {
    /// Returns the index of the event that failed.
    pub fn index(&self) -> usize {
        match self {
            Self::Handler { index, .. } => *index,
        }
    }
}

// =============================================================================
// Transport Errors
// =============================================================================

/// Errors that can occur while running the webhook receiver.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Result type for dynamic route resolution.
pub type RouteResult<T> = Result<T, RouteError>;

/// Result type returned by handlers.
pub type HandlerResult = Result<(), HandlerError>;

/// Result type for dispatching.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_payload_is_not_unresolved() {
        let err = RouteError::MalformedPayload {
            payload: "nope".into(),
        };
        assert!(!err.is_unresolved());

        let err = RouteError::FunctionNotFound {
            module: "pkg.mod".into(),
            function: "missing".into(),
        };
        assert!(err.is_unresolved());
    }

    #[test]
    fn test_dispatch_error_display_carries_source() {
        let err = DispatchError::Handler {
            index: 2,
            kind: EventKind::Postback,
            source: HandlerError::msg("boom"),
        };
        assert_eq!(err.to_string(), "handler failed on postback event #2: boom");
        assert_eq!(err.index(), 2);
    }
}
