//! # Courier Framework
//!
//! Event dispatch for Messenger-style webhooks.
//!
//! This layer provides:
//! - Per-kind handler registries with pre and post hooks
//! - Payload routing by anchored regular expression ([`PatternRegistry`])
//! - Payload routing by `module:function` reference ([`DynamicResolver`])
//! - The [`Dispatcher`] that ties them together, also usable as a
//!   [`BatchSink`](courier_core::BatchSink) or a tower service
//!
//! Every registry is owned by a dispatcher instance. Two dispatchers never
//! share state, so tests and multi-tenant servers can build as many as they
//! need.

pub mod dispatcher;
pub mod handler;
pub mod pattern;
pub mod registry;
pub mod resolver;
pub mod service;

pub use dispatcher::{DispatchMode, Dispatcher};
pub use handler::{BoxedHandler, Handler, HandlerResponse, into_handler};
pub use pattern::{PatternRegistry, PatternSet, PatternTargets};
pub use registry::{HandlerRegistry, Stage};
pub use resolver::{DynamicResolver, RouteRef};
pub use service::DispatchService;
