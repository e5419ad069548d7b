//! # Courier Core
//!
//! The data model shared by every Courier crate:
//!
//! - **Event schema**: the Messenger messaging events ([`Event`], [`EventKind`])
//! - **Batch decoding**: one webhook body into an ordered [`EventBatch`]
//! - **Error taxonomy**: decode, route, handler, configuration and dispatch errors
//! - **Sink seam**: the [`BatchSink`] trait the receiver hands batches to
//!
//! ```text
//! ┌──────────────┐  bytes  ┌────────────┐  EventBatch  ┌────────────┐
//! │   Receiver   │────────▶│   decode   │─────────────▶│ BatchSink  │
//! │ (transport)  │         │   (core)   │              │(dispatcher)│
//! └──────────────┘         └────────────┘              └────────────┘
//! ```

pub mod batch;
pub mod error;
pub mod event;
pub mod sink;

pub use batch::EventBatch;
pub use error::{
    BoxError, ConfigurationError, DecodeError, DecodeResult, DispatchError, DispatchResult,
    HandlerError, HandlerResult, RouteError, RouteResult, TransportError, TransportResult,
};
pub use event::{Envelope, Event, EventKind, MessageEvent, Party, PostbackEvent};
pub use sink::{BatchSink, BoxedSink};
