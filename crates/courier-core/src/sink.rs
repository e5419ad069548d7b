//! The seam between the webhook receiver and the dispatch engine.

use std::sync::Arc;

use async_trait::async_trait;

use crate::batch::EventBatch;
use crate::error::DispatchResult;

/// Something that consumes decoded webhook batches.
///
/// The receiver calls [`deliver`](Self::deliver) once per successfully
/// decoded delivery and maps the result to an HTTP status.
#[async_trait]
pub trait BatchSink: Send + Sync + 'static {
    /// Processes every event of the batch, in order.
    async fn deliver(&self, batch: EventBatch) -> DispatchResult<()>;
}

/// A shared, type-erased batch sink.
pub type BoxedSink = Arc<dyn BatchSink>;

#[async_trait]
impl<T: BatchSink + ?Sized> BatchSink for Arc<T> {
    async fn deliver(&self, batch: EventBatch) -> DispatchResult<()> {
        (**self).deliver(batch).await
    }
}
