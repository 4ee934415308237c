use async_trait::async_trait;
use tokio::sync::mpsc;

use super::error::ProviderError;
use crate::domain::{Record, TransformedRecord};

/// Push side of the pending-work queue handed to [`StorageProvider::read`]
///
/// Dropping the sink closes the queue.
pub struct RecordSink {
    sender: mpsc::Sender<Record>,
}

impl RecordSink {
    pub fn new(sender: mpsc::Sender<Record>) -> Self {
        Self { sender }
    }

    /// Enqueue a record, waiting until a worker has room for it
    pub async fn push(&self, record: Record) -> Result<(), ProviderError> {
        self.sender
            .send(record)
            .await
            .map_err(|_| ProviderError::SinkClosed)
    }

    /// Whether every consumer is gone
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

/// Source and destination store for records
///
/// Implementations must tolerate concurrent `write` calls from many workers
/// while `read` is still streaming.
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Human-readable identity for logging
    fn name(&self) -> &str;

    /// Stream every record of every source category into `sink`
    ///
    /// Fails if no categories exist or enumeration breaks partway; records
    /// pushed before the failure stay pushed.
    async fn read(&self, sink: RecordSink) -> Result<(), ProviderError>;

    /// Upsert a transformed record keyed by its id in its origin category
    async fn write(&self, record: TransformedRecord) -> Result<(), ProviderError>;

    /// Release underlying resources
    async fn close(&self) -> Result<(), ProviderError>;
}

// Shared providers (Arc) delegate to the inner provider
#[async_trait]
impl<P: StorageProvider + ?Sized> StorageProvider for std::sync::Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn read(&self, sink: RecordSink) -> Result<(), ProviderError> {
        (**self).read(sink).await
    }

    async fn write(&self, record: TransformedRecord) -> Result<(), ProviderError> {
        (**self).write(record).await
    }

    async fn close(&self) -> Result<(), ProviderError> {
        (**self).close().await
    }
}
