use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use tracing::{debug, info};

use super::error::ProviderError;
use super::traits::{RecordSink, StorageProvider};
use crate::domain::{Category, Document, Record, RecordId, TransformedRecord};

/// Concurrent in-memory provider using DashMap
///
/// Source categories are enumerated in insertion order. Written records are
/// keyed by `(category, id)`, so repeated writes of the same record upsert.
pub struct MemoryProvider {
    name: String,
    sources: Vec<(Category, Vec<(RecordId, Document)>)>,
    written: DashMap<(String, RecordId), Document>,
    failing_writes: DashSet<RecordId>,
    closed: AtomicBool,
}

impl MemoryProvider {
    /// Create a new empty provider
    pub fn new() -> Self {
        Self {
            name: "in-memory".to_string(),
            sources: Vec::new(),
            written: DashMap::new(),
            failing_writes: DashSet::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Add a source category with its records
    pub fn with_category<I>(mut self, name: &str, records: I) -> Self
    where
        I: IntoIterator<Item = (RecordId, Document)>,
    {
        self.sources
            .push((Category::new(name), records.into_iter().collect()));
        self
    }

    /// Make every write of `id` fail with [`ProviderError::WriteRejected`]
    pub fn with_failing_write(self, id: impl Into<RecordId>) -> Self {
        self.failing_writes.insert(id.into());
        self
    }

    /// Stored payload for a destination record
    pub fn written(&self, category: &str, id: &RecordId) -> Option<Document> {
        self.written
            .get(&(category.to_string(), id.clone()))
            .map(|entry| entry.value().clone())
    }

    /// Number of distinct records stored at the destination
    pub fn written_len(&self) -> usize {
        self.written.len()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageProvider for MemoryProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&self, sink: RecordSink) -> Result<(), ProviderError> {
        if self.sources.is_empty() {
            return Err(ProviderError::NoCategories(self.name.clone()));
        }

        for (category, records) in &self.sources {
            for (id, payload) in records {
                sink.push(Record::new(id.clone(), payload.clone(), category.clone()))
                    .await?;
            }
            info!(category = %category, count = records.len(), "Read category");
        }

        Ok(())
    }

    async fn write(&self, record: TransformedRecord) -> Result<(), ProviderError> {
        if self.is_closed() {
            return Err(ProviderError::Closed);
        }
        if self.failing_writes.contains(record.id()) {
            return Err(ProviderError::WriteRejected(record.id().to_string()));
        }

        let (id, payload, origin) = record.into_parts();
        debug!(id = %id, category = %origin, "Storing record");
        self.written.insert((origin.name().to_string(), id), payload);
        Ok(())
    }

    async fn close(&self) -> Result<(), ProviderError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}
