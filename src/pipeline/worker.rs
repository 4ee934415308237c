use std::sync::Arc;

use serde_json::Value;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error, info};

use super::error::WorkerError;
use super::policy::TransformFailurePolicy;
use crate::domain::{Category, Document, Record};
use crate::storage::StorageProvider;
use crate::transform::TransformClient;

/// Pending-work receiver shared by every worker of a run
pub type SharedReceiver = Arc<Mutex<mpsc::Receiver<Record>>>;

/// One member of the worker pool
pub struct Worker<S, T> {
    id: usize,
    provider: Arc<S>,
    client: Arc<T>,
    routing_label: Arc<str>,
    policy: TransformFailurePolicy,
}

/// What a worker did before its loop ended
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub worker: usize,
    pub succeeded: usize,
    pub dropped: usize,
    /// Ended early because of a transform failure
    pub abandoned: bool,
}

impl<S, T> Worker<S, T>
where
    S: StorageProvider,
    T: TransformClient,
{
    pub fn new(
        id: usize,
        provider: Arc<S>,
        client: Arc<T>,
        routing_label: Arc<str>,
        policy: TransformFailurePolicy,
    ) -> Self {
        Self {
            id,
            provider,
            client,
            routing_label,
            policy,
        }
    }

    /// Pull records until the queue is closed and drained, or the failure
    /// policy stops the worker
    ///
    /// The receiver lock is held only while waiting for the next record.
    pub async fn run(self, jobs: SharedReceiver, results: mpsc::Sender<Category>) -> WorkerStats {
        let mut stats = WorkerStats {
            worker: self.id,
            ..WorkerStats::default()
        };

        loop {
            let next = jobs.lock().await.recv().await;
            let Some(record) = next else {
                break;
            };

            let id = record.id.clone();
            let category = record.origin.clone();

            match self.process(record).await {
                Ok(category) => {
                    if results.send(category).await.is_err() {
                        break;
                    }
                    stats.succeeded += 1;
                }
                Err(WorkerError::Transform(e)) => {
                    stats.dropped += 1;
                    if !self.policy.handle_transform_error(self.id, &id, &e) {
                        stats.abandoned = true;
                        break;
                    }
                }
                Err(e @ WorkerError::Write(_)) => {
                    stats.dropped += 1;
                    error!(
                        worker = self.id,
                        id = %id,
                        category = %category,
                        error = %e,
                        "Failed to save pseudonymized record to destination"
                    );
                }
                Err(e) => {
                    stats.dropped += 1;
                    error!(worker = self.id, id = %id, category = %category, error = %e, "Dropping record");
                }
            }
        }

        info!(
            worker = stats.worker,
            succeeded = stats.succeeded,
            dropped = stats.dropped,
            abandoned = stats.abandoned,
            "Worker finished"
        );
        stats
    }

    /// Transform, decode and store one record, yielding its category
    async fn process(&self, record: Record) -> Result<Category, WorkerError> {
        let raw = serde_json::to_vec(&record.payload).map_err(WorkerError::Encode)?;
        let response = self.client.send(&raw, &self.routing_label).await?;
        let payload = decode_document(&response)?;

        let transformed = record.into_transformed(payload);
        let category = transformed.origin().clone();
        let id = transformed.id().clone();
        self.provider.write(transformed).await?;

        debug!(worker = self.id, id = %id, category = %category, "Successfully processed record");
        Ok(category)
    }
}

/// Decode a transform response into a document (a JSON object)
pub fn decode_document(bytes: &[u8]) -> Result<Document, WorkerError> {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(WorkerError::Decode(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
        Err(e) => Err(WorkerError::Decode(e.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
