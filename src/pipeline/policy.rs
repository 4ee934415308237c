use serde::Deserialize;
use tracing::{error, warn};

use crate::domain::RecordId;
use crate::transform::TransformError;

/// What a worker does after the transform service fails for a record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TransformFailurePolicy {
    /// Stop the worker for the rest of the run; remaining workers carry on
    #[default]
    AbandonWorker,

    /// Drop the record and keep pulling work
    SkipRecord,
}

impl TransformFailurePolicy {
    /// Handle a transform error
    /// Return true to continue processing, false to stop the worker
    pub fn handle_transform_error(&self, worker: usize, id: &RecordId, error: &TransformError) -> bool {
        match self {
            TransformFailurePolicy::AbandonWorker => {
                error!(worker, id = %id, error = %error, "Failed to pseudonymize record, stopping worker");
                false
            }
            TransformFailurePolicy::SkipRecord => {
                warn!(worker, id = %id, error = %error, "Failed to pseudonymize record, skipping");
                true
            }
        }
    }
}
