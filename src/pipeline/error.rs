use thiserror::Error;

use crate::storage::ProviderError;
use crate::transform::TransformError;

/// Errors constructing or running a pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Transform client error: {0}")]
    Transform(#[from] TransformError),

    #[error("Pipeline task failed: {0}")]
    TaskFailed(#[from] tokio::task::JoinError),
}

/// Per-record failures inside a worker
///
/// These never leave the worker; they end up in logs and missing counts.
#[derive(Error, Debug)]
pub enum WorkerError {
    #[error("Failed to encode payload: {0}")]
    Encode(serde_json::Error),

    #[error("Failed to pseudonymize record: {0}")]
    Transform(#[from] TransformError),

    #[error("Failed to decode pseudonymized payload: {0}")]
    Decode(String),

    #[error("Failed to write record: {0}")]
    Write(#[from] ProviderError),
}
