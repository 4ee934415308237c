pub mod error;
pub mod policy;
pub mod processor;
pub mod worker;

// Re-export commonly used types
pub use error::{PipelineError, WorkerError};
pub use policy::TransformFailurePolicy;
pub use processor::{FhirProcessor, PipelineSettings, Processor};
pub use worker::{SharedReceiver, Worker, WorkerStats, decode_document};
