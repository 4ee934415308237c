//! Prelude module for convenient imports
//!
//! Import everything you need with: `use pseudonymous::prelude::*;`

// Domain types
pub use crate::domain::{AggregateResult, Category, Document, Record, RecordId, TransformedRecord};

// Config types
pub use crate::config::{AppConfig, ConfigError, TransformConfig};

// Storage types
pub use crate::storage::{
    DirectoryProvider, MemoryProvider, ProviderError, RecordSink, StorageProvider,
};

// Transform types
pub use crate::transform::{PseudonymizerClient, RetryPolicy, TransformClient, TransformError};

// Pipeline types
pub use crate::pipeline::{
    FhirProcessor, PipelineError, PipelineSettings, Processor, TransformFailurePolicy,
};

// Registry types
pub use crate::registry::{GpasClient, RegistryError};

// IO types
pub use crate::io::{ReportError, write_report};

// App types
pub use crate::app::{AppError, Cli, CliApp};
