pub mod record;
pub mod result;

// Re-export commonly used types
pub use record::{Category, Document, Record, RecordId, TransformedRecord};
pub use result::AggregateResult;
