pub mod directory;
pub mod error;
pub mod memory;
pub mod traits;

// Re-export commonly used types
pub use directory::DirectoryProvider;
pub use error::ProviderError;
pub use memory::MemoryProvider;
pub use traits::{RecordSink, StorageProvider};
