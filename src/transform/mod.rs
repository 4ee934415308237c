pub mod client;
pub mod error;
pub mod retry;
pub mod traits;

// Re-export commonly used types
pub use client::PseudonymizerClient;
pub use error::TransformError;
pub use retry::RetryPolicy;
pub use traits::TransformClient;
