pub mod app;
pub mod env;
pub mod error;

// Re-export commonly used types
pub use app::{
    App, AppConfig, AuthConfig, BasicAuth, DirectoryConfig, DomainsConfig, FhirConfig,
    GpasConfig, ProviderConfig, RetryConfig, TransformConfig,
};
pub use error::ConfigError;
