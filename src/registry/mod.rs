//! Pseudonym domain provisioning in the gPAS registry.

pub mod domain;
pub mod error;
pub mod gpas;

// Re-export commonly used types
pub use domain::DomainDefinition;
pub use error::RegistryError;
pub use gpas::GpasClient;
