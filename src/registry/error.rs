use thiserror::Error;

/// Errors provisioning gPAS domains
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("gPAS request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("gPAS request for domain {domain} failed with status code {status}")]
    Status { domain: String, status: u16 },

    #[error("gPAS rejected domain {domain}: {fault}")]
    Fault { domain: String, fault: String },
}
