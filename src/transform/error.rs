use thiserror::Error;

/// Transform service errors
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("Payload is not valid JSON: {0}")]
    InvalidPayload(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Pseudonymizer returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

impl TransformError {
    /// Whether another attempt may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            TransformError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            TransformError::Status { status, .. } => *status == 429 || *status >= 500,
            TransformError::InvalidPayload(_) | TransformError::Client(_) => false,
        }
    }
}
