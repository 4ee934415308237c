use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Storage-level errors
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No categories found in {0}")]
    NoCategories(String),

    #[error("Malformed record in {path} at line {line}: {source}")]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        source: serde_json::Error,
    },

    #[error("Invalid record id: {0}")]
    InvalidId(String),

    #[error("Record sink closed")]
    SinkClosed,

    #[error("Provider is closed")]
    Closed,

    #[error("Write rejected for record {0}")]
    WriteRejected(String),

    #[error("No storage provider configured")]
    NotConfigured,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats_correctly() {
        assert_eq!(
            ProviderError::NoCategories("idat_fhir_test".to_string()).to_string(),
            "No categories found in idat_fhir_test"
        );
        assert_eq!(ProviderError::SinkClosed.to_string(), "Record sink closed");
        assert_eq!(
            ProviderError::InvalidId("../x".to_string()).to_string(),
            "Invalid record id: ../x"
        );
    }

    #[test]
    fn io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err = ProviderError::from(io_err);

        match err {
            ProviderError::Io(_) => {}
            _ => panic!("Expected Io variant"),
        }
    }
}
