pub mod error;
pub mod report;

// Re-export commonly used types
pub use error::ReportError;
pub use report::write_report;
