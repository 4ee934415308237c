use std::io;
use thiserror::Error;

use crate::config::ConfigError;
use crate::io::ReportError;
use crate::pipeline::PipelineError;
use crate::registry::RegistryError;
use crate::storage::ProviderError;

/// Top-level application errors unifying all layer errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("gPAS error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Failed to initialize logging: {0}")]
    Logging(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),
}
