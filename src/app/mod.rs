pub mod args;
pub mod cli;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use args::Cli;
pub use cli::CliApp;
pub use error::AppError;
