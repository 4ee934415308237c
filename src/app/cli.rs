use std::future::Future;

use tracing::{error, warn};

use super::error::AppError;

/// Exit code for a clean run
pub const EXIT_OK: i32 = 0;
/// Exit code for a run ending in an error
pub const EXIT_ERROR: i32 = 1;

/// CLI application runner that handles:
/// - Signal handling (SIGINT, SIGTERM, SIGHUP)
/// - Exit codes (0 = success, 1 = error, 130 = SIGINT, 143 = SIGTERM, 129 = SIGHUP)
pub struct CliApp {
    name: String,
}

impl CliApp {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the main future against signal reception and return the exit code
    pub async fn run<Fut>(self, main_fut: Fut) -> i32
    where
        Fut: Future<Output = Result<(), AppError>>,
    {
        tokio::select! {
            result = main_fut => exit_code(&self.name, result),
            signal_code = wait_for_signal() => {
                warn!(app = %self.name, exit_code = signal_code, "Interrupted, partial results may have been written");
                signal_code
            }
        }
    }
}

/// Exit code for a finished main future
pub fn exit_code(name: &str, result: Result<(), AppError>) -> i32 {
    match result {
        Ok(()) => EXIT_OK,
        Err(e) => {
            error!(app = %name, error = %e, "Execution failed");
            // Logging may not be set up yet when config loading fails
            eprintln!("Error: {}", e);
            EXIT_ERROR
        }
    }
}

/// Wait for SIGINT, SIGTERM or SIGHUP and return the matching exit code
///
/// A signal that cannot be registered is never delivered.
async fn wait_for_signal() -> i32 {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        async fn recv(kind: SignalKind) {
            match signal(kind) {
                Ok(mut stream) => {
                    stream.recv().await;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to set up signal handler");
                    std::future::pending::<()>().await;
                }
            }
        }

        tokio::select! {
            _ = recv(SignalKind::terminate()) => {
                warn!("Received SIGTERM");
                143 // 128 + 15
            }
            _ = recv(SignalKind::interrupt()) => {
                warn!("Received SIGINT");
                130 // 128 + 2
            }
            _ = recv(SignalKind::hangup()) => {
                warn!("Received SIGHUP");
                129 // 128 + 1
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to set up Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        warn!("Received Ctrl+C");
        130
    }
}
