use pseudonymous::app::{cli, logging};
use pseudonymous::prelude::*;
use tokio_util::compat::TokioAsyncWriteCompatExt;
use tracing::{error, info};

const APP_NAME: &str = "pseudonymous";

#[tokio::main]
async fn main() {
    let code = match Cli::parse_validated() {
        Ok(args) => CliApp::new(APP_NAME).run(run_pseudonymization(args)).await,
        Err(e) => cli::exit_code(APP_NAME, Err(e)),
    };
    std::process::exit(code);
}

/// Main application logic - provisions domains, runs the pipeline and
/// writes the per-category report to stdout
async fn run_pseudonymization(args: Cli) -> Result<(), AppError> {
    let config = AppConfig::load(&args.config)?;
    logging::init(&config.app.log_level)?;
    info!(app = %config.app.name, project = %args.project, "Starting");

    if args.create_domains {
        let gpas = config.gpas.as_ref().ok_or_else(|| {
            AppError::InvalidArguments("--create-domains requires a gpas section".to_string())
        })?;
        GpasClient::new(gpas)?.setup_domains(&args.project).await?;
    }

    let processor = FhirProcessor::new(&config, &args.project)?;

    let outcome = processor.run().await;
    let reported = match &outcome {
        Ok(result) => {
            let mut stdout = tokio::io::stdout().compat_write();
            write_report(result, &mut stdout).await
        }
        Err(e) => {
            error!(error = %e, "Processor run exited");
            Ok(())
        }
    };

    // The provider is closed whatever the outcome
    let closed = processor.close().await;

    outcome?;
    reported?;
    closed?;
    Ok(())
}
