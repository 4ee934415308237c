use std::path::PathBuf;

use clap::Parser;

use super::error::AppError;

/// Pseudonymization of FHIR resources via the FHIR Pseudonymizer service
#[derive(Parser, Debug)]
#[command(name = "pseudonymous")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Project name
    #[arg(short, long)]
    pub project: String,

    /// Config file
    #[arg(short, long, default_value = "./app.yaml")]
    pub config: PathBuf,

    /// Create the project's gPAS domains before processing
    #[arg(long)]
    pub create_domains: bool,
}

impl Cli {
    /// Parse process arguments; clap handles `--help` and usage errors itself
    pub fn parse_validated() -> Result<Self, AppError> {
        Self::parse().validated()
    }

    pub fn validated(self) -> Result<Self, AppError> {
        if self.project.trim().is_empty() {
            return Err(AppError::InvalidArguments(
                "project name must not be blank".to_string(),
            ));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_flags() {
        let cli = Cli::try_parse_from(["pseudonymous", "-p", "study", "-c", "conf.yaml"]).unwrap();
        assert_eq!(cli.project, "study");
        assert_eq!(cli.config, PathBuf::from("conf.yaml"));
        assert!(!cli.create_domains);
    }

    #[test]
    fn config_defaults_to_app_yaml() {
        let cli = Cli::try_parse_from(["pseudonymous", "--project", "study", "--create-domains"])
            .unwrap();
        assert_eq!(cli.config, PathBuf::from("./app.yaml"));
        assert!(cli.create_domains);
    }

    #[test]
    fn project_is_required() {
        assert!(Cli::try_parse_from(["pseudonymous"]).is_err());
    }

    #[test]
    fn blank_project_is_rejected() {
        let cli = Cli::try_parse_from(["pseudonymous", "-p", "  "]).unwrap();
        assert!(matches!(cli.validated(), Err(AppError::InvalidArguments(_))));
    }
}
