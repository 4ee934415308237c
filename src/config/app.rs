use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use super::env::apply_env_overrides;
use super::error::ConfigError;
use crate::pipeline::TransformFailurePolicy;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AppConfig {
    #[serde(default)]
    pub app: App,
    #[serde(default)]
    pub gpas: Option<GpasConfig>,
    pub fhir: FhirConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct App {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Number of workers; 0 is treated as 1
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default)]
    pub on_transform_error: TransformFailurePolicy,
}

impl Default for App {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
            concurrency: default_concurrency(),
            on_transform_error: TransformFailurePolicy::default(),
        }
    }
}

fn default_name() -> String {
    "pseudonymous".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_concurrency() -> usize {
    1
}

/// Optional credentials for outbound HTTP calls
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    pub basic: Option<BasicAuth>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

/// gPAS pseudonym registry
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GpasConfig {
    pub url: String,
    #[serde(default)]
    pub auth: Option<AuthConfig>,
    #[serde(default)]
    pub domains: DomainsConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DomainsConfig {
    /// Accept domains that already exist instead of failing
    #[serde(default)]
    pub use_existing: bool,
    /// Child domain name suffix -> pseudonym prefix
    #[serde(default)]
    pub config: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FhirConfig {
    pub pseudonymizer: TransformConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
}

/// FHIR pseudonymizer service
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TransformConfig {
    pub url: String,
    #[serde(default)]
    pub auth: Option<AuthConfig>,
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Retry settings, all durations in seconds
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetryConfig {
    /// Retries after the first attempt
    #[serde(default = "default_retry_count")]
    pub count: u32,
    /// Per-attempt deadline; 0 disables it
    #[serde(default = "default_retry_timeout")]
    pub timeout: u64,
    #[serde(default = "default_retry_wait")]
    pub wait: u64,
    #[serde(default = "default_retry_max_wait")]
    pub max_wait: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            count: default_retry_count(),
            timeout: default_retry_timeout(),
            wait: default_retry_wait(),
            max_wait: default_retry_max_wait(),
        }
    }
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_timeout() -> u64 {
    30
}

fn default_retry_wait() -> u64 {
    1
}

fn default_retry_max_wait() -> u64 {
    20
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProviderConfig {
    pub directory: Option<DirectoryConfig>,
}

/// Filesystem-backed provider layout
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DirectoryConfig {
    #[serde(default = "default_root")]
    pub root: PathBuf,
    #[serde(default = "default_source_prefix")]
    pub source_prefix: String,
    #[serde(default = "default_destination_prefix")]
    pub destination_prefix: String,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            source_prefix: default_source_prefix(),
            destination_prefix: default_destination_prefix(),
        }
    }
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_source_prefix() -> String {
    "idat_fhir_".to_string()
}

fn default_destination_prefix() -> String {
    "psn_fhir_".to_string()
}

impl AppConfig {
    /// Load from a YAML file, applying overrides from the process environment
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, std::env::vars())
    }

    /// Load from a YAML file with an explicit set of environment variables
    pub fn load_with_env<I>(path: impl AsRef<Path>, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config = Self::from_yaml(&raw, vars)?;
        info!(file = %path.display(), "Using config file");
        Ok(config)
    }

    /// Parse a YAML document, then apply overrides and validate
    pub fn from_yaml<I>(raw: &str, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut document: serde_yaml::Value = serde_yaml::from_str(raw)?;
        apply_env_overrides(&mut document, vars);

        let config: Self = serde_yaml::from_value(document)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.fhir.pseudonymizer.url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "fhir.pseudonymizer.url must not be empty".to_string(),
            ));
        }
        if let Some(gpas) = &self.gpas
            && gpas.url.trim().is_empty()
        {
            return Err(ConfigError::Invalid("gpas.url must not be empty".to_string()));
        }
        Ok(())
    }
}
