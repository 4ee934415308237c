use reqwest::Client;
use tracing::{error, info, warn};

use super::domain::{DomainDefinition, fault_string};
use super::error::RegistryError;
use crate::config::{BasicAuth, DomainsConfig, GpasConfig};

/// SOAP client for the gPAS domain manager
pub struct GpasClient {
    http: Client,
    url: String,
    auth: Option<BasicAuth>,
    domains: DomainsConfig,
}

impl GpasClient {
    pub fn new(config: &GpasConfig) -> Result<Self, RegistryError> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            url: config.url.clone(),
            auth: config.auth.as_ref().and_then(|auth| auth.basic.clone()),
            domains: config.domains.clone(),
        })
    }

    /// Domains provisioned for a project, parent first
    pub fn domains_for(&self, project: &str) -> Vec<DomainDefinition> {
        std::iter::once(DomainDefinition::project(project))
            .chain(
                self.domains
                    .config
                    .iter()
                    .map(|(name, prefix)| DomainDefinition::child(project, name, prefix)),
            )
            .collect()
    }

    /// Create the project domain and its child domains, stopping at the
    /// first failure
    pub async fn setup_domains(&self, project: &str) -> Result<(), RegistryError> {
        for domain in self.domains_for(project) {
            if let Err(e) = self.add_domain(&domain).await {
                error!(domain = %domain.name, error = %e, "Failed to create gPAS domain");
                return Err(e);
            }
        }
        Ok(())
    }

    async fn add_domain(&self, domain: &DomainDefinition) -> Result<(), RegistryError> {
        let mut request = self
            .http
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "text/xml")
            .body(domain.to_soap());
        if let Some(auth) = &self.auth {
            request = request.basic_auth(&auth.username, Some(&auth.password));
        }

        let response = request.send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::OK {
            info!(domain = %domain.name, "Created gPAS domain");
            return Ok(());
        }

        if status == reqwest::StatusCode::INTERNAL_SERVER_ERROR && self.domains.use_existing {
            let body = response.text().await?;
            if let Some(fault) = fault_string(&body) {
                if fault == domain.already_exists_fault() {
                    warn!(domain = %domain.name, "Reusing existing domain");
                    return Ok(());
                }
                return Err(RegistryError::Fault {
                    domain: domain.name.clone(),
                    fault,
                });
            }
        }

        Err(RegistryError::Status {
            domain: domain.name.clone(),
            status: status.as_u16(),
        })
    }
}
