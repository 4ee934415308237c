use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error, info};

use super::error::PipelineError;
use super::policy::TransformFailurePolicy;
use super::worker::{Worker, WorkerStats};
use crate::config::AppConfig;
use crate::domain::{AggregateResult, Category, Record};
use crate::storage::{DirectoryProvider, ProviderError, RecordSink, StorageProvider};
use crate::transform::{PseudonymizerClient, TransformClient};

/// Capacity of the pending-work and result queues
///
/// Keeps the source read at most one record ahead of the worker pool.
const QUEUE_CAPACITY: usize = 1;

/// Run parameters for a [`Processor`]
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub concurrency: usize,
    pub routing_label: String,
    pub on_transform_error: TransformFailurePolicy,
}

impl PipelineSettings {
    /// Single worker, routing label derived from the project name
    pub fn new(project: &str) -> Self {
        Self {
            concurrency: 1,
            routing_label: format!("{}-", project),
            on_transform_error: TransformFailurePolicy::default(),
        }
    }

    /// Set number of workers (0 is treated as 1)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_transform_failure_policy(mut self, policy: TransformFailurePolicy) -> Self {
        self.on_transform_error = policy;
        self
    }
}

/// Pipeline orchestrator
///
/// Streams records from the provider through a fixed pool of workers and
/// counts successful writes per category.
pub struct Processor<S, T> {
    provider: Arc<S>,
    client: Arc<T>,
    settings: PipelineSettings,
}

/// Processor wired to the filesystem provider and the pseudonymizer service
pub type FhirProcessor = Processor<DirectoryProvider, PseudonymizerClient>;

impl FhirProcessor {
    /// Build the processor for a project from the application config
    pub fn new(config: &AppConfig, project: &str) -> Result<Self, PipelineError> {
        let directory = config
            .fhir
            .provider
            .directory
            .as_ref()
            .ok_or(ProviderError::NotConfigured)?;

        let provider = DirectoryProvider::new(directory, project);
        let client = PseudonymizerClient::new(&config.fhir.pseudonymizer)?;
        let settings = PipelineSettings::new(project)
            .with_concurrency(config.app.concurrency)
            .with_transform_failure_policy(config.app.on_transform_error);

        Ok(Processor::with_components(provider, client, settings))
    }
}

impl<S, T> Processor<S, T>
where
    S: StorageProvider + 'static,
    T: TransformClient + 'static,
{
    pub fn with_components(provider: S, client: T, settings: PipelineSettings) -> Self {
        Self {
            provider: Arc::new(provider),
            client: Arc::new(client),
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn provider(&self) -> &S {
        &self.provider
    }

    /// Close the provider; `run` never does this itself
    pub async fn close(&self) -> Result<(), ProviderError> {
        self.provider.close().await
    }

    /// Execute one pipeline run
    ///
    /// A failing source read is logged, not returned: whatever was enqueued
    /// before the failure is still processed and counted. The only error is a
    /// panicked pipeline task.
    pub async fn run(&self) -> Result<AggregateResult, PipelineError> {
        let start = Instant::now();
        let concurrency = self.settings.concurrency.max(1);
        let routing_label: Arc<str> = Arc::from(self.settings.routing_label.as_str());

        info!(provider = self.provider.name(), "Starting pipeline run");

        let (job_tx, job_rx) = mpsc::channel::<Record>(QUEUE_CAPACITY);
        let (result_tx, mut result_rx) = mpsc::channel::<Category>(QUEUE_CAPACITY);
        let jobs = Arc::new(Mutex::new(job_rx));

        let workers: Vec<_> = (0..concurrency)
            .map(|id| {
                let worker = Worker::new(
                    id,
                    Arc::clone(&self.provider),
                    Arc::clone(&self.client),
                    Arc::clone(&routing_label),
                    self.settings.on_transform_error,
                );
                tokio::spawn(worker.run(Arc::clone(&jobs), result_tx.clone()))
            })
            .collect();
        info!(concurrency, "Workers created");

        // Only workers may keep the queues alive
        drop(jobs);
        drop(result_tx);

        let provider = Arc::clone(&self.provider);
        let reader = tokio::spawn(async move {
            info!(provider = provider.name(), "Reading records");
            if let Err(e) = provider.read(RecordSink::new(job_tx)).await {
                error!(provider = provider.name(), error = %e, "Failed to read data");
            }
        });

        let mut counts: HashMap<String, usize> = HashMap::new();
        while let Some(category) = result_rx.recv().await {
            *counts.entry(category.name().to_string()).or_default() += 1;
        }

        reader.await?;
        let mut abandoned = 0;
        for handle in workers {
            let stats: WorkerStats = handle.await?;
            if stats.abandoned {
                abandoned += 1;
            }
        }
        if abandoned > 0 {
            debug!(abandoned, concurrency, "Workers stopped early after transform failures");
        }

        let result = AggregateResult {
            counts,
            duration: start.elapsed(),
        };
        info!(count = %result, duration = ?result.duration, "Finished processing results");

        Ok(result)
    }
}
