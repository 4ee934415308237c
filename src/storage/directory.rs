use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, error, info};

use super::error::ProviderError;
use super::traits::{RecordSink, StorageProvider};
use crate::config::DirectoryConfig;
use crate::domain::{Category, Document, Record, RecordId, TransformedRecord};

const SOURCE_EXTENSION: &str = "ndjson";

/// On-disk shape of one record, both at the source and the destination
#[derive(Debug, Serialize, Deserialize)]
struct StoredRecord {
    #[serde(rename = "_id")]
    id: RecordId,
    fhir: Document,
}

/// Filesystem provider
///
/// Each `*.ndjson` file under the source directory is a category holding one
/// record per line. Transformed records land in
/// `<destination>/<category>/<id>.json`.
pub struct DirectoryProvider {
    name: String,
    source: PathBuf,
    destination: PathBuf,
    closed: AtomicBool,
}

impl DirectoryProvider {
    /// Resolve source and destination locations for a project
    pub fn new(config: &DirectoryConfig, project: &str) -> Self {
        let source = config
            .root
            .join(format!("{}{}", config.source_prefix, project));
        let destination = config
            .root
            .join(format!("{}{}", config.destination_prefix, project));

        Self {
            name: format!("directory:{}", config.root.display()),
            source,
            destination,
            closed: AtomicBool::new(false),
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Source category files, sorted by name
    async fn categories(&self) -> Result<Vec<(Category, PathBuf)>, ProviderError> {
        let mut entries = fs::read_dir(&self.source).await.map_err(|e| {
            error!(source = %self.source.display(), error = %e, "Failed to list source categories");
            e
        })?;

        let mut categories = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(SOURCE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                categories.push((Category::new(stem), path.clone()));
            }
        }
        categories.sort_by(|a, b| a.0.cmp(&b.0));

        Ok(categories)
    }

    async fn read_category(
        &self,
        category: &Category,
        path: &Path,
        sink: &RecordSink,
    ) -> Result<usize, ProviderError> {
        let file = fs::File::open(path).await?;
        let mut lines = BufReader::new(file).lines();
        let mut line_no = 0;
        let mut count = 0;

        while let Some(line) = lines.next_line().await? {
            line_no += 1;
            if line.trim().is_empty() {
                continue;
            }

            let stored: StoredRecord =
                serde_json::from_str(&line).map_err(|source| ProviderError::MalformedRecord {
                    path: path.to_path_buf(),
                    line: line_no,
                    source,
                })?;

            sink.push(Record::new(stored.id, stored.fhir, category.clone()))
                .await?;
            count += 1;
        }

        Ok(count)
    }

    fn destination_path(&self, category: &Category, id: &RecordId) -> Result<PathBuf, ProviderError> {
        validate_component(id.as_str())?;
        validate_component(category.name())?;

        Ok(self
            .destination
            .join(category.name())
            .join(format!("{}.json", id.as_str())))
    }
}

/// Ids and category names become path components and must stay inside the
/// destination directory
fn validate_component(value: &str) -> Result<(), ProviderError> {
    let invalid = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains(['/', '\\', '\0']);

    if invalid {
        return Err(ProviderError::InvalidId(value.to_string()));
    }
    Ok(())
}

#[async_trait]
impl StorageProvider for DirectoryProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(&self, sink: RecordSink) -> Result<(), ProviderError> {
        let categories = self.categories().await?;

        if categories.is_empty() {
            error!(source = %self.source.display(), "No categories found in source directory");
            return Err(ProviderError::NoCategories(
                self.source.display().to_string(),
            ));
        }

        for (category, path) in &categories {
            let count = self.read_category(category, path, &sink).await?;
            info!(
                source = %self.source.display(),
                category = %category,
                count,
                "Successfully read records from category"
            );
        }

        Ok(())
    }

    async fn write(&self, record: TransformedRecord) -> Result<(), ProviderError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(ProviderError::Closed);
        }

        let path = self.destination_path(record.origin(), record.id())?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let (id, fhir, _) = record.into_parts();
        let body = serde_json::to_vec(&StoredRecord { id, fhir })?;

        // Write-then-rename so concurrent readers never see a partial file
        let staging = path.with_extension("json.tmp");
        fs::write(&staging, &body).await?;
        fs::rename(&staging, &path).await?;

        debug!(path = %path.display(), "Stored record");
        Ok(())
    }

    async fn close(&self) -> Result<(), ProviderError> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    fn config(root: &Path) -> DirectoryConfig {
        DirectoryConfig {
            root: root.to_path_buf(),
            ..DirectoryConfig::default()
        }
    }

    fn source_dir(root: &TempDir, project: &str) -> PathBuf {
        let dir = root.path().join(format!("idat_fhir_{}", project));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    async fn read_all(provider: &DirectoryProvider) -> (Result<(), ProviderError>, Vec<Record>) {
        let (tx, mut rx) = mpsc::channel(64);
        let result = provider.read(RecordSink::new(tx)).await;
        let mut records = Vec::new();
        while let Some(record) = rx.recv().await {
            records.push(record);
        }
        (result, records)
    }

    fn payload(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn resolves_prefixed_locations() {
        let root = TempDir::new().unwrap();
        let provider = DirectoryProvider::new(&config(root.path()), "study");

        assert_eq!(provider.source(), root.path().join("idat_fhir_study"));
        assert_eq!(provider.destination(), root.path().join("psn_fhir_study"));
    }

    #[tokio::test]
    async fn reads_each_ndjson_file_as_category() {
        let root = TempDir::new().unwrap();
        let dir = source_dir(&root, "study");
        std::fs::write(
            dir.join("Patient.ndjson"),
            "{\"_id\":\"p1\",\"fhir\":{\"resourceType\":\"Patient\"}}\n\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("Observation.ndjson"),
            "{\"_id\":\"o1\",\"fhir\":{\"resourceType\":\"Observation\"}}\n\
             {\"_id\":\"o2\",\"fhir\":{\"resourceType\":\"Observation\"}}\n",
        )
        .unwrap();
        std::fs::write(dir.join("notes.txt"), "ignored").unwrap();

        let provider = DirectoryProvider::new(&config(root.path()), "study");
        let (result, records) = read_all(&provider).await;

        assert!(result.is_ok());
        assert_eq!(records.len(), 3);
        // Observation sorts before Patient
        assert_eq!(records[0].origin.name(), "Observation");
        assert_eq!(records[2].id.as_str(), "p1");
        assert_eq!(records[2].payload["resourceType"], json!("Patient"));
    }

    #[tokio::test]
    async fn empty_source_has_no_categories() {
        let root = TempDir::new().unwrap();
        source_dir(&root, "study");

        let provider = DirectoryProvider::new(&config(root.path()), "study");
        let (result, records) = read_all(&provider).await;

        assert!(matches!(result, Err(ProviderError::NoCategories(_))));
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn missing_source_is_io_error() {
        let root = TempDir::new().unwrap();
        let provider = DirectoryProvider::new(&config(root.path()), "absent");
        let (result, _) = read_all(&provider).await;

        assert!(matches!(result, Err(ProviderError::Io(_))));
    }

    #[tokio::test]
    async fn malformed_line_stops_read_after_earlier_records() {
        let root = TempDir::new().unwrap();
        let dir = source_dir(&root, "study");
        std::fs::write(
            dir.join("Patient.ndjson"),
            "{\"_id\":\"p1\",\"fhir\":{}}\nnot json\n{\"_id\":\"p3\",\"fhir\":{}}\n",
        )
        .unwrap();

        let provider = DirectoryProvider::new(&config(root.path()), "study");
        let (result, records) = read_all(&provider).await;

        assert!(matches!(
            result,
            Err(ProviderError::MalformedRecord { line: 2, .. })
        ));
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn write_is_idempotent_upsert() {
        let root = TempDir::new().unwrap();
        let provider = DirectoryProvider::new(&config(root.path()), "study");
        let record = Record::new(
            "p1",
            payload(json!({"resourceType": "Patient"})),
            Category::new("Patient"),
        );
        let transformed = payload(json!({"resourceType": "Patient", "id": "psn"}));

        provider
            .write(record.clone().into_transformed(transformed.clone()))
            .await
            .unwrap();
        let path = provider.destination().join("Patient").join("p1.json");
        let first = std::fs::read(&path).unwrap();

        provider
            .write(record.into_transformed(transformed))
            .await
            .unwrap();
        let second = std::fs::read(&path).unwrap();

        assert_eq!(first, second);
        let stored: serde_json::Value = serde_json::from_slice(&second).unwrap();
        assert_eq!(stored["_id"], json!("p1"));
        assert_eq!(stored["fhir"]["id"], json!("psn"));
    }

    #[tokio::test]
    async fn rejects_ids_escaping_destination() {
        let root = TempDir::new().unwrap();
        let provider = DirectoryProvider::new(&config(root.path()), "study");
        let record = Record::new("../evil", Document::new(), Category::new("Patient"));

        let result = provider.write(record.into_transformed(Document::new())).await;

        assert!(matches!(result, Err(ProviderError::InvalidId(_))));
    }

    #[tokio::test]
    async fn write_after_close_fails() {
        let root = TempDir::new().unwrap();
        let provider = DirectoryProvider::new(&config(root.path()), "study");
        provider.close().await.unwrap();

        let record = Record::new("p1", Document::new(), Category::new("Patient"));
        let result = provider.write(record.into_transformed(Document::new())).await;

        assert!(matches!(result, Err(ProviderError::Closed)));
    }
}
