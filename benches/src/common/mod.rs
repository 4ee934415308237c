use async_trait::async_trait;
use pseudonymous::prelude::*;
use serde_json::json;
use std::time::Duration;

/// Generate a provider holding `per_category` records in each category
pub fn generate_provider(categories: &[&str], per_category: usize) -> MemoryProvider {
    categories.iter().fold(MemoryProvider::new(), |provider, name| {
        let records = (0..per_category).map(|n| {
            let payload = json!({
                "resourceType": name,
                "id": n.to_string(),
                "identifier": [{"system": "urn:mrn", "value": format!("{}-{}", name, n)}],
            });
            (
                RecordId::new(n.to_string()),
                payload.as_object().cloned().unwrap_or_default(),
            )
        });
        provider.with_category(name, records)
    })
}

/// Echo transform simulating a fixed service latency
pub struct LatencyTransform(pub Duration);

#[async_trait]
impl TransformClient for LatencyTransform {
    async fn send(&self, payload: &[u8], _routing_label: &str) -> Result<Vec<u8>, TransformError> {
        if !self.0.is_zero() {
            tokio::time::sleep(self.0).await;
        }
        Ok(payload.to_vec())
    }
}
