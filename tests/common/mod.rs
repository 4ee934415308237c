#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use pseudonymous::prelude::*;
use serde_json::{Value, json};

/// Echo transform; payloads carrying `"fail": true` are rejected with a 500
/// and those carrying `"garble": true` get a non-object response
#[derive(Default)]
pub struct EchoTransform {
    pub calls: AtomicUsize,
}

#[async_trait]
impl TransformClient for EchoTransform {
    async fn send(&self, payload: &[u8], _routing_label: &str) -> Result<Vec<u8>, TransformError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let value: Value = serde_json::from_slice(payload)?;
        if value["fail"] == json!(true) {
            return Err(TransformError::Status {
                status: 500,
                body: "pseudonymizer unavailable".to_string(),
            });
        }
        if value["garble"] == json!(true) {
            return Ok(b"[]".to_vec());
        }
        Ok(payload.to_vec())
    }
}

/// Transform answering every request with a JSON array
pub struct GarbledTransform;

#[async_trait]
impl TransformClient for GarbledTransform {
    async fn send(&self, _payload: &[u8], _routing_label: &str) -> Result<Vec<u8>, TransformError> {
        Ok(b"[]".to_vec())
    }
}

pub fn document(value: Value) -> Document {
    value.as_object().cloned().unwrap_or_default()
}

/// `count` records of one resource type with ids `<prefix>-<n>`
pub fn resources(resource_type: &str, count: usize) -> Vec<(RecordId, Document)> {
    (0..count)
        .map(|n| {
            (
                RecordId::new(format!("{}-{}", resource_type.to_lowercase(), n)),
                document(json!({"resourceType": resource_type, "id": n.to_string()})),
            )
        })
        .collect()
}

pub fn processor<T>(
    provider: MemoryProvider,
    client: T,
    concurrency: usize,
) -> Processor<MemoryProvider, T>
where
    T: TransformClient + 'static,
{
    Processor::with_components(
        provider,
        client,
        PipelineSettings::new("test").with_concurrency(concurrency),
    )
}

pub fn shared_echo() -> Arc<EchoTransform> {
    Arc::new(EchoTransform::default())
}
