use async_trait::async_trait;

use super::error::TransformError;

/// Remote service converting a payload into its de-identified equivalent
#[async_trait]
pub trait TransformClient: Send + Sync {
    /// Transform `payload`, scoped by `routing_label`
    ///
    /// Retries are the implementation's concern; an error means the call
    /// never succeeded within its budget.
    async fn send(&self, payload: &[u8], routing_label: &str) -> Result<Vec<u8>, TransformError>;
}

#[async_trait]
impl<C: TransformClient + ?Sized> TransformClient for std::sync::Arc<C> {
    async fn send(&self, payload: &[u8], routing_label: &str) -> Result<Vec<u8>, TransformError> {
        (**self).send(payload, routing_label).await
    }
}
