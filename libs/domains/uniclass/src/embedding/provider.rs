use async_trait::async_trait;

use crate::error::UniclassResult;
use crate::models::EmbeddingModel;

/// Trait for embedding generation providers
///
/// Implementations call a remote embeddings API for one sub-batch of texts
/// at a time. A successful result is aligned 1:1 with the input: element
/// `i` embeds text `i`, and the length equals the input length. An
/// implementation that cannot honor that must return an error for the
/// whole sub-batch instead.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate embeddings for one sub-batch of texts
    async fn embed_batch(
        &self,
        model: EmbeddingModel,
        texts: &[String],
    ) -> UniclassResult<Vec<Vec<f32>>>;
}
