use async_trait::async_trait;

use crate::error::UniclassResult;
use crate::models::UniclassMatch;

/// Repository trait for the similarity-search backend.
///
/// One call resolves a whole batch: the four slices are parallel arrays,
/// index `k` in each referring to the same query. Implementations return
/// zero or more records per request id, in no guaranteed order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MatchRepository: Send + Sync {
    /// Rank each query embedding against the classification tables.
    ///
    /// `embeddings` carries the transport-encoded vectors (see
    /// [`crate::models::encode_embedding`]); `uniclass_types` the
    /// upper-cased table filters.
    async fn match_queries(
        &self,
        request_ids: &[i64],
        embeddings: &[String],
        uniclass_types: &[String],
        depths: &[i32],
    ) -> UniclassResult<Vec<UniclassMatch>>;
}
