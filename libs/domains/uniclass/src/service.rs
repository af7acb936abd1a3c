use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::instrument;

use crate::embedding::EmbeddingProvider;
use crate::error::{UniclassError, UniclassResult};
use crate::models::{
    EmbeddingModel, MatchQuery, MatchRecord, ResolvedQuery, UniclassMatch, encode_embedding,
};
use crate::repository::MatchRepository;

/// Largest sub-batch sent to the embedding provider in one call.
pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Uniclass match service: embeds a batch of free-text queries and
/// resolves each embedding against the similarity-search backend.
///
/// The pipeline is a straight line: resolve optional fields, embed in
/// concurrent sub-batches, issue one backend call for the queries that
/// embedded, reconcile backend records onto the original batch order.
/// Every input query produces exactly one output record.
pub struct MatchService<R: MatchRepository> {
    repository: Arc<R>,
    embedder: Arc<dyn EmbeddingProvider>,
    model: EmbeddingModel,
    chunk_size: usize,
}

impl<R: MatchRepository> MatchService<R> {
    pub fn new(repository: R, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            repository: Arc::new(repository),
            embedder,
            model: EmbeddingModel::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_model(mut self, model: EmbeddingModel) -> Self {
        self.model = model;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Match a batch of queries against the classification tables.
    ///
    /// Returns one record per input query, in input order. Per-query
    /// embedding failures become placeholder records; a backend failure
    /// fails the whole batch since no query's outcome is knowable then.
    #[instrument(skip(self, queries), fields(query_count = queries.len()))]
    pub async fn match_batch(&self, queries: &[MatchQuery]) -> UniclassResult<Vec<MatchRecord>> {
        if queries.is_empty() {
            return Err(UniclassError::Validation(
                "queries must be a non-empty list".to_string(),
            ));
        }

        let resolved: Vec<ResolvedQuery> = queries
            .iter()
            .enumerate()
            .map(|(position, query)| query.resolve(position))
            .collect();

        let embeddings = self.embed_queries(&resolved).await;
        let matches = self.request_matches(&resolved, &embeddings).await?;

        Ok(reconcile(&resolved, &embeddings, matches))
    }

    /// Embed every query text, sub-batched to the provider limit.
    ///
    /// All sub-batch requests are issued concurrently and joined with a
    /// wait-for-all barrier; the flattened result is aligned 1:1 with
    /// `queries`, with `None` marking texts whose sub-batch failed.
    async fn embed_queries(&self, queries: &[ResolvedQuery]) -> Vec<Option<Vec<f32>>> {
        let texts: Vec<String> = queries.iter().map(|q| q.text.clone()).collect();

        let fetches = texts.chunks(self.chunk_size).map(|chunk| self.embed_chunk(chunk));

        join_all(fetches).await.into_iter().flatten().collect()
    }

    /// Fetch one sub-batch of embeddings; total by construction.
    ///
    /// A failed or misaligned provider call degrades to failure markers
    /// for every text in the sub-batch; other sub-batches are unaffected.
    async fn embed_chunk(&self, texts: &[String]) -> Vec<Option<Vec<f32>>> {
        match self.embedder.embed_batch(self.model, texts).await {
            Ok(vectors) if vectors.len() == texts.len() => {
                vectors.into_iter().map(Some).collect()
            }
            Ok(vectors) => {
                tracing::error!(
                    expected = texts.len(),
                    received = vectors.len(),
                    "Embedding sub-batch came back misaligned"
                );
                vec![None; texts.len()]
            }
            Err(err) => {
                tracing::error!(chunk_len = texts.len(), "Embedding sub-batch failed: {}", err);
                vec![None; texts.len()]
            }
        }
    }

    /// Issue the single backend call for every query that embedded.
    ///
    /// Queries with a failure marker are dropped from the payload entirely;
    /// they resurface as placeholders during reconciliation.
    async fn request_matches(
        &self,
        queries: &[ResolvedQuery],
        embeddings: &[Option<Vec<f32>>],
    ) -> UniclassResult<Vec<UniclassMatch>> {
        let mut request_ids = Vec::new();
        let mut encoded = Vec::new();
        let mut uniclass_types = Vec::new();
        let mut depths = Vec::new();

        for (query, embedding) in queries.iter().zip(embeddings) {
            let Some(values) = embedding else { continue };
            request_ids.push(query.request_id);
            encoded.push(encode_embedding(values));
            uniclass_types.push(query.uniclass_type.clone());
            depths.push(query.depth);
        }

        if request_ids.is_empty() {
            tracing::warn!("No query embedded successfully; skipping backend call");
            return Ok(Vec::new());
        }

        self.repository
            .match_queries(&request_ids, &encoded, &uniclass_types, &depths)
            .await
    }
}

impl<R: MatchRepository> Clone for MatchService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            embedder: Arc::clone(&self.embedder),
            model: self.model,
            chunk_size: self.chunk_size,
        }
    }
}

/// Join backend records back onto the original batch.
///
/// Records are keyed by request id; when the backend returns several
/// records for one id, the last one in response order wins. Positions
/// absent from the lookup become placeholders, distinguished by whether
/// the query's embedding existed when the backend was called.
fn reconcile(
    queries: &[ResolvedQuery],
    embeddings: &[Option<Vec<f32>>],
    matches: Vec<UniclassMatch>,
) -> Vec<MatchRecord> {
    let by_id: HashMap<i64, UniclassMatch> =
        matches.into_iter().map(|m| (m.request_id, m)).collect();

    queries
        .iter()
        .zip(embeddings)
        .map(|(query, embedding)| match by_id.get(&query.request_id) {
            Some(m) => MatchRecord::matched(query.request_id, m),
            None if embedding.is_some() => MatchRecord::no_match(query.request_id),
            None => MatchRecord::embedding_failed(query.request_id),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::MockEmbeddingProvider;
    use crate::repository::MockMatchRepository;

    fn query(text: &str, uniclass_type: &str) -> MatchQuery {
        MatchQuery {
            request_id: None,
            query: text.to_string(),
            uniclass_type: uniclass_type.to_string(),
            depth: None,
        }
    }

    fn record(request_id: i64, code: &str, title: &str, similarity: f32) -> UniclassMatch {
        UniclassMatch {
            request_id,
            code: code.to_string(),
            title: title.to_string(),
            similarity,
        }
    }

    fn embedder_returning_unit_vectors() -> MockEmbeddingProvider {
        let mut embedder = MockEmbeddingProvider::new();
        embedder
            .expect_embed_batch()
            .returning(|_, texts| Ok(texts.iter().map(|_| vec![0.1, 0.2]).collect()));
        embedder
    }

    #[tokio::test]
    async fn test_empty_batch_is_rejected_before_any_call() {
        let mut embedder = MockEmbeddingProvider::new();
        embedder.expect_embed_batch().times(0);
        let mut repository = MockMatchRepository::new();
        repository.expect_match_queries().times(0);

        let service = MatchService::new(repository, Arc::new(embedder));
        let err = service.match_batch(&[]).await.unwrap_err();

        assert!(matches!(err, UniclassError::Validation(_)));
    }

    #[tokio::test]
    async fn test_output_aligned_with_input_order_and_positional_ids() {
        let embedder = embedder_returning_unit_vectors();

        let mut repository = MockMatchRepository::new();
        repository.expect_match_queries().returning(|ids, _, _, _| {
            assert_eq!(ids, [0, 1, 2]);
            // Backend order is not input order
            Ok(vec![
                record(2, "Pr_20", "Walls", 0.91),
                record(0, "Pr_30", "Doors", 0.84),
            ])
        });

        let service = MatchService::new(repository, Arc::new(embedder));
        let results = service
            .match_batch(&[query("door", "pr"), query("xyzzy", "pr"), query("wall", "pr")])
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].request_id, 0);
        assert_eq!(results[0].r#match, "Pr_30:Doors:0.84");
        assert_eq!(results[1].request_id, 1);
        assert_eq!(results[1].r#match, "No match found:0.00");
        assert_eq!(results[1].confidence, 0.0);
        assert_eq!(results[2].request_id, 2);
        assert_eq!(results[2].r#match, "Pr_20:Walls:0.91");
        assert_eq!(results[2].confidence, 0.91);
    }

    #[tokio::test]
    async fn test_explicit_request_ids_survive_the_pipeline() {
        let embedder = embedder_returning_unit_vectors();

        let mut repository = MockMatchRepository::new();
        repository
            .expect_match_queries()
            .returning(|ids, _, _, _| {
                assert_eq!(ids, [40, 41]);
                Ok(vec![record(41, "EF_25", "Roofs", 0.77)])
            });

        let mut first = query("roof", "ef");
        first.request_id = Some(40);
        let mut second = query("roof tile", "ef");
        second.request_id = Some(41);

        let service = MatchService::new(repository, Arc::new(embedder));
        let results = service.match_batch(&[first, second]).await.unwrap();

        assert_eq!(results[0].request_id, 40);
        assert_eq!(results[0].r#match, "No match found:0.00");
        assert_eq!(results[1].request_id, 41);
        assert_eq!(results[1].r#match, "EF_25:Roofs:0.77");
    }

    #[tokio::test]
    async fn test_payload_carries_uppercased_types_and_default_depths() {
        let embedder = embedder_returning_unit_vectors();

        let mut repository = MockMatchRepository::new();
        repository
            .expect_match_queries()
            .withf(|ids, embeddings, types, depths| {
                ids == [0, 1]
                    && embeddings == ["[0.1,0.2]".to_string(), "[0.1,0.2]".to_string()]
                    && types == ["PR".to_string(), "SS".to_string()]
                    && depths == [2, 4]
            })
            .returning(|_, _, _, _| Ok(vec![]));

        let mut deep = query("beam", "ss");
        deep.depth = Some(4);

        let service = MatchService::new(repository, Arc::new(embedder));
        service
            .match_batch(&[query("door", "pr"), deep])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_chunking_respects_limit_and_preserves_order() {
        let mut embedder = MockEmbeddingProvider::new();
        embedder
            .expect_embed_batch()
            .withf(|_, texts| texts == ["q0".to_string(), "q1".to_string()])
            .times(1)
            .returning(|_, texts| Ok(texts.iter().map(|_| vec![0.0]).collect()));
        embedder
            .expect_embed_batch()
            .withf(|_, texts| texts == ["q2".to_string(), "q3".to_string()])
            .times(1)
            .returning(|_, texts| Ok(texts.iter().map(|_| vec![0.0]).collect()));
        embedder
            .expect_embed_batch()
            .withf(|_, texts| texts == ["q4".to_string()])
            .times(1)
            .returning(|_, texts| Ok(texts.iter().map(|_| vec![0.0]).collect()));

        let mut repository = MockMatchRepository::new();
        repository
            .expect_match_queries()
            .withf(|ids, _, _, _| ids == [0, 1, 2, 3, 4])
            .returning(|_, _, _, _| Ok(vec![]));

        let queries: Vec<MatchQuery> =
            (0..5).map(|i| query(&format!("q{}", i), "pr")).collect();

        let service =
            MatchService::new(repository, Arc::new(embedder)).with_chunk_size(2);
        let results = service.match_batch(&queries).await.unwrap();

        assert_eq!(results.len(), 5);
    }

    #[tokio::test]
    async fn test_one_failed_chunk_does_not_affect_the_others() {
        let mut embedder = MockEmbeddingProvider::new();
        embedder
            .expect_embed_batch()
            .withf(|_, texts| texts[0] == "bad")
            .returning(|_, _| Err(UniclassError::Embedding("provider 500".to_string())));
        embedder
            .expect_embed_batch()
            .withf(|_, texts| texts[0] != "bad")
            .returning(|_, texts| Ok(texts.iter().map(|_| vec![0.1, 0.2]).collect()));

        let mut repository = MockMatchRepository::new();
        repository
            .expect_match_queries()
            .withf(|ids, embeddings, _, _| ids == [2, 3] && embeddings.len() == 2)
            .returning(|_, _, _, _| Ok(vec![record(2, "Pr_15", "Windows", 0.8)]));

        let queries = vec![
            query("bad", "pr"),
            query("also lost", "pr"),
            query("window", "pr"),
            query("unmatched", "pr"),
        ];

        let service =
            MatchService::new(repository, Arc::new(embedder)).with_chunk_size(2);
        let results = service.match_batch(&queries).await.unwrap();

        assert_eq!(results.len(), 4);
        assert_eq!(results[0].r#match, "Embedding failed:0.00");
        assert_eq!(results[1].r#match, "Embedding failed:0.00");
        assert_eq!(results[2].r#match, "Pr_15:Windows:0.80");
        assert_eq!(results[3].r#match, "No match found:0.00");
    }

    #[tokio::test]
    async fn test_misaligned_provider_response_fails_the_whole_chunk() {
        let mut embedder = MockEmbeddingProvider::new();
        embedder
            .expect_embed_batch()
            .returning(|_, _| Ok(vec![vec![0.1]]));

        let mut repository = MockMatchRepository::new();
        repository.expect_match_queries().times(0);

        let service = MatchService::new(repository, Arc::new(embedder));
        let results = service
            .match_batch(&[query("a", "pr"), query("b", "pr")])
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.r#match == "Embedding failed:0.00"));
    }

    #[tokio::test]
    async fn test_backend_failure_fails_the_invocation() {
        let embedder = embedder_returning_unit_vectors();

        let mut repository = MockMatchRepository::new();
        repository
            .expect_match_queries()
            .returning(|_, _, _, _| Err(UniclassError::Backend("db unreachable".to_string())));

        let service = MatchService::new(repository, Arc::new(embedder));
        let err = service.match_batch(&[query("door", "pr")]).await.unwrap_err();

        assert!(matches!(err, UniclassError::Backend(_)));
    }

    #[tokio::test]
    async fn test_duplicate_backend_records_last_one_wins() {
        let embedder = embedder_returning_unit_vectors();

        let mut repository = MockMatchRepository::new();
        repository.expect_match_queries().returning(|_, _, _, _| {
            Ok(vec![
                record(0, "Pr_10", "First", 0.5),
                record(0, "Pr_11", "Second", 0.6),
            ])
        });

        let service = MatchService::new(repository, Arc::new(embedder));
        let results = service.match_batch(&[query("door", "pr")]).await.unwrap();

        assert_eq!(results[0].r#match, "Pr_11:Second:0.60");
        assert_eq!(results[0].confidence, 0.6);
    }

    #[tokio::test]
    async fn test_duplicate_input_ids_all_receive_the_looked_up_match() {
        let embedder = embedder_returning_unit_vectors();

        let mut repository = MockMatchRepository::new();
        repository
            .expect_match_queries()
            .withf(|ids, _, _, _| ids == [5, 5])
            .returning(|_, _, _, _| Ok(vec![record(5, "Pr_40", "Stairs", 0.72)]));

        let mut first = query("stair", "pr");
        first.request_id = Some(5);
        let mut second = query("staircase", "pr");
        second.request_id = Some(5);

        let service = MatchService::new(repository, Arc::new(embedder));
        let results = service.match_batch(&[first, second]).await.unwrap();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.r#match == "Pr_40:Stairs:0.72"));
    }

    #[tokio::test]
    async fn test_worked_example_from_the_api_contract() {
        let embedder = embedder_returning_unit_vectors();

        let mut repository = MockMatchRepository::new();
        repository
            .expect_match_queries()
            .returning(|_, _, _, _| Ok(vec![record(0, "C10", "Doors", 0.873)]));

        let service = MatchService::new(repository, Arc::new(embedder));
        let results = service
            .match_batch(&[query("fire door", "pr"), query("xyzzy-nonsense", "pr")])
            .await
            .unwrap();

        assert_eq!(results[0].request_id, 0);
        assert_eq!(results[0].r#match, "C10:Doors:0.87");
        assert_eq!(results[0].confidence, 0.873);
        assert_eq!(results[1].request_id, 1);
        assert_eq!(results[1].r#match, "No match found:0.00");
        assert_eq!(results[1].confidence, 0.0);
    }
}
