use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::SupabaseConfig;
use crate::error::{UniclassError, UniclassResult};
use crate::models::UniclassMatch;
use crate::repository::MatchRepository;

/// Stored procedure ranking query embeddings against the uniclass tables.
const MATCH_FUNCTION: &str = "match_uniclass";

/// Supabase-backed implementation of MatchRepository.
///
/// Issues the batch match as a single PostgREST RPC call carrying the four
/// parallel arrays; the pgvector ranking itself runs inside the database.
pub struct SupabaseMatchRepository {
    client: Client,
    config: SupabaseConfig,
}

impl SupabaseMatchRepository {
    pub fn new(config: SupabaseConfig) -> UniclassResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| UniclassError::Config(format!("Failed to build client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn from_env() -> UniclassResult<Self> {
        Self::new(SupabaseConfig::from_env()?)
    }
}

#[derive(Debug, Serialize)]
struct MatchRpcRequest<'a> {
    query_ids: &'a [i64],
    query_embeddings: &'a [String],
    uniclass_types: &'a [String],
    depths: &'a [i32],
}

#[async_trait]
impl MatchRepository for SupabaseMatchRepository {
    async fn match_queries(
        &self,
        request_ids: &[i64],
        embeddings: &[String],
        uniclass_types: &[String],
        depths: &[i32],
    ) -> UniclassResult<Vec<UniclassMatch>> {
        if request_ids.is_empty() {
            return Ok(vec![]);
        }

        let request = MatchRpcRequest {
            query_ids: request_ids,
            query_embeddings: embeddings,
            uniclass_types,
            depths,
        };

        let response = self
            .client
            .post(self.config.rpc_url(MATCH_FUNCTION))
            .header("apikey", &self.config.service_key)
            .header(
                "Authorization",
                format!("Bearer {}", self.config.service_key),
            )
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| UniclassError::Backend(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(UniclassError::Backend(format!(
                "{} RPC failed ({}): {}",
                MATCH_FUNCTION, status, error_text
            )));
        }

        let matches: Vec<UniclassMatch> = response
            .json()
            .await
            .map_err(|e| UniclassError::Backend(format!("Malformed RPC response: {}", e)))?;

        Ok(matches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_request_serializes_parallel_arrays() {
        let request = MatchRpcRequest {
            query_ids: &[0, 2],
            query_embeddings: &["[0.1,0.2]".to_string(), "[0.3,0.4]".to_string()],
            uniclass_types: &["EF".to_string(), "SS".to_string()],
            depths: &[2, 3],
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["query_ids"], serde_json::json!([0, 2]));
        assert_eq!(
            json["query_embeddings"],
            serde_json::json!(["[0.1,0.2]", "[0.3,0.4]"])
        );
        assert_eq!(json["uniclass_types"], serde_json::json!(["EF", "SS"]));
        assert_eq!(json["depths"], serde_json::json!([2, 3]));
    }

    #[tokio::test]
    async fn test_empty_batch_skips_the_call() {
        // Unroutable config: proves no request is attempted for zero ids.
        let repository = SupabaseMatchRepository::new(SupabaseConfig::new(
            "http://127.0.0.1:1".to_string(),
            "key".to_string(),
        ))
        .unwrap();

        let matches = repository.match_queries(&[], &[], &[], &[]).await.unwrap();
        assert!(matches.is_empty());
    }
}
