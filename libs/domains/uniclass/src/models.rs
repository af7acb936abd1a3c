use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Classification depth applied when a query does not specify one.
pub const DEFAULT_DEPTH: i32 = 2;

/// Sentinel match text for queries the backend returned no record for.
pub const NO_MATCH: &str = "No match found:0.00";

/// Sentinel match text for queries whose embedding could not be generated.
pub const EMBEDDING_FAILED: &str = "Embedding failed:0.00";

/// One inbound query of a match batch.
///
/// `request_id` and `depth` are optional on the wire; both are resolved to
/// concrete values the moment the batch is ingested (see
/// [`MatchQuery::resolve`]) so the pipeline never re-checks presence.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MatchQuery {
    /// Caller-supplied correlation id; defaults to the query's position
    #[serde(default)]
    pub request_id: Option<i64>,
    /// Free-text query to classify
    pub query: String,
    /// Uniclass table to search (e.g. "EF", "Ss"); matched case-insensitively
    pub uniclass_type: String,
    /// Classification depth; defaults to 2
    #[serde(default)]
    pub depth: Option<i32>,
}

impl MatchQuery {
    /// Resolve optional fields against this query's position in the batch.
    ///
    /// The type filter is upper-cased here, once, before any downstream use.
    pub fn resolve(&self, position: usize) -> ResolvedQuery {
        ResolvedQuery {
            request_id: self.request_id.unwrap_or(position as i64),
            text: self.query.clone(),
            uniclass_type: self.uniclass_type.to_uppercase(),
            depth: self.depth.unwrap_or(DEFAULT_DEPTH),
        }
    }
}

/// A query with every field resolved to a concrete value.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedQuery {
    pub request_id: i64,
    pub text: String,
    pub uniclass_type: String,
    pub depth: i32,
}

/// One record returned by the similarity-search backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniclassMatch {
    pub request_id: i64,
    pub code: String,
    pub title: String,
    pub similarity: f32,
}

/// One output record, aligned 1:1 with the inbound batch.
///
/// `match` is the colon-delimited `"<code>:<title>:<similarity>"` encoding
/// with the similarity fixed to two decimal places, or one of the
/// [`NO_MATCH`] / [`EMBEDDING_FAILED`] sentinels. The grammar lives in the
/// constructors below; nothing else formats this string.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MatchRecord {
    pub request_id: i64,
    pub r#match: String,
    pub confidence: f32,
}

impl MatchRecord {
    /// Record for a query the backend matched.
    pub fn matched(request_id: i64, m: &UniclassMatch) -> Self {
        Self {
            request_id,
            r#match: format!("{}:{}:{:.2}", m.code, m.title, m.similarity),
            confidence: m.similarity,
        }
    }

    /// Record for a query that embedded successfully but matched nothing.
    pub fn no_match(request_id: i64) -> Self {
        Self {
            request_id,
            r#match: NO_MATCH.to_string(),
            confidence: 0.0,
        }
    }

    /// Record for a query that never reached the backend because its
    /// embedding failed upstream.
    pub fn embedding_failed(request_id: i64) -> Self {
        Self {
            request_id,
            r#match: EMBEDDING_FAILED.to_string(),
            confidence: 0.0,
        }
    }
}

/// Embedding model selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbeddingModel {
    /// OpenAI text-embedding-3-small (1536 dimensions)
    #[default]
    TextEmbedding3Small,
    /// OpenAI text-embedding-3-large (3072 dimensions)
    TextEmbedding3Large,
    /// OpenAI text-embedding-ada-002 (1536 dimensions, legacy)
    TextEmbeddingAda002,
    /// Custom model with specified dimension
    Custom(u32),
}

impl EmbeddingModel {
    pub fn dimension(&self) -> u32 {
        match self {
            EmbeddingModel::TextEmbedding3Small => 1536,
            EmbeddingModel::TextEmbedding3Large => 3072,
            EmbeddingModel::TextEmbeddingAda002 => 1536,
            EmbeddingModel::Custom(dim) => *dim,
        }
    }

    pub fn model_name(&self) -> &str {
        match self {
            EmbeddingModel::TextEmbedding3Small => "text-embedding-3-small",
            EmbeddingModel::TextEmbedding3Large => "text-embedding-3-large",
            EmbeddingModel::TextEmbeddingAda002 => "text-embedding-ada-002",
            EmbeddingModel::Custom(_) => "custom",
        }
    }
}

impl std::str::FromStr for EmbeddingModel {
    type Err = crate::error::UniclassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text-embedding-3-small" => Ok(EmbeddingModel::TextEmbedding3Small),
            "text-embedding-3-large" => Ok(EmbeddingModel::TextEmbedding3Large),
            "text-embedding-ada-002" => Ok(EmbeddingModel::TextEmbeddingAda002),
            other => Err(crate::error::UniclassError::Config(format!(
                "Unknown embedding model: {}",
                other
            ))),
        }
    }
}

/// Encode an embedding into the backend's text transport format.
///
/// Grammar: `[` f32 ( `,` f32 )* `]`, the pgvector input literal.
pub fn encode_embedding(values: &[f32]) -> String {
    let elements: Vec<String> = values.iter().map(|v| v.to_string()).collect();
    format!("[{}]", elements.join(","))
}
