//! Uniclass Match Domain Library
//!
//! Batch semantic classification: embed free-text queries through a remote
//! embedding provider and resolve each embedding against a pgvector-backed
//! similarity search, reconciling results onto the original batch.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  MatchService   │  ← chunked fan-out, payload build, reconciliation
//! └────────┬────────┘
//!          │
//! ┌────────▼────────┐     ┌──────────────────┐
//! │ MatchRepository │     │ EmbeddingProvider│
//! │    (trait)      │     │     (trait)      │
//! └────────┬────────┘     └────────┬─────────┘
//!          │                       │
//! ┌────────▼─────────────┐  ┌──────▼─────────┐
//! │SupabaseMatchRepository│  │ OpenAIProvider │
//! │  (PostgREST RPC)      │  │                │
//! └───────────────────────┘  └────────────────┘
//! ```
//!
//! # Pipeline guarantees
//!
//! - One output record per input query, in input order, keyed by the
//!   resolved request id.
//! - Embedding sub-batches run concurrently; one failed sub-batch marks
//!   only its own queries as failed and never aborts the batch.
//! - The backend is called exactly once per batch; its failure fails the
//!   whole invocation.

pub mod embedding;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod supabase;

// Re-export commonly used types
pub use embedding::{EmbeddingProvider, OpenAIConfig, OpenAIProvider};
pub use error::{UniclassError, UniclassResult};
pub use handlers::{MatchApiDoc, MatchRequest, MatchResponse};
pub use models::{
    DEFAULT_DEPTH, EmbeddingModel, MatchQuery, MatchRecord, ResolvedQuery, UniclassMatch,
};
pub use repository::MatchRepository;
pub use service::{DEFAULT_CHUNK_SIZE, MatchService};
pub use supabase::{SupabaseConfig, SupabaseMatchRepository};
