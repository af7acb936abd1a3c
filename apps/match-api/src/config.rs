//! Configuration for Match API

use core_config::{AppInfo, FromEnv, app_info, server::ServerConfig};
use domain_uniclass::{DEFAULT_CHUNK_SIZE, EmbeddingModel, OpenAIConfig, SupabaseConfig};

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub environment: Environment,
    pub openai: OpenAIConfig,
    pub supabase: SupabaseConfig,
    pub embedding_model: EmbeddingModel,
    pub embedding_batch_size: usize,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;
        let openai = OpenAIConfig::from_env()?;
        let supabase = SupabaseConfig::from_env()?;

        let embedding_model = match std::env::var("EMBEDDING_MODEL") {
            Ok(name) => name.parse()?,
            Err(_) => EmbeddingModel::default(),
        };

        let embedding_batch_size = std::env::var("EMBEDDING_BATCH_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_CHUNK_SIZE);

        Ok(Self {
            app: app_info!(),
            server,
            environment,
            openai,
            supabase,
            embedding_model,
            embedding_batch_size,
        })
    }
}
