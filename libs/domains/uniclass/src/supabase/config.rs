use crate::error::{UniclassError, UniclassResult};

/// Supabase connection configuration
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_key: String,
    pub timeout_secs: u64,
}

impl SupabaseConfig {
    pub fn new(url: String, service_key: String) -> Self {
        Self {
            url,
            service_key,
            timeout_secs: 30,
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn from_env() -> UniclassResult<Self> {
        let url = std::env::var("SUPABASE_URL")
            .map_err(|_| UniclassError::Config("SUPABASE_URL not set".to_string()))?;

        let service_key = std::env::var("SUPABASE_SERVICE_ROLE_KEY").map_err(|_| {
            UniclassError::Config("SUPABASE_SERVICE_ROLE_KEY not set".to_string())
        })?;

        let timeout_secs = std::env::var("SUPABASE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Ok(Self {
            url,
            service_key,
            timeout_secs,
        })
    }

    /// PostgREST endpoint for a stored procedure call.
    pub fn rpc_url(&self, function: &str) -> String {
        format!("{}/rest/v1/rpc/{}", self.url.trim_end_matches('/'), function)
    }
}
