use std::time::Duration;

use tracing::warn;
use verdict::RunConfig;

/// Chat-model endpoint (OpenAI-compatible `/chat/completions`).
#[derive(Debug, Clone)]
pub struct ModelEndpoint {
    pub url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
}

/// Top-level application configuration, resolved from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model: ModelEndpoint,
    /// Brave Search subscription token. Search is degraded without it.
    pub brave_api_key: String,
    /// Claims to extract and verify per analysis.
    pub max_claims: usize,
    /// Engine limits handed to the verification core.
    pub run: RunConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: ModelEndpoint {
                url: std::env::var("VERACITY_MODEL_URL")
                    .unwrap_or_else(|_| "https://api.openai.com/v1/chat/completions".into()),
                api_key: std::env::var("OPENAI_API_KEY").ok(),
                model: std::env::var("VERACITY_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into()),
                temperature: 0.1,
            },
            brave_api_key: std::env::var("BRAVE_API_KEY").unwrap_or_default(),
            max_claims: std::env::var("MAX_CLAIMS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            run: RunConfig::default(),
        }
    }
}

impl AppConfig {
    /// Resolve configuration from the environment, warning about missing
    /// credentials instead of failing; degraded runs still produce reports.
    pub fn from_env() -> Self {
        let config = Self::default();
        if config.model.api_key.is_none() {
            warn!("OPENAI_API_KEY not set — model calls will be rejected upstream");
        }
        if config.brave_api_key.is_empty() {
            warn!("BRAVE_API_KEY not set — evidence search will be unavailable");
        }
        config
    }

    pub fn with_max_concurrency(mut self, n: usize) -> Self {
        self.run.max_concurrency = n.max(1);
        self
    }

    pub fn with_per_claim_timeout(mut self, timeout: Duration) -> Self {
        self.run.per_claim_timeout = timeout;
        self
    }
}
