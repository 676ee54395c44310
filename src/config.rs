//! TOML configuration with environment overrides.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub github: GithubConfig,
    #[serde(default)]
    pub vector: VectorConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

#[derive(Debug, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".into()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".into()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            embedding_model: default_embedding_model(),
            api_key: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GithubConfig {
    /// Fallback credential when a request carries none.
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VectorConfig {
    #[serde(default = "default_qdrant_url")]
    pub qdrant_url: String,
}

fn default_qdrant_url() -> String {
    "http://localhost:6334".into()
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            qdrant_url: default_qdrant_url(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct IndexConfig {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

fn default_concurrency() -> usize {
    3
}

fn default_chunk_size() -> usize {
    800
}

fn default_chunk_overlap() -> usize {
    160
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Bearer token protecting the mutating endpoints. Unset disables auth.
    #[serde(default)]
    pub auth_token: Option<String>,
}

fn default_bind() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    8080
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
            auth_token: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("GROUNDER_OPENAI_API_KEY") {
            self.llm.api_key = Some(val);
        }
        if let Ok(val) = std::env::var("GROUNDER_GITHUB_TOKEN") {
            self.github.token = Some(val);
        }
        if let Ok(val) = std::env::var("GROUNDER_QDRANT_URL") {
            self.vector.qdrant_url = val;
        }
        if let Ok(val) = std::env::var("GROUNDER_GATEWAY_TOKEN") {
            self.gateway.auth_token = Some(val);
        }
    }
}
