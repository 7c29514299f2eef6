use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub persist: PersistConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct PersistConfig {
    /// Directory holding the snapshot (embeddings matrix, documents,
    /// metadata, manifest).
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "disabled".to_string(),
            model: None,
            dims: None,
            batch_size: 64,
            max_retries: 5,
            timeout_secs: 30,
        }
    }
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_batch_size() -> usize {
    64
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Results requested when retrieving career tips for a role.
    #[serde(default = "default_tip_results")]
    pub tip_results: usize,
    /// Results requested when retrieving resume examples for a role.
    #[serde(default = "default_example_results")]
    pub example_results: usize,
    /// Results requested for free-text knowledge searches.
    #[serde(default = "default_search_results")]
    pub search_results: usize,
    /// Similarity above which an insertion is rejected as a near-duplicate.
    #[serde(default = "default_duplicate_threshold")]
    pub duplicate_threshold: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            tip_results: default_tip_results(),
            example_results: default_example_results(),
            search_results: default_search_results(),
            duplicate_threshold: default_duplicate_threshold(),
        }
    }
}

fn default_tip_results() -> usize {
    5
}
fn default_example_results() -> usize {
    4
}
fn default_search_results() -> usize {
    10
}
fn default_duplicate_threshold() -> f32 {
    0.95
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    #[serde(default = "default_generation_model")]
    pub model: String,
    #[serde(default = "default_generation_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: default_generation_model(),
            max_retries: default_generation_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_generation_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_generation_retries() -> u32 {
    1
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    // Validate retrieval
    if config.retrieval.tip_results == 0
        || config.retrieval.example_results == 0
        || config.retrieval.search_results == 0
    {
        anyhow::bail!("retrieval result counts must be >= 1");
    }

    if !(0.0..=1.0).contains(&config.retrieval.duplicate_threshold) {
        anyhow::bail!("retrieval.duplicate_threshold must be in [0.0, 1.0]");
    }

    // Validate embedding
    if config.embedding.is_enabled() {
        if config.embedding.dims.is_none() || config.embedding.dims == Some(0) {
            anyhow::bail!(
                "embedding.dims must be > 0 when provider is '{}'",
                config.embedding.provider
            );
        }
        if config.embedding.provider == "openai" && config.embedding.model.is_none() {
            anyhow::bail!("embedding.model must be specified when provider is 'openai'");
        }
    }

    match config.embedding.provider.as_str() {
        "disabled" | "openai" | "hash" => {}
        other => anyhow::bail!(
            "Unknown embedding provider: '{}'. Must be disabled, openai, or hash.",
            other
        ),
    }

    Ok(config)
}
