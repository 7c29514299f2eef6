//! Embedding provider abstraction and implementations.
//!
//! Defines the [`EmbeddingProvider`] trait and concrete implementations:
//! - **[`DisabledProvider`]** — returns errors; used when embeddings are not
//!   configured. An engine built on it runs degraded.
//! - **[`OpenAIProvider`]** — calls the OpenAI embeddings API with batching,
//!   retry, and backoff.
//! - **[`HashProvider`]** — deterministic FNV-1a feature-hashing embedder;
//!   no network, no model files. Same text always produces the same vector,
//!   which is what the duplicate-suppression path and the offline tests rely
//!   on. Not a substitute for a learned model's semantics.
//!
//! # Retry Strategy
//!
//! The OpenAI provider uses exponential backoff for transient errors:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use std::time::Duration;
use tracing::debug;

use crate::config::EmbeddingConfig;
use crate::error::{KbError, Result};

/// Trait for embedding providers.
///
/// Carries provider metadata; the embedding computation itself lives in
/// [`embed_texts`], which dispatches on the configuration.
pub trait EmbeddingProvider: Send + Sync {
    /// Model identifier (e.g. `"text-embedding-3-small"`, `"feature-hash"`).
    fn model_name(&self) -> &str;
    /// Embedding vector dimensionality.
    fn dims(&self) -> usize;
}

/// Create the appropriate [`EmbeddingProvider`] from configuration.
///
/// Supported providers: `disabled`, `openai`, `hash`. Returns an error for
/// unknown names or when the OpenAI provider cannot be initialized (missing
/// config or API key).
pub fn create_provider(config: &EmbeddingConfig) -> Result<Box<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledProvider)),
        "openai" => Ok(Box::new(OpenAIProvider::new(config)?)),
        "hash" => Ok(Box::new(HashProvider::new(config)?)),
        other => Err(KbError::Embedding(format!(
            "unknown embedding provider: {other}"
        ))),
    }
}

/// Embed a batch of texts using the configured provider.
///
/// Returns one vector per input text, in input order.
pub async fn embed_texts(config: &EmbeddingConfig, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    match config.provider.as_str() {
        "openai" => embed_openai(config, texts).await,
        "hash" => {
            let dims = config.dims.ok_or_else(|| {
                KbError::Embedding("embedding.dims required for hash provider".into())
            })?;
            Ok(texts.iter().map(|t| hash_embed(t, dims)).collect())
        }
        "disabled" => Err(KbError::EmbedderUnavailable),
        other => Err(KbError::Embedding(format!(
            "unknown embedding provider: {other}"
        ))),
    }
}

/// Embed a single query text. Convenience wrapper around [`embed_texts`].
pub async fn embed_query(config: &EmbeddingConfig, text: &str) -> Result<Vec<f32>> {
    let results = embed_texts(config, &[text.to_string()]).await?;
    results
        .into_iter()
        .next()
        .ok_or_else(|| KbError::Embedding("empty embedding response".into()))
}

// ============ Disabled Provider ============

/// A no-op embedding provider that always returns errors.
pub struct DisabledProvider;

impl EmbeddingProvider for DisabledProvider {
    fn model_name(&self) -> &str {
        "disabled"
    }
    fn dims(&self) -> usize {
        0
    }
}

// ============ OpenAI Provider ============

/// Embedding provider using the OpenAI API.
///
/// Calls `POST /v1/embeddings` with the configured model. Requires the
/// `OPENAI_API_KEY` environment variable.
pub struct OpenAIProvider {
    model: String,
    dims: usize,
}

impl OpenAIProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let model = config.model.clone().ok_or_else(|| {
            KbError::Embedding("embedding.model required for OpenAI provider".into())
        })?;
        let dims = config.dims.ok_or_else(|| {
            KbError::Embedding("embedding.dims required for OpenAI provider".into())
        })?;

        if std::env::var("OPENAI_API_KEY").is_err() {
            return Err(KbError::Embedding(
                "OPENAI_API_KEY environment variable not set".into(),
            ));
        }

        Ok(Self { model, dims })
    }
}

impl EmbeddingProvider for OpenAIProvider {
    fn model_name(&self) -> &str {
        &self.model
    }
    fn dims(&self) -> usize {
        self.dims
    }
}

/// Call the OpenAI embeddings API with retry/backoff.
async fn embed_openai(config: &EmbeddingConfig, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    let api_key = std::env::var("OPENAI_API_KEY")
        .map_err(|_| KbError::Embedding("OPENAI_API_KEY not set".into()))?;

    let model = config
        .model
        .as_ref()
        .ok_or_else(|| KbError::Embedding("embedding.model required".into()))?;

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| KbError::Embedding(e.to_string()))?;

    let body = serde_json::json!({
        "model": model,
        "input": texts,
    });

    let mut last_err = None;

    for attempt in 0..=config.max_retries {
        if attempt > 0 {
            let delay = Duration::from_secs(1 << (attempt - 1).min(5));
            tokio::time::sleep(delay).await;
        }

        let resp = client
            .post("https://api.openai.com/v1/embeddings")
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await;

        match resp {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    let json: serde_json::Value = response
                        .json()
                        .await
                        .map_err(|e| KbError::Embedding(e.to_string()))?;
                    return parse_openai_response(&json);
                }

                // Rate limited or server error — retry
                if status.as_u16() == 429 || status.is_server_error() {
                    let body_text = response.text().await.unwrap_or_default();
                    last_err = Some(KbError::Embedding(format!(
                        "OpenAI API error {status}: {body_text}"
                    )));
                    continue;
                }

                // Client error (not 429) — don't retry
                let body_text = response.text().await.unwrap_or_default();
                return Err(KbError::Embedding(format!(
                    "OpenAI API error {status}: {body_text}"
                )));
            }
            Err(e) => {
                last_err = Some(KbError::Embedding(e.to_string()));
                continue;
            }
        }
    }

    Err(last_err.unwrap_or_else(|| KbError::Embedding("embedding failed after retries".into())))
}

fn parse_openai_response(json: &serde_json::Value) -> Result<Vec<Vec<f32>>> {
    let data = json
        .get("data")
        .and_then(|d| d.as_array())
        .ok_or_else(|| KbError::Embedding("invalid OpenAI response: missing data array".into()))?;

    let mut embeddings = Vec::with_capacity(data.len());

    for item in data {
        let embedding = item
            .get("embedding")
            .and_then(|e| e.as_array())
            .ok_or_else(|| {
                KbError::Embedding("invalid OpenAI response: missing embedding".into())
            })?;

        let vec: Vec<f32> = embedding
            .iter()
            .map(|v| v.as_f64().unwrap_or(0.0) as f32)
            .collect();

        embeddings.push(vec);
    }

    Ok(embeddings)
}

// ============ Hash Provider ============

/// Deterministic feature-hashing embedder.
///
/// Hashes lowercase word unigrams and bigrams into `dims` buckets with
/// FNV-1a, using one hash bit for the sign, then L2-normalizes. Texts
/// sharing vocabulary land in overlapping buckets and score high on
/// cosine similarity; identical texts score exactly 1.0.
pub struct HashProvider {
    dims: usize,
}

impl HashProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let dims = config
            .dims
            .ok_or_else(|| KbError::Embedding("embedding.dims required for hash provider".into()))?;
        if dims == 0 {
            return Err(KbError::Embedding("embedding.dims must be > 0".into()));
        }
        Ok(Self { dims })
    }
}

impl EmbeddingProvider for HashProvider {
    fn model_name(&self) -> &str {
        "feature-hash"
    }
    fn dims(&self) -> usize {
        self.dims
    }
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// Embed a text by signed feature hashing of its word unigrams and
/// bigrams. Output is L2-normalized (all-zero for texts with no tokens).
pub fn hash_embed(text: &str, dims: usize) -> Vec<f32> {
    let mut vector = vec![0.0f32; dims];

    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();

    let mut bump = |feature: &str| {
        let hash = fnv1a(feature.as_bytes());
        let bucket = (hash % dims as u64) as usize;
        let sign = if hash & (1 << 63) == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign;
    };

    for &token in &tokens {
        bump(token);
    }
    for pair in tokens.windows(2) {
        bump(&format!("{} {}", pair[0], pair[1]));
    }

    let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for v in &mut vector {
            *v /= norm;
        }
    } else {
        debug!(text_len = text.len(), "hash embedding produced a zero vector");
    }

    vector
}
