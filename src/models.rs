//! Core data types shared across the retrieval engine and advisor layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category of a stored knowledge snippet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    CareerTip,
    ResumeExample,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::CareerTip => "career_tip",
            ContentType::ResumeExample => "resume_example",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "career_tip" | "tip" => Ok(ContentType::CareerTip),
            "resume_example" | "example" => Ok(ContentType::ResumeExample),
            other => Err(format!(
                "unknown content type '{}' (expected career_tip or resume_example)",
                other
            )),
        }
    }
}

/// Metadata attached 1:1 to each stored document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    /// Normalized job role token (lowercase, underscore-separated).
    pub job_role: String,
    pub content_type: ContentType,
    /// Free-text provenance tag (e.g. `initial_knowledge`, `user_added`).
    pub source: String,
}

impl Metadata {
    pub fn new(job_role: &str, content_type: ContentType, source: &str) -> Self {
        Self {
            job_role: normalize_role(job_role),
            content_type,
            source: source.to_string(),
        }
    }
}

/// A ranked search result returned by the engine.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub document: String,
    pub metadata: Metadata,
    /// Cosine similarity against the query, in `[-1.0, 1.0]`.
    pub score: f32,
}

/// Whether the engine can serve semantic queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineStatus {
    Available,
    Unavailable,
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineStatus::Available => f.write_str("available"),
            EngineStatus::Unavailable => f.write_str("unavailable"),
        }
    }
}

/// Snapshot of engine health reported by `stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub status: EngineStatus,
    pub count: usize,
    /// Embedding dimension, `0` when the corpus is empty or the engine
    /// is unavailable.
    pub dimension: usize,
}

/// Normalize a free-text job role into the canonical metadata token:
/// lowercase, whitespace runs collapsed to single underscores.
pub fn normalize_role(role: &str) -> String {
    role.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_role() {
        assert_eq!(normalize_role("Frontend Developer"), "frontend_developer");
        assert_eq!(normalize_role("  UX   Designer "), "ux_designer");
        assert_eq!(normalize_role("data_scientist"), "data_scientist");
        assert_eq!(normalize_role(""), "");
    }

    #[test]
    fn test_content_type_parse() {
        assert_eq!(
            "career_tip".parse::<ContentType>().unwrap(),
            ContentType::CareerTip
        );
        assert_eq!("tip".parse::<ContentType>().unwrap(), ContentType::CareerTip);
        assert_eq!(
            "resume_example".parse::<ContentType>().unwrap(),
            ContentType::ResumeExample
        );
        assert!("bullet".parse::<ContentType>().is_err());
    }

    #[test]
    fn test_content_type_serde_rename() {
        let json = serde_json::to_string(&ContentType::ResumeExample).unwrap();
        assert_eq!(json, "\"resume_example\"");
        let back: ContentType = serde_json::from_str("\"career_tip\"").unwrap();
        assert_eq!(back, ContentType::CareerTip);
    }

    #[test]
    fn test_metadata_normalizes_role() {
        let meta = Metadata::new("Product Manager", ContentType::CareerTip, "user_added");
        assert_eq!(meta.job_role, "product_manager");
    }
}
