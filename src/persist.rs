//! Snapshot persistence for the knowledge base.
//!
//! A snapshot is four files under the configured directory:
//!
//! | File | Contents |
//! |------|----------|
//! | `embeddings.bin` | `[row_count: u32 LE][dimension: u32 LE]` header followed by row-major little-endian `f32` values |
//! | `documents.json` | JSON array of document strings |
//! | `metadata.json` | JSON array of metadata objects |
//! | `manifest.json` | model name, dimension, count, save timestamp |
//!
//! Writes go to a `.tmp` sibling and are renamed into place, manifest
//! last, so a reader never observes a half-written artifact. Every save
//! rewrites the whole snapshot — O(n) per insert, acceptable for the
//! small corpora this engine targets.
//!
//! Loading verifies that all four artifacts agree on count and dimension,
//! and that the manifest's model and dimension match the embedding
//! provider that will serve queries. Any missing file, parse failure, or
//! disagreement makes the snapshot count as absent; the engine then falls
//! through to seeding. A misaligned or stale snapshot is never loaded
//! into a live engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{KbError, Result};
use crate::models::Metadata;

const EMBEDDINGS_FILE: &str = "embeddings.bin";
const DOCUMENTS_FILE: &str = "documents.json";
const METADATA_FILE: &str = "metadata.json";
const MANIFEST_FILE: &str = "manifest.json";

/// The three aligned collections written and read as a unit.
#[derive(Debug)]
pub struct Snapshot {
    pub embeddings: Vec<Vec<f32>>,
    pub documents: Vec<String>,
    pub metadata: Vec<Metadata>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Manifest {
    model: String,
    dimension: usize,
    count: usize,
    saved_at: DateTime<Utc>,
}

/// Write the full snapshot to `dir`.
///
/// Each artifact is written to a temp sibling and renamed into place;
/// the manifest goes last so a manifest on disk always describes fully
/// written artifacts.
pub fn save_snapshot(dir: &Path, model: &str, snapshot: &Snapshot) -> Result<()> {
    let count = snapshot.documents.len();
    if snapshot.metadata.len() != count || snapshot.embeddings.len() != count {
        return Err(KbError::Persistence(format!(
            "refusing to write misaligned snapshot: {} documents, {} metadata, {} embeddings",
            count,
            snapshot.metadata.len(),
            snapshot.embeddings.len()
        )));
    }

    let dimension = snapshot.embeddings.first().map(|r| r.len()).unwrap_or(0);

    write_atomic(
        &dir.join(EMBEDDINGS_FILE),
        &encode_matrix(&snapshot.embeddings, dimension)?,
    )?;
    write_atomic(
        &dir.join(DOCUMENTS_FILE),
        &serde_json::to_vec_pretty(&snapshot.documents)
            .map_err(|e| KbError::Persistence(e.to_string()))?,
    )?;
    write_atomic(
        &dir.join(METADATA_FILE),
        &serde_json::to_vec_pretty(&snapshot.metadata)
            .map_err(|e| KbError::Persistence(e.to_string()))?,
    )?;

    let manifest = Manifest {
        model: model.to_string(),
        dimension,
        count,
        saved_at: Utc::now(),
    };
    write_atomic(
        &dir.join(MANIFEST_FILE),
        &serde_json::to_vec_pretty(&manifest).map_err(|e| KbError::Persistence(e.to_string()))?,
    )?;

    debug!(count, dimension, dir = %dir.display(), "snapshot saved");
    Ok(())
}

/// Load the snapshot from `dir`, or `None` when there is no usable
/// snapshot (missing, unreadable, misaligned, or written by a different
/// embedding model or dimension than the active provider's).
pub fn load_snapshot(dir: &Path, model: &str, dims: usize) -> Option<Snapshot> {
    let manifest_path = dir.join(MANIFEST_FILE);
    if !manifest_path.exists() {
        debug!(dir = %dir.display(), "no snapshot manifest, starting fresh");
        return None;
    }

    match try_load(dir, model, dims) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "snapshot unusable, treating as absent");
            None
        }
    }
}

fn try_load(dir: &Path, model: &str, dims: usize) -> Result<Snapshot> {
    let manifest: Manifest = read_json(&dir.join(MANIFEST_FILE))?;

    if manifest.model != model {
        return Err(KbError::Persistence(format!(
            "snapshot was built with model '{}', active provider is '{}'",
            manifest.model, model
        )));
    }
    // An empty snapshot records dimension 0; only a populated one pins
    // the provider's dimension.
    if manifest.count > 0 && manifest.dimension != dims {
        return Err(KbError::Persistence(format!(
            "snapshot dimension {} disagrees with active provider dimension {}",
            manifest.dimension, dims
        )));
    }
    let documents: Vec<String> = read_json(&dir.join(DOCUMENTS_FILE))?;
    let metadata: Vec<Metadata> = read_json(&dir.join(METADATA_FILE))?;
    let embeddings = decode_matrix(&fs::read(dir.join(EMBEDDINGS_FILE))?)?;

    let count = documents.len();
    if metadata.len() != count || embeddings.len() != count || manifest.count != count {
        return Err(KbError::Persistence(format!(
            "misaligned snapshot: {} documents, {} metadata, {} embeddings, manifest says {}",
            count,
            metadata.len(),
            embeddings.len(),
            manifest.count
        )));
    }

    if let Some(row) = embeddings.first() {
        if row.len() != manifest.dimension {
            return Err(KbError::Persistence(format!(
                "snapshot dimension {} disagrees with manifest {}",
                row.len(),
                manifest.dimension
            )));
        }
    }

    debug!(count, model = %manifest.model, "snapshot loaded");
    Ok(Snapshot {
        embeddings,
        documents,
        metadata,
    })
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes)
        .map_err(|e| KbError::Persistence(format!("{}: {}", path.display(), e)))
}

/// Write bytes to a `.tmp` sibling, then rename into place.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

// ============ Matrix encoding ============

/// Encode the embedding matrix: `[rows, dims]` u32 LE header followed by
/// row-major f32 LE values.
fn encode_matrix(rows: &[Vec<f32>], dimension: usize) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(8 + rows.len() * dimension * 4);
    bytes.extend_from_slice(&(rows.len() as u32).to_le_bytes());
    bytes.extend_from_slice(&(dimension as u32).to_le_bytes());

    for row in rows {
        if row.len() != dimension {
            return Err(KbError::Persistence(format!(
                "embedding row of length {} in a {}-dimensional matrix",
                row.len(),
                dimension
            )));
        }
        for &v in row {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
    }

    Ok(bytes)
}

fn decode_matrix(bytes: &[u8]) -> Result<Vec<Vec<f32>>> {
    if bytes.len() < 8 {
        return Err(KbError::Persistence(
            "embeddings file shorter than its header".into(),
        ));
    }

    let rows = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
    let dims = u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as usize;

    let body = &bytes[8..];
    let expected = rows
        .checked_mul(dims)
        .and_then(|n| n.checked_mul(4))
        .ok_or_else(|| KbError::Persistence("embeddings header overflow".into()))?;
    if body.len() != expected {
        return Err(KbError::Persistence(format!(
            "embeddings file is {} bytes, header implies {}",
            body.len(),
            expected
        )));
    }

    let mut matrix = Vec::with_capacity(rows);
    let mut values = body
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]));
    for _ in 0..rows {
        matrix.push(values.by_ref().take(dims).collect());
    }

    Ok(matrix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentType;
    use tempfile::TempDir;

    fn sample_snapshot() -> Snapshot {
        Snapshot {
            embeddings: vec![vec![0.1, 0.2, 0.3], vec![-0.4, 0.5, 0.6]],
            documents: vec!["first tip".to_string(), "second tip".to_string()],
            metadata: vec![
                Metadata::new("frontend_developer", ContentType::CareerTip, "test"),
                Metadata::new("backend_developer", ContentType::ResumeExample, "test"),
            ],
        }
    }

    #[test]
    fn test_save_load_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let snapshot = sample_snapshot();
        save_snapshot(tmp.path(), "feature-hash", &snapshot).unwrap();

        let loaded = load_snapshot(tmp.path(), "feature-hash", 3).unwrap();
        assert_eq!(loaded.documents, snapshot.documents);
        assert_eq!(loaded.metadata, snapshot.metadata);
        assert_eq!(loaded.embeddings, snapshot.embeddings);
    }

    #[test]
    fn test_load_missing_dir_is_none() {
        let tmp = TempDir::new().unwrap();
        assert!(load_snapshot(&tmp.path().join("nope"), "feature-hash", 3).is_none());
    }

    #[test]
    fn test_load_empty_dir_is_none() {
        let tmp = TempDir::new().unwrap();
        assert!(load_snapshot(tmp.path(), "feature-hash", 3).is_none());
    }

    #[test]
    fn test_misaligned_snapshot_treated_as_absent() {
        let tmp = TempDir::new().unwrap();
        save_snapshot(tmp.path(), "feature-hash", &sample_snapshot()).unwrap();

        // Drop one document behind the manifest's back.
        fs::write(tmp.path().join(DOCUMENTS_FILE), "[\"only one\"]").unwrap();

        assert!(load_snapshot(tmp.path(), "feature-hash", 3).is_none());
    }

    #[test]
    fn test_corrupt_embeddings_treated_as_absent() {
        let tmp = TempDir::new().unwrap();
        save_snapshot(tmp.path(), "feature-hash", &sample_snapshot()).unwrap();

        fs::write(tmp.path().join(EMBEDDINGS_FILE), b"garbage").unwrap();

        assert!(load_snapshot(tmp.path(), "feature-hash", 3).is_none());
    }

    #[test]
    fn test_model_mismatch_treated_as_absent() {
        let tmp = TempDir::new().unwrap();
        save_snapshot(tmp.path(), "text-embedding-3-small", &sample_snapshot()).unwrap();

        assert!(load_snapshot(tmp.path(), "feature-hash", 3).is_none());
    }

    #[test]
    fn test_dimension_mismatch_treated_as_absent() {
        let tmp = TempDir::new().unwrap();
        save_snapshot(tmp.path(), "feature-hash", &sample_snapshot()).unwrap();

        // Same model, reconfigured dimension: the snapshot is stale.
        assert!(load_snapshot(tmp.path(), "feature-hash", 256).is_none());
    }

    #[test]
    fn test_refuses_to_save_misaligned() {
        let tmp = TempDir::new().unwrap();
        let mut snapshot = sample_snapshot();
        snapshot.documents.pop();
        assert!(save_snapshot(tmp.path(), "feature-hash", &snapshot).is_err());
    }

    #[test]
    fn test_empty_snapshot_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let snapshot = Snapshot {
            embeddings: vec![],
            documents: vec![],
            metadata: vec![],
        };
        save_snapshot(tmp.path(), "feature-hash", &snapshot).unwrap();
        // An empty snapshot pins no dimension, so any provider dims load it.
        let loaded = load_snapshot(tmp.path(), "feature-hash", 128).unwrap();
        assert!(loaded.documents.is_empty());
        assert!(loaded.embeddings.is_empty());
    }

    #[test]
    fn test_matrix_encoding_roundtrip() {
        let rows = vec![vec![1.0f32, -2.5], vec![0.0, 3.25]];
        let bytes = encode_matrix(&rows, 2).unwrap();
        assert_eq!(bytes.len(), 8 + 4 * 4);
        let decoded = decode_matrix(&bytes).unwrap();
        assert_eq!(decoded, rows);
    }

    #[test]
    fn test_matrix_truncated_body_rejected() {
        let rows = vec![vec![1.0f32, 2.0]];
        let mut bytes = encode_matrix(&rows, 2).unwrap();
        bytes.pop();
        assert!(decode_matrix(&bytes).is_err());
    }
}
