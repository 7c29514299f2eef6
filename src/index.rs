//! Dense in-memory vector index with brute-force cosine ranking.
//!
//! The index holds one embedding row per stored document, positionally
//! aligned with the [`DocumentStore`](crate::store). Ranking is a full
//! scan — O(n·d) per query — which is fine for the corpora this tool
//! targets (tens to low hundreds of snippets). Anything substantially
//! larger needs a proper ANN structure; that is a documented limitation,
//! not something this index degrades into silently.

use crate::error::{KbError, Result};

/// Embedding matrix aligned positionally with the document store.
///
/// The first appended vector fixes the dimension for the lifetime of the
/// index; while empty, any dimension is accepted and becomes canonical.
#[derive(Debug, Default)]
pub struct VectorIndex {
    rows: Vec<Vec<f32>>,
    dims: Option<usize>,
}

impl VectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Established embedding dimension, `None` while the index is empty.
    pub fn dims(&self) -> Option<usize> {
        self.dims
    }

    pub fn rows(&self) -> &[Vec<f32>] {
        &self.rows
    }

    /// Append one embedding row.
    ///
    /// Fails with [`KbError::DimensionMismatch`] when the vector's length
    /// disagrees with the established dimension. Existing state is left
    /// untouched on failure.
    pub fn append(&mut self, vector: Vec<f32>) -> Result<()> {
        match self.dims {
            Some(expected) if vector.len() != expected => {
                return Err(KbError::DimensionMismatch {
                    expected,
                    got: vector.len(),
                });
            }
            None => self.dims = Some(vector.len()),
            _ => {}
        }
        self.rows.push(vector);
        Ok(())
    }

    /// Rank every stored row against a query vector by cosine similarity,
    /// descending. The sort is stable, so ties keep insertion order.
    pub fn rank(&self, query: &[f32]) -> Vec<(usize, f32)> {
        let mut scored: Vec<(usize, f32)> = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| (i, cosine_similarity(query, row)))
            .collect();

        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored
    }

    /// Drop rows past `len`. Used by the engine to roll back a partial
    /// append; never exposed to callers as a deletion operation.
    pub fn truncate(&mut self, len: usize) {
        self.rows.truncate(len);
        if self.rows.is_empty() {
            self.dims = None;
        }
    }
}

/// Compute cosine similarity between two embedding vectors.
///
/// Returns a value in `[-1.0, 1.0]`. Zero vectors, empty vectors, and
/// length mismatches yield `0.0` rather than a division by zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < f32::EPSILON {
        return 0.0;
    }

    dot / denom
}
