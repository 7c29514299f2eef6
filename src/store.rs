//! Document store: documents and metadata kept in lockstep with the
//! vector index.
//!
//! Position `i` in the store and row `i` in the index refer to the same
//! logical entry. The store is append-only; the only removal operation
//! is [`DocumentStore::truncate`], which the engine uses to roll back a
//! partial append.

use crate::error::{KbError, Result};
use crate::models::Metadata;

#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: Vec<String>,
    metadata: Vec<Metadata>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Append one aligned entry and return its assigned index
    /// (the previous length).
    pub fn append(&mut self, document: String, metadata: Metadata) -> usize {
        let idx = self.documents.len();
        self.documents.push(document);
        self.metadata.push(metadata);
        idx
    }

    /// Positional lookup.
    pub fn get(&self, index: usize) -> Result<(&str, &Metadata)> {
        if index >= self.documents.len() {
            return Err(KbError::IndexOutOfRange {
                index,
                len: self.documents.len(),
            });
        }
        Ok((&self.documents[index], &self.metadata[index]))
    }

    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    pub fn metadata(&self) -> &[Metadata] {
        &self.metadata
    }

    /// Drop entries past `len`. Rollback support for the engine, not a
    /// public deletion operation.
    pub fn truncate(&mut self, len: usize) {
        self.documents.truncate(len);
        self.metadata.truncate(len);
    }
}
