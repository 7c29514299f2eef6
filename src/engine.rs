//! The retrieval engine: the public contract every caller goes through.
//!
//! Orchestrates embed → rank → filter → truncate for queries, and
//! duplicate-check → aligned append → persist for insertions. All
//! internal errors are absorbed here into return-value signaling (empty
//! result sets, booleans, status enums) — `search`, `add`, and `stats`
//! never fail the caller.
//!
//! # Lifecycle
//!
//! [`RetrievalEngine::open`] builds the embedding provider, then either
//! loads a persisted snapshot or seeds the initial corpus. If the
//! provider cannot be built (or seeding fails), the engine runs
//! *degraded* for the rest of the process: `search` returns empty,
//! `add` returns `false`, and `stats` reports `unavailable`. A degraded
//! engine never recovers without a restart.
//!
//! # Concurrency
//!
//! Single-process, single-writer. `search` takes `&self` and is freely
//! repeatable; `add` takes `&mut self`, so the duplicate-check → append →
//! persist sequence cannot interleave with another insertion — the borrow
//! checker stands in for the mutex the contract would otherwise need.

use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::embedding::{self, EmbeddingProvider};
use crate::error::Result;
use crate::index::VectorIndex;
use crate::models::{
    normalize_role, ContentType, EngineStats, EngineStatus, Metadata, SearchHit,
};
use crate::persist::{self, Snapshot};
use crate::seed;
use crate::store::DocumentStore;

/// Outcome of an insertion attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Stored in memory and persisted (persistence itself is best-effort).
    Added,
    /// A near-duplicate already exists; nothing was stored.
    Duplicate,
    /// The engine is degraded; nothing was stored.
    Unavailable,
    /// Embedding or append failed; nothing was stored.
    Failed,
}

pub struct RetrievalEngine {
    config: Config,
    persist_dir: PathBuf,
    /// `None` when the engine is degraded.
    provider: Option<Box<dyn EmbeddingProvider>>,
    index: VectorIndex,
    store: DocumentStore,
}

impl RetrievalEngine {
    /// Open the engine: build the provider, then load the snapshot or
    /// seed the initial corpus.
    ///
    /// Never fails — unavailability is a first-class state, not an error.
    pub async fn open(config: Config) -> Self {
        let persist_dir = config.persist.dir.clone();

        if let Err(e) = std::fs::create_dir_all(&persist_dir) {
            warn!(dir = %persist_dir.display(), error = %e, "could not create persist directory");
        }

        let provider = match embedding::create_provider(&config.embedding) {
            Ok(p) if config.embedding.is_enabled() => Some(p),
            Ok(_) => {
                info!("embedding provider disabled, engine starting degraded");
                None
            }
            Err(e) => {
                warn!(error = %e, "failed to initialize embedding provider, engine starting degraded");
                None
            }
        };

        let provider_meta = provider
            .as_ref()
            .map(|p| (p.model_name().to_string(), p.dims()));

        let mut engine = Self {
            config,
            persist_dir,
            provider,
            index: VectorIndex::new(),
            store: DocumentStore::new(),
        };

        let Some((model, dims)) = provider_meta else {
            return engine;
        };

        match persist::load_snapshot(&engine.persist_dir, &model, dims) {
            Some(snapshot) => {
                if let Err(e) = engine.install(snapshot) {
                    warn!(error = %e, "persisted snapshot rejected, reseeding");
                    engine.index = VectorIndex::new();
                    engine.store = DocumentStore::new();
                    engine.populate_seed().await;
                } else {
                    info!(count = engine.store.len(), "loaded existing knowledge base");
                }
            }
            None => engine.populate_seed().await,
        }

        engine
    }

    /// Move a verified snapshot into the live collections.
    fn install(&mut self, snapshot: Snapshot) -> Result<()> {
        debug_assert!(self.index.is_empty() && self.store.is_empty());
        for row in snapshot.embeddings {
            self.index.append(row)?;
        }
        for (doc, meta) in snapshot.documents.into_iter().zip(snapshot.metadata) {
            self.store.append(doc, meta);
        }
        Ok(())
    }

    /// Embed and append the seed corpus, then persist it.
    ///
    /// A seeding failure (the provider is up but the embed call fails)
    /// degrades the engine, matching the behavior of a provider that
    /// never came up.
    async fn populate_seed(&mut self) {
        let docs = seed::seed_documents();
        info!(count = docs.len(), "populating knowledge base with initial corpus");

        let texts: Vec<String> = docs.iter().map(|(text, _)| text.clone()).collect();

        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.config.embedding.batch_size.max(1)) {
            match embedding::embed_texts(&self.config.embedding, batch).await {
                Ok(mut batch_vectors) => vectors.append(&mut batch_vectors),
                Err(e) => {
                    warn!(error = %e, "seeding failed, engine starting degraded");
                    self.provider = None;
                    return;
                }
            }
        }

        for ((text, meta), vector) in docs.into_iter().zip(vectors) {
            if let Err(e) = self.index.append(vector) {
                warn!(error = %e, "seed vector rejected, engine starting degraded");
                self.provider = None;
                self.index.truncate(0);
                self.store.truncate(0);
                return;
            }
            self.store.append(text, meta);
        }

        if let Err(e) = self.persist() {
            warn!(error = %e, "could not persist seeded knowledge base");
        }
    }

    fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    /// Semantic similarity search over the full corpus.
    ///
    /// Ranks every stored vector against the query embedding, then walks
    /// the ranked list applying the metadata filters until `n_results`
    /// hits are collected or the list is exhausted. Filtering after
    /// ranking preserves global similarity order.
    ///
    /// Returns an empty vec — never an error — when the engine is
    /// degraded, the corpus is empty, or the query embedding fails.
    pub async fn search(
        &self,
        query: &str,
        job_role: Option<&str>,
        content_type: Option<ContentType>,
        n_results: usize,
    ) -> Vec<SearchHit> {
        if !self.is_available() || self.store.is_empty() || n_results == 0 {
            debug!("search on unavailable or empty knowledge base, returning no results");
            return Vec::new();
        }

        let query_vec = match embedding::embed_query(&self.config.embedding, query).await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "query embedding failed, returning no results");
                return Vec::new();
            }
        };

        let role_filter = job_role.map(normalize_role);
        let mut hits = Vec::with_capacity(n_results);

        for (idx, score) in self.index.rank(&query_vec) {
            let (document, metadata) = match self.store.get(idx) {
                Ok(entry) => entry,
                Err(e) => {
                    // Means the alignment invariant is broken; skip the
                    // phantom row rather than failing the caller.
                    warn!(error = %e, "ranked row missing from store");
                    continue;
                }
            };

            if let Some(ref role) = role_filter {
                if &metadata.job_role != role {
                    continue;
                }
            }
            if let Some(ct) = content_type {
                if metadata.content_type != ct {
                    continue;
                }
            }

            hits.push(SearchHit {
                document: document.to_string(),
                metadata: metadata.clone(),
                score,
            });

            if hits.len() >= n_results {
                break;
            }
        }

        debug!(query, results = hits.len(), "search complete");
        hits
    }

    /// Insert one knowledge snippet, reporting how the attempt ended.
    ///
    /// Rejects near-duplicates: if the top hit for the same role and
    /// content type scores above the configured threshold the insertion
    /// is dropped with [`AddOutcome::Duplicate`]. Otherwise the embedding
    /// row and the document entry are appended together — a failure
    /// between the two rolls both back, so the alignment invariant holds
    /// on every exit path.
    ///
    /// A persistence failure after the in-memory append is logged but
    /// does not undo the insertion; it stays visible for the rest of
    /// the process even though it is not yet durable.
    pub async fn add(
        &mut self,
        content: &str,
        job_role: &str,
        content_type: ContentType,
        source: &str,
    ) -> AddOutcome {
        if !self.is_available() {
            warn!("add on unavailable knowledge base");
            return AddOutcome::Unavailable;
        }

        let existing = self
            .search(content, Some(job_role), Some(content_type), 1)
            .await;
        if let Some(top) = existing.first() {
            if top.score > self.config.retrieval.duplicate_threshold {
                info!(
                    score = top.score,
                    threshold = self.config.retrieval.duplicate_threshold,
                    "similar content already exists, skipping duplicate"
                );
                return AddOutcome::Duplicate;
            }
        }

        let vector = match embedding::embed_query(&self.config.embedding, content).await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "content embedding failed, insertion dropped");
                return AddOutcome::Failed;
            }
        };

        let pre_len = self.store.len();
        if let Err(e) = self.index.append(vector) {
            warn!(error = %e, "embedding row rejected, insertion dropped");
            self.index.truncate(pre_len);
            return AddOutcome::Failed;
        }
        self.store
            .append(content.to_string(), Metadata::new(job_role, content_type, source));

        debug_assert_eq!(self.index.len(), self.store.len());

        if let Err(e) = self.persist() {
            warn!(error = %e, "snapshot write failed, insertion kept in memory only");
        }

        info!(
            content_type = %content_type,
            index = pre_len,
            "added new knowledge"
        );
        AddOutcome::Added
    }

    /// Report engine health. Repeated calls without an intervening `add`
    /// return identical results.
    pub fn stats(&self) -> EngineStats {
        if !self.is_available() {
            return EngineStats {
                status: EngineStatus::Unavailable,
                count: self.store.len(),
                dimension: 0,
            };
        }

        EngineStats {
            status: EngineStatus::Available,
            count: self.store.len(),
            dimension: self.index.dims().unwrap_or(0),
        }
    }

    fn persist(&self) -> Result<()> {
        let model = self
            .provider
            .as_ref()
            .map(|p| p.model_name().to_string())
            .unwrap_or_default();

        let snapshot = Snapshot {
            embeddings: self.index.rows().to_vec(),
            documents: self.store.documents().to_vec(),
            metadata: self.store.metadata().to_vec(),
        };

        persist::save_snapshot(&self.persist_dir, &model, &snapshot)
    }

    #[cfg(test)]
    pub(crate) fn alignment_holds(&self) -> bool {
        self.index.len() == self.store.len()
    }
}
