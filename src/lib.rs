//! # Career Mentor
//!
//! A local-first semantic retrieval engine for career advice and resume
//! examples.
//!
//! Career Mentor keeps a small corpus of career tips and resume-example
//! bullets in an in-memory vector index, supports filtered cosine
//! similarity search and incremental insertion with near-duplicate
//! suppression, and persists the whole index as a file snapshot so
//! knowledge survives restarts. An advisor layer consumes the engine and
//! falls back to static dictionaries whenever it is degraded or empty.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌──────────────────┐   ┌────────────────┐
//! │  Embedder │──▶│ RetrievalEngine   │──▶│   Snapshot     │
//! │ openai/   │   │ index + store     │   │ embeddings.bin │
//! │ hash      │   │ rank→filter→top-N │   │ + JSON + manifest
//! └───────────┘   └────────┬─────────┘   └────────────────┘
//!                          │
//!                 ┌────────▼─────────┐
//!                 │     Advisor      │
//!                 │ tips / examples  │
//!                 │ dict fallback    │
//!                 └────────┬─────────┘
//!                          │
//!                    ┌─────▼─────┐
//!                    │    CLI    │
//!                    │ (mentor)  │
//!                    └───────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`error`] | Core error taxonomy |
//! | [`models`] | Core data types |
//! | [`index`] | Dense vector index with cosine ranking |
//! | [`store`] | Aligned document + metadata store |
//! | [`embedding`] | Embedding provider abstraction |
//! | [`persist`] | Snapshot save/load |
//! | [`seed`] | Initial knowledge corpus |
//! | [`engine`] | Search / add / stats orchestration |
//! | [`advisor`] | Retrieval orchestration with dictionary fallback |
//! | [`generate`] | Structured resume-plan generation |

pub mod advisor;
pub mod config;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod generate;
pub mod index;
pub mod models;
pub mod persist;
pub mod seed;
pub mod store;
