//! ```text
//! Raw article (HTML / markdown)
//!        │
//!        ▼
//! chunking::elements ──► chunking::segment ──► chunking::tree
//!   (normalize)            (labeled runs)       (ownership tree)
//!        │                                          │
//!        └────── chunking::ChunkingService ◄────────┘
//!                         │
//!                         ▼
//! Document ──► ingestion::IngestionPipeline ──► stores::VectorStore
//!                         │
//!                         ├─► services::EmbeddingService
//!                         └─► services::Summarizer (oversized paragraphs)
//!
//! Profile text ──► ranking::RelevanceRanker ──► ordered candidate ids
//!                         │
//!                         ├─► services::CompletionService (term extraction)
//!                         └─► stores::VectorStore (per-term search)
//! ```
//!
//! `ragtree` decomposes article-like content into a
//! Document → Section → Paragraph → Sentence ownership tree, persists
//! sentence- and paragraph-level embeddings with structural metadata, and
//! ranks stored candidates against a free-text profile by blending match
//! frequency and match strength across weighted query terms.
//!
//! The embedding, completion, tool-calling, and vector-store collaborators
//! are trait seams ([`services`], [`stores`]); deterministic in-process
//! implementations ship for tests.

pub mod chunking;
pub mod config;
pub mod ingestion;
pub mod ranking;
pub mod services;
pub mod stores;
pub mod types;

pub use chunking::service::{ArticleSource, ChunkingService};
pub use chunking::tree::{Document, Paragraph, Restored, Section, Sentence};
pub use config::{IngestionConfig, RankingConfig};
pub use ingestion::IngestionPipeline;
pub use ranking::profile::ProfileBuilder;
pub use ranking::RelevanceRanker;
pub use types::RagtreeError;
