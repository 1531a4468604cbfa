//! Vector-similarity storage contract.
//!
//! The concrete store is an external collaborator; the core depends only on
//! this trait. All mutations are additive upserts keyed by freshly generated
//! identifiers, so implementations need no cross-call coordination from the
//! caller's side.
//!
//! [`memory::InMemoryVectorStore`] is the in-process implementation used by
//! the test suites.

pub mod memory;

pub use memory::InMemoryVectorStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::RagtreeError;

/// A vector plus structural metadata, ready for persistence.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VectorRecord {
    /// Unique record identifier.
    pub id: String,
    /// The embedding vector.
    pub vector: Vec<f32>,
    /// Structural metadata (owner/section/paragraph/sentence ids, content).
    pub metadata: serde_json::Value,
}

/// A nearest-neighbor match returned by [`VectorStore::query`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VectorHit {
    /// Identifier of the matched record.
    pub id: String,
    /// Similarity score in `[0, 1]`, higher is closer.
    pub score: f32,
    /// The record's metadata.
    pub metadata: serde_json::Value,
}

/// Vector store collaborator contract.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Inserts or replaces a record by id.
    async fn upsert(&self, record: VectorRecord) -> Result<(), RagtreeError>;

    /// Inserts or replaces a batch of records.
    async fn upsert_many(&self, records: Vec<VectorRecord>) -> Result<(), RagtreeError> {
        for record in records {
            self.upsert(record).await?;
        }
        Ok(())
    }

    /// Top-`k` nearest neighbors of `vector`, sorted by descending score,
    /// filtered to `score >= min_score`.
    async fn query(
        &self,
        vector: &[f32],
        k: usize,
        min_score: f32,
    ) -> Result<Vec<VectorHit>, RagtreeError>;
}
