//! Brute-force in-memory [`VectorStore`] for tests and offline runs.
//!
//! Upserts replace by id; queries score every stored vector with cosine
//! similarity. Negative cosine clamps to 0 so scores stay in the store
//! contract's `[0, 1]` range.

use parking_lot::RwLock;

use async_trait::async_trait;

use super::{VectorHit, VectorRecord, VectorStore};
use crate::types::RagtreeError;

/// In-memory vector store; cheap, deterministic, and unsuitable for scale.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    records: RwLock<Vec<VectorRecord>>,
}

impl InMemoryVectorStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// `true` when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Snapshot of all stored records, in insertion order.
    #[must_use]
    pub fn records(&self) -> Vec<VectorRecord> {
        self.records.read().clone()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if mag_a < f32::EPSILON || mag_b < f32::EPSILON {
        0.0
    } else {
        (dot / (mag_a * mag_b)).clamp(0.0, 1.0)
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, record: VectorRecord) -> Result<(), RagtreeError> {
        let mut records = self.records.write();
        records.retain(|existing| existing.id != record.id);
        records.push(record);
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        k: usize,
        min_score: f32,
    ) -> Result<Vec<VectorHit>, RagtreeError> {
        let records = self.records.read();
        let mut hits: Vec<VectorHit> = records
            .iter()
            .filter_map(|record| {
                let score = cosine_similarity(vector, &record.vector);
                (score >= min_score).then(|| VectorHit {
                    id: record.id.clone(),
                    score,
                    metadata: record.metadata.clone(),
                })
            })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(k);
        Ok(hits)
    }
}
