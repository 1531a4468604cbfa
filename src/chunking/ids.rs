//! Injectable identity generation for tree nodes.
//!
//! Production code uses random v4 UUIDs; tests swap in [`SequentialIds`] so
//! node identities (and therefore stored record ids) are deterministic.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque identity assigned to every tree node at construction.
///
/// Generated once and never reassigned.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Returns the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Source of fresh node identities.
pub trait IdProvider: Send + Sync {
    /// Returns the next identity. Every call must yield a distinct value.
    fn next_id(&self) -> NodeId;
}

/// Random v4 identifiers for production use.
#[derive(Clone, Copy, Debug, Default)]
pub struct UuidIds;

impl IdProvider for UuidIds {
    fn next_id(&self) -> NodeId {
        NodeId(Uuid::new_v4())
    }
}

/// Deterministic ascending identifiers for tests.
#[derive(Debug, Default)]
pub struct SequentialIds {
    counter: AtomicU64,
}

impl SequentialIds {
    /// Creates a provider that counts up from 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdProvider for SequentialIds {
    fn next_id(&self) -> NodeId {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        NodeId(Uuid::from_u128(u128::from(n) + 1))
    }
}
