//! Article chunking: normalize raw markup into typed content elements,
//! segment them into labeled heading/body runs, and fold the runs into a
//! Document → Section → Paragraph → Sentence ownership tree.
//!
//! The stages are pure and synchronous; [`service::ChunkingService`] is the
//! fail-soft facade callers go through. Any internal failure is logged and
//! reported as an absent document, never raised.

pub mod elements;
pub mod ids;
pub mod segment;
pub mod service;
pub mod tree;

pub use elements::{normalize_html, normalize_markdown, ContentElement};
pub use ids::{IdProvider, NodeId, SequentialIds, UuidIds};
pub use segment::{segment_elements, ArticleSection};
pub use service::{ArticleSource, ChunkingService};
pub use tree::{build_tree, Document, Paragraph, Restored, Section, Sentence};
