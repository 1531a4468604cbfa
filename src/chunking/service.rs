//! Fail-soft chunking facade: raw article in, document tree (or nothing) out.

use std::sync::Arc;

use tracing::debug;

use super::elements::{normalize_html, normalize_markdown};
use super::ids::{IdProvider, UuidIds};
use super::segment::segment_elements;
use super::tree::{build_tree, Document};

/// Raw article payloads accepted by the chunking service.
#[derive(Clone, Debug)]
pub enum ArticleSource {
    /// An HTML fragment or full page.
    Html(String),
    /// Markdown text.
    Markdown(String),
}

/// Runs normalize → segment → build for a raw article.
///
/// Every failure mode is absorbed here: callers receive `Some(document)` or
/// `None`, never an error. A `None` means chunking failed; an empty source
/// yields a document with zero sections.
#[derive(Clone)]
pub struct ChunkingService {
    ids: Arc<dyn IdProvider>,
}

impl ChunkingService {
    /// Service with random production identifiers.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ids: Arc::new(UuidIds),
        }
    }

    /// Service with an injected identifier source (deterministic in tests).
    #[must_use]
    pub fn with_id_provider(ids: Arc<dyn IdProvider>) -> Self {
        Self { ids }
    }

    /// Chunks a raw article into its ownership tree.
    pub fn chunk_document(&self, source: &ArticleSource) -> Option<Document> {
        let elements = match source {
            ArticleSource::Html(raw) => normalize_html(raw),
            ArticleSource::Markdown(raw) => normalize_markdown(raw),
        };
        let sections = segment_elements(elements);
        debug!(section_count = sections.len(), "segmented article");
        build_tree(sections, self.ids.as_ref())
    }
}

impl Default for ChunkingService {
    fn default() -> Self {
        Self::new()
    }
}
