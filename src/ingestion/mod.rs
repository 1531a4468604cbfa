//! Walks a document tree and persists sentence- and paragraph-level
//! embeddings with structural metadata.
//!
//! Concurrency shape: within one section, sentence storage for all
//! paragraphs fans out and joins before that section's paragraph-level
//! (possibly summarized) storage is issued; across sections everything runs
//! concurrently. Collaborator failures are isolated per unit of work — the
//! unit is logged and skipped, the rest of the ingestion continues, and the
//! overall call reports `false`.

use std::sync::Arc;

use futures_util::future::join_all;
use serde_json::json;
use tracing::{debug, error, warn};

use crate::chunking::service::{ArticleSource, ChunkingService};
use crate::chunking::tree::{Document, Paragraph, Restored, Section};
use crate::config::IngestionConfig;
use crate::services::{CompletionService, EmbeddingService, Summarizer};
use crate::stores::{VectorRecord, VectorStore};

/// Embeds and persists chunked articles.
#[derive(Clone)]
pub struct IngestionPipeline {
    chunking: ChunkingService,
    embedder: Arc<dyn EmbeddingService>,
    summarizer: Summarizer,
    store: Arc<dyn VectorStore>,
    config: IngestionConfig,
}

impl IngestionPipeline {
    /// Pipeline with default chunking and configuration.
    #[must_use]
    pub fn new(
        embedder: Arc<dyn EmbeddingService>,
        completion: Arc<dyn CompletionService>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            chunking: ChunkingService::new(),
            embedder,
            summarizer: Summarizer::new(completion),
            store,
            config: IngestionConfig::default(),
        }
    }

    /// Replaces the ingestion configuration.
    #[must_use]
    pub fn with_config(mut self, config: IngestionConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the chunking service (e.g. for deterministic identifiers).
    #[must_use]
    pub fn with_chunking(mut self, chunking: ChunkingService) -> Self {
        self.chunking = chunking;
        self
    }

    /// Chunks a raw article and ingests the resulting tree.
    ///
    /// Returns `false` when the article cannot be chunked at all, or when
    /// any unit of work failed; errors are logged, never raised.
    pub async fn ingest_article(&self, owner_id: &str, source: &ArticleSource) -> bool {
        let Some(document) = self.chunking.chunk_document(source) else {
            error!(owner_id, "article could not be chunked; nothing ingested");
            return false;
        };
        self.ingest_document(owner_id, &document).await
    }

    /// Ingests an already-built document tree for the owning entity.
    pub async fn ingest_document(&self, owner_id: &str, document: &Document) -> bool {
        let outcomes = join_all(
            document
                .sections
                .iter()
                .map(|section| self.ingest_section(owner_id, section)),
        )
        .await;
        let ok = outcomes.iter().all(|outcome| *outcome);
        debug!(
            owner_id,
            sections = document.sections.len(),
            success = ok,
            "document ingestion finished"
        );
        ok
    }

    /// Sentence storage for every paragraph joins before the paragraph-level
    /// records are issued.
    async fn ingest_section(&self, owner_id: &str, section: &Section) -> bool {
        let sentence_outcomes = join_all(
            section
                .paragraphs
                .iter()
                .map(|paragraph| self.store_sentences(owner_id, section, paragraph)),
        )
        .await;

        let paragraph_outcomes = join_all(
            section
                .paragraphs
                .iter()
                .map(|paragraph| self.store_paragraph(owner_id, section, paragraph)),
        )
        .await;

        sentence_outcomes.into_iter().all(|ok| ok)
            && paragraph_outcomes.into_iter().all(|ok| ok)
    }

    async fn store_sentences(
        &self,
        owner_id: &str,
        section: &Section,
        paragraph: &Paragraph,
    ) -> bool {
        if paragraph.sentences.is_empty() {
            return true;
        }

        let texts: Vec<String> = paragraph
            .sentences
            .iter()
            .map(|sentence| sentence.content().to_string())
            .collect();

        let embeddings = match self.embedder.embed_many(&texts).await {
            Ok(embeddings) => embeddings,
            Err(err) => {
                error!(
                    owner_id,
                    paragraph_id = %paragraph.id(),
                    error = %err,
                    "sentence embedding failed; skipping paragraph sentences"
                );
                return false;
            }
        };
        if embeddings.len() != texts.len() {
            error!(
                owner_id,
                paragraph_id = %paragraph.id(),
                expected = texts.len(),
                got = embeddings.len(),
                "embedding batch size mismatch; skipping paragraph sentences"
            );
            return false;
        }

        let records: Vec<VectorRecord> = paragraph
            .sentences
            .iter()
            .zip(embeddings)
            .map(|(sentence, vector)| VectorRecord {
                id: sentence.id().to_string(),
                vector,
                metadata: json!({
                    "owner_id": owner_id,
                    "section_id": section.id().to_string(),
                    "paragraph_id": paragraph.id().to_string(),
                    "sentence_id": sentence.id().to_string(),
                    "content": sentence.content(),
                }),
            })
            .collect();

        match self.store.upsert_many(records).await {
            Ok(()) => true,
            Err(err) => {
                error!(
                    owner_id,
                    paragraph_id = %paragraph.id(),
                    error = %err,
                    "sentence storage failed"
                );
                false
            }
        }
    }

    async fn store_paragraph(
        &self,
        owner_id: &str,
        section: &Section,
        paragraph: &Paragraph,
    ) -> bool {
        let Restored::Present(restored) = paragraph.restore() else {
            debug!(
                owner_id,
                paragraph_id = %paragraph.id(),
                "paragraph restored as absent; nothing to store"
            );
            return true;
        };

        let content = if restored.chars().count() >= self.config.summary_threshold {
            match self.summarizer.summarize(&restored).await {
                Ok(summary) => summary,
                Err(err) => {
                    warn!(
                        owner_id,
                        paragraph_id = %paragraph.id(),
                        error = %err,
                        "summarization failed; embedding raw paragraph text"
                    );
                    restored
                }
            }
        } else {
            restored
        };

        let vector = match self.embedder.embed(&content).await {
            Ok(vector) => vector,
            Err(err) => {
                error!(
                    owner_id,
                    paragraph_id = %paragraph.id(),
                    error = %err,
                    "paragraph embedding failed; skipping paragraph record"
                );
                return false;
            }
        };

        let record = VectorRecord {
            id: paragraph.id().to_string(),
            vector,
            metadata: json!({
                "owner_id": owner_id,
                "section_id": section.id().to_string(),
                "paragraph_id": paragraph.id().to_string(),
                "content": content,
            }),
        };

        match self.store.upsert(record).await {
            Ok(()) => true,
            Err(err) => {
                error!(
                    owner_id,
                    paragraph_id = %paragraph.id(),
                    error = %err,
                    "paragraph storage failed"
                );
                false
            }
        }
    }
}
