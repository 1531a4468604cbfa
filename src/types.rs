//! Error types shared across the ragtree pipeline.
//!
//! Two handling policies coexist (see module docs on [`crate::chunking`] and
//! [`crate::ingestion`]): reconstruction-path failures are converted to
//! absent-result signals at the level where they occur, while pipeline-path
//! collaborator failures are isolated per unit of work. `RagtreeError` is the
//! typed currency underneath both.

use thiserror::Error;

/// Failures surfaced by the chunking, ingestion, and ranking pipelines.
#[derive(Debug, Error)]
pub enum RagtreeError {
    /// Raw markup could not be parsed into a structural form.
    #[error("structural parse failed: {0}")]
    StructuralParse(String),

    /// Segmentation or tree building hit an unclassifiable input.
    #[error("section classification failed: {0}")]
    Classification(String),

    /// A tree level could not be reconstructed into flat text.
    #[error("restoration failed: {0}")]
    Restoration(String),

    /// The embedding collaborator failed.
    #[error("embedding call failed: {0}")]
    Embedding(String),

    /// The completion collaborator failed or returned an unusable shape.
    #[error("completion call failed: {0}")]
    Completion(String),

    /// The vector store rejected an upsert or query.
    #[error("vector store call failed: {0}")]
    Storage(String),

    /// A tool invocation through the tool-calling client failed.
    #[error("tool call '{name}' failed: {message}")]
    ToolCall {
        /// Name of the tool that was invoked.
        name: String,
        /// Collaborator-reported failure detail.
        message: String,
    },
}
