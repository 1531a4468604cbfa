//! The document ownership tree and its round-trip restoration.
//!
//! Document → Section → Paragraph → Sentence, each level owning its ordered
//! children exclusively. Child order is document order and is never
//! rearranged. Restoration is the deterministic inverse of tree building:
//! lossy at formatting, lossless at content ordering. Absence of content is
//! threaded explicitly through [`Restored`] rather than signalled by empty
//! strings or caught panics.

use tracing::error;

use super::ids::{IdProvider, NodeId};
use super::segment::{ArticleSection, SECTION_LEVEL};
use crate::types::RagtreeError;

/// Default delimiter between restored sections.
pub const SECTION_DELIMITER: &str = "\n\n";

/// Result of restoring a tree level: flat text, or nothing to restore.
///
/// `Absent` is distinct from `Present("")` by construction — a present
/// restoration is never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Restored {
    /// Trimmed, non-empty restored text.
    Present(String),
    /// The level (or every level below it) had no content.
    Absent,
}

impl Restored {
    /// Wraps text, mapping whitespace-only input to `Absent`.
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            Self::Absent
        } else if trimmed.len() == text.len() {
            Self::Present(text)
        } else {
            Self::Present(trimmed.to_string())
        }
    }

    /// `true` when content was restored.
    #[must_use]
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Converts into an `Option`, discarding the absence marker.
    #[must_use]
    pub fn into_option(self) -> Option<String> {
        match self {
            Self::Present(text) => Some(text),
            Self::Absent => None,
        }
    }
}

/// Leaf node: one content block's text.
#[derive(Clone, Debug)]
pub struct Sentence {
    id: NodeId,
    content: String,
}

impl Sentence {
    /// Creates a sentence with a fresh identity.
    pub fn new(ids: &dyn IdProvider, content: impl Into<String>) -> Self {
        Self {
            id: ids.next_id(),
            content: content.into(),
        }
    }

    /// The sentence's identity.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The immutable text content.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Restores the sentence: its own text.
    #[must_use]
    pub fn restore(&self) -> Restored {
        Restored::from_text(self.content.clone())
    }
}

/// Ordered run of sentences.
#[derive(Clone, Debug)]
pub struct Paragraph {
    id: NodeId,
    /// Sentences in document order.
    pub sentences: Vec<Sentence>,
}

impl Paragraph {
    /// Creates a paragraph owning the given sentences.
    pub fn new(ids: &dyn IdProvider, sentences: Vec<Sentence>) -> Self {
        Self {
            id: ids.next_id(),
            sentences,
        }
    }

    /// The paragraph's identity.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Sentence texts joined by a single space, trimmed.
    #[must_use]
    pub fn restore(&self) -> Restored {
        join_restorations(self.sentences.iter().map(Sentence::restore), " ")
    }
}

/// Ordered run of paragraphs under one top-level heading.
#[derive(Clone, Debug)]
pub struct Section {
    id: NodeId,
    /// Paragraphs in document order.
    pub paragraphs: Vec<Paragraph>,
}

impl Section {
    /// Creates an empty section.
    pub fn new(ids: &dyn IdProvider) -> Self {
        Self {
            id: ids.next_id(),
            paragraphs: Vec::new(),
        }
    }

    /// The section's identity.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Paragraph restorations joined by newline, trimmed.
    #[must_use]
    pub fn restore(&self) -> Restored {
        join_restorations(self.paragraphs.iter().map(Paragraph::restore), "\n")
    }
}

/// Root of the ownership tree, built once per ingestion call.
#[derive(Clone, Debug)]
pub struct Document {
    id: NodeId,
    /// Sections in document order.
    pub sections: Vec<Section>,
}

impl Document {
    /// Creates an empty document.
    pub fn new(ids: &dyn IdProvider) -> Self {
        Self {
            id: ids.next_id(),
            sections: Vec::new(),
        }
    }

    /// The document's identity.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Section restorations joined by a blank line, trimmed.
    #[must_use]
    pub fn restore(&self) -> Restored {
        self.restore_with(SECTION_DELIMITER)
    }

    /// Section restorations joined by the supplied delimiter, trimmed.
    #[must_use]
    pub fn restore_with(&self, delimiter: &str) -> Restored {
        join_restorations(self.sections.iter().map(Section::restore), delimiter)
    }
}

/// Joins present child restorations; all-absent input is itself absent.
fn join_restorations(children: impl Iterator<Item = Restored>, separator: &str) -> Restored {
    let parts: Vec<String> = children.filter_map(Restored::into_option).collect();
    if parts.is_empty() {
        Restored::Absent
    } else {
        Restored::from_text(parts.join(separator))
    }
}

/// Folds the segmented runs into a document.
///
/// Any classification failure during the fold is logged and reported as an
/// absent document — never a partially built tree. Callers must treat `None`
/// as "chunking failed," not "chunking produced an empty document."
pub fn build_tree(sections: Vec<ArticleSection>, ids: &dyn IdProvider) -> Option<Document> {
    match fold_sections(sections, ids) {
        Ok(document) => Some(document),
        Err(err) => {
            error!(error = %err, "failed to fold sections into a document tree");
            None
        }
    }
}

fn fold_sections(
    sections: Vec<ArticleSection>,
    ids: &dyn IdProvider,
) -> Result<Document, RagtreeError> {
    let mut document = Document::new(ids);

    for section in sections {
        if section.level == 0 {
            return Err(RagtreeError::Classification(format!(
                "heading level 0 for '{}' falls outside both bands",
                section.heading
            )));
        }

        if section.level == SECTION_LEVEL {
            let mut node = Section::new(ids);
            if !section.body.is_empty() {
                node.paragraphs.push(paragraph_from_body(ids, &section));
            }
            document.sections.push(node);
        } else {
            // PARAGRAPH-or-deeper band.
            let paragraph = if section.body.is_empty() {
                Paragraph::new(ids, vec![Sentence::new(ids, section.heading.clone())])
            } else {
                paragraph_from_body(ids, &section)
            };
            match document.sections.last_mut() {
                Some(current) => current.paragraphs.push(paragraph),
                None => {
                    // Subordinate heading before any top-level one opens an
                    // implicit section so the content is not lost.
                    let mut node = Section::new(ids);
                    node.paragraphs.push(paragraph);
                    document.sections.push(node);
                }
            }
        }
    }

    Ok(document)
}

fn paragraph_from_body(ids: &dyn IdProvider, section: &ArticleSection) -> Paragraph {
    let sentences = section
        .body
        .iter()
        .map(|element| Sentence::new(ids, element.text()))
        .collect();
    Paragraph::new(ids, sentences)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunking::elements::ContentElement;
    use crate::chunking::ids::SequentialIds;

    fn body_paragraph(text: &str) -> ContentElement {
        ContentElement::Paragraph {
            text: text.into(),
            emphasized: false,
        }
    }

    fn run(heading: &str, level: u8, body: Vec<ContentElement>) -> ArticleSection {
        ArticleSection {
            heading: heading.into(),
            level,
            body,
        }
    }

    #[test]
    fn section_band_creates_sections_with_body_paragraphs() {
        let ids = SequentialIds::new();
        let document = build_tree(
            vec![
                run("Overview", 1, vec![body_paragraph("First."), body_paragraph("Second.")]),
                run("Conclusion", 1, vec![body_paragraph("Last.")]),
            ],
            &ids,
        )
        .expect("tree builds");
        assert_eq!(document.sections.len(), 2);
        assert_eq!(document.sections[0].paragraphs.len(), 1);
        assert_eq!(document.sections[0].paragraphs[0].sentences.len(), 2);
        assert_eq!(
            document.sections[0].paragraphs[0].sentences[0].content(),
            "First."
        );
    }

    #[test]
    fn paragraph_band_appends_to_current_section() {
        let ids = SequentialIds::new();
        let document = build_tree(
            vec![
                run("Top", 1, vec![]),
                run("Sub", 2, vec![body_paragraph("Body.")]),
                run("Bare sub", 3, vec![]),
            ],
            &ids,
        )
        .expect("tree builds");
        assert_eq!(document.sections.len(), 1);
        let section = &document.sections[0];
        assert_eq!(section.paragraphs.len(), 2);
        assert_eq!(section.paragraphs[0].sentences[0].content(), "Body.");
        // A bodiless subordinate heading carries its own text.
        assert_eq!(section.paragraphs[1].sentences[0].content(), "Bare sub");
    }

    #[test]
    fn paragraph_band_before_any_section_opens_an_implicit_one() {
        let ids = SequentialIds::new();
        let document = build_tree(vec![run("Orphan", 2, vec![body_paragraph("Text.")])], &ids)
            .expect("tree builds");
        assert_eq!(document.sections.len(), 1);
        assert_eq!(
            document.sections[0].paragraphs[0].sentences[0].content(),
            "Text."
        );
    }

    #[test]
    fn level_zero_aborts_the_fold() {
        let ids = SequentialIds::new();
        assert!(build_tree(vec![run("Bad", 0, vec![])], &ids).is_none());
    }

    #[test]
    fn empty_input_builds_an_empty_document() {
        let ids = SequentialIds::new();
        let document = build_tree(Vec::new(), &ids).expect("tree builds");
        assert!(document.sections.is_empty());
        assert_eq!(document.restore(), Restored::Absent);
    }

    #[test]
    fn identities_are_distinct_across_the_tree() {
        let ids = SequentialIds::new();
        let document = build_tree(
            vec![run("A", 1, vec![body_paragraph("x"), body_paragraph("y")])],
            &ids,
        )
        .expect("tree builds");
        let section = &document.sections[0];
        let paragraph = &section.paragraphs[0];
        let mut seen = vec![document.id(), section.id(), paragraph.id()];
        seen.extend(paragraph.sentences.iter().map(Sentence::id));
        let before = seen.len();
        seen.sort_by_key(|id| id.as_uuid());
        seen.dedup();
        assert_eq!(seen.len(), before);
    }

    #[test]
    fn restore_joins_levels_with_expected_separators() {
        let ids = SequentialIds::new();
        let document = build_tree(
            vec![
                run("One", 1, vec![body_paragraph("a"), body_paragraph("b")]),
                run("Two", 1, vec![body_paragraph("c")]),
            ],
            &ids,
        )
        .expect("tree builds");
        assert_eq!(document.restore(), Restored::Present("a b\n\nc".into()));
        assert_eq!(
            document.restore_with(" | "),
            Restored::Present("a b | c".into())
        );
    }

    #[test]
    fn restore_is_deterministic() {
        let ids = SequentialIds::new();
        let document = build_tree(
            vec![run("H", 1, vec![body_paragraph("alpha"), body_paragraph("beta")])],
            &ids,
        )
        .expect("tree builds");
        assert_eq!(document.restore(), document.restore());
    }

    #[test]
    fn empty_containers_restore_as_absent() {
        let ids = SequentialIds::new();
        let paragraph = Paragraph::new(&ids, Vec::new());
        assert_eq!(paragraph.restore(), Restored::Absent);
        let section = Section::new(&ids);
        assert_eq!(section.restore(), Restored::Absent);
    }

    #[test]
    fn whitespace_only_sentence_is_absent_not_empty() {
        let ids = SequentialIds::new();
        let sentence = Sentence::new(&ids, "   ");
        assert_eq!(sentence.restore(), Restored::Absent);
        let paragraph = Paragraph::new(&ids, vec![Sentence::new(&ids, "  "), Sentence::new(&ids, "kept")]);
        assert_eq!(paragraph.restore(), Restored::Present("kept".into()));
    }
}
