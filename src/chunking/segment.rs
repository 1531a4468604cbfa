//! Section segmentation: classify the flat element sequence into labeled
//! heading/body runs.
//!
//! The fold keeps a current heading, its level, and a body accumulator.
//! Headings flush the pending run; emphasized paragraphs are promoted to
//! headings (keeping the current level); the first plain paragraph of a
//! heading-less document is promoted to the initial heading; a list arriving
//! with no heading demotes the previous body element into one.

use tracing::debug;

use super::elements::ContentElement;

/// Level assigned to top-level headings (the SECTION band).
pub const SECTION_LEVEL: u8 = 1;

/// Smallest level in the PARAGRAPH-or-deeper band.
pub const PARAGRAPH_LEVEL: u8 = 2;

/// A labeled heading/body run, consumed once by the tree builder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArticleSection {
    /// Heading text for the run.
    pub heading: String,
    /// Nesting level: 1 = top-level heading, larger = deeper.
    pub level: u8,
    /// Body elements accumulated under the heading, in document order.
    pub body: Vec<ContentElement>,
}

/// Folds the normalized element sequence into ordered [`ArticleSection`]s.
///
/// A sequence with no headings and no body yields an empty result; that is
/// a valid outcome, not an error.
pub fn segment_elements(elements: Vec<ContentElement>) -> Vec<ArticleSection> {
    let mut sections: Vec<ArticleSection> = Vec::new();
    let mut heading: Option<String> = None;
    let mut level: u8 = SECTION_LEVEL;
    let mut body: Vec<ContentElement> = Vec::new();

    for element in elements {
        match element {
            ContentElement::Heading { level: l, text } => {
                flush(&mut sections, &mut heading, level, &mut body);
                heading = Some(text);
                level = l;
            }
            ContentElement::Paragraph {
                text,
                emphasized: true,
            } => {
                // Promoted heading keeps the run's current level.
                flush(&mut sections, &mut heading, level, &mut body);
                heading = Some(text);
            }
            ContentElement::Paragraph {
                text,
                emphasized: false,
            } => {
                if heading.is_none() {
                    heading = Some(text);
                } else {
                    body.push(ContentElement::Paragraph {
                        text,
                        emphasized: false,
                    });
                }
            }
            ContentElement::List { items } => {
                if heading.is_none() {
                    if let Some(previous) = body.pop() {
                        heading = Some(previous.text());
                    }
                }
                body.push(ContentElement::List { items });
            }
        }
    }

    flush(&mut sections, &mut heading, level, &mut body);
    sections
}

fn flush(
    sections: &mut Vec<ArticleSection>,
    heading: &mut Option<String>,
    level: u8,
    body: &mut Vec<ContentElement>,
) {
    match heading.take() {
        Some(text) => sections.push(ArticleSection {
            heading: text,
            level,
            body: std::mem::take(body),
        }),
        None => {
            if !body.is_empty() {
                debug!(
                    dropped = body.len(),
                    "body elements with no heading in scope; dropping"
                );
                body.clear();
            }
        }
    }
}
