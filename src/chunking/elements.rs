//! Content normalization: raw markup in, a flat ordered sequence of typed
//! content elements out.
//!
//! The normalizer strips everything that carries no article content
//! (scripts, styles, media, forms, whitespace-only blocks) and discards
//! presentation attributes by extracting plain text only. Downstream stages
//! pattern-match on [`ContentElement`] instead of probing markup, so the
//! element kind is decided exactly once, here.
//!
//! Malformed input never reaches the caller as an error: it normalizes to an
//! empty element sequence and is logged.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A typed block-level content element in document order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentElement {
    /// A heading with its nesting level (1 = top-level).
    Heading {
        /// Nesting level, 1..=6.
        level: u8,
        /// Plain heading text.
        text: String,
    },
    /// A body paragraph. `emphasized` marks paragraphs whose entire text is
    /// bold, which the segmenter promotes to headings.
    Paragraph {
        /// Plain paragraph text.
        text: String,
        /// Whole-text bold/emphasis coverage.
        emphasized: bool,
    },
    /// A list with its item texts in order.
    List {
        /// Plain text of each item.
        items: Vec<String>,
    },
}

impl ContentElement {
    /// Plain-text rendition of the element. List items join with newline.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Self::Heading { text, .. } => text.clone(),
            Self::Paragraph { text, .. } => text.clone(),
            Self::List { items } => items.join("\n"),
        }
    }
}

/// Tags whose text content never counts as article content.
const NON_CONTENT_TAGS: &[&str] = &[
    "script", "style", "svg", "select", "noscript", "img", "video", "form",
];

static BLOCK_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("h1, h2, h3, h4, h5, h6, p, ul, ol").expect("static selector is valid")
});

/// Normalizes raw HTML into the flat content-element sequence.
///
/// Operates on a private parse of the input; the caller's string is never
/// mutated. Empty or unrecognizable markup yields an empty sequence.
pub fn normalize_html(raw: &str) -> Vec<ContentElement> {
    if raw.trim().is_empty() {
        debug!("empty html input; nothing to normalize");
        return Vec::new();
    }

    let document = Html::parse_document(raw);
    let mut elements = Vec::new();

    for node in document.select(&BLOCK_SELECTOR) {
        match node.value().name() {
            "p" => {
                // Paragraphs inside list items surface through their item.
                if has_list_ancestor(&node) {
                    continue;
                }
                let text = element_text(&node);
                if text.is_empty() {
                    continue;
                }
                let emphasized = is_emphasized(&node, &text);
                elements.push(ContentElement::Paragraph { text, emphasized });
            }
            "ul" | "ol" => {
                // Nested lists fold into their outermost list element.
                if has_list_ancestor(&node) {
                    continue;
                }
                let items: Vec<String> = node
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|child| child.value().name() == "li")
                    .map(|li| element_text(&li))
                    .filter(|text| !text.is_empty())
                    .collect();
                if items.is_empty() {
                    continue;
                }
                elements.push(ContentElement::List { items });
            }
            name => {
                let level = name.as_bytes()[1] - b'0';
                let text = element_text(&node);
                if text.is_empty() {
                    continue;
                }
                elements.push(ContentElement::Heading { level, text });
            }
        }
    }

    if elements.is_empty() {
        debug!("html input produced no content elements");
    }
    elements
}

fn has_list_ancestor(element: &ElementRef) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|a| matches!(a.value().name(), "ul" | "ol" | "li"))
}

/// Plain text of an element, skipping non-content descendants and
/// collapsing whitespace runs.
fn element_text(element: &ElementRef) -> String {
    let mut out = String::new();
    collect_text(element, &mut out);
    collapse_whitespace(&out)
}

fn collect_text(element: &ElementRef, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(el) = ElementRef::wrap(child) {
            if NON_CONTENT_TAGS.contains(&el.value().name()) {
                continue;
            }
            collect_text(&el, out);
        }
    }
}

fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A paragraph counts as emphasized only when a single bold child covers its
/// entire text. Inline bold words inside a longer paragraph do not qualify.
fn is_emphasized(element: &ElementRef, own_text: &str) -> bool {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .any(|child| is_bold_marker(&child) && element_text(&child) == own_text)
}

fn is_bold_marker(element: &ElementRef) -> bool {
    match element.value().name() {
        "strong" | "b" => true,
        "span" => element.value().attr("style").is_some_and(|style| {
            style.contains("font-weight:bold")
                || style.contains("font-weight: bold")
                || style.contains("tw-prose-bold")
        }),
        _ => false,
    }
}

static MD_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.*)$").expect("static regex is valid"));
static MD_LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s+(.*)$").expect("static regex is valid"));
static MD_BOLD_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\*\*([^*]+)\*\*|__([^_]+)__)$").expect("static regex is valid")
});

/// Normalizes markdown into the flat content-element sequence.
///
/// Line-oriented scan: ATX headings, `-`/`*`/`+`/numbered list runs, and
/// blank-line-separated paragraphs. Fenced code blocks are skipped as
/// non-content. Inline markup other than whole-line bold is left in place;
/// restoration is lossy at formatting by design.
pub fn normalize_markdown(raw: &str) -> Vec<ContentElement> {
    let mut elements = Vec::new();
    let mut paragraph: Vec<String> = Vec::new();
    let mut items: Vec<String> = Vec::new();
    let mut in_fence = false;

    for line in raw.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            flush_paragraph(&mut elements, &mut paragraph);
            flush_list(&mut elements, &mut items);
            continue;
        }
        if in_fence {
            continue;
        }

        if trimmed.is_empty() {
            flush_paragraph(&mut elements, &mut paragraph);
            flush_list(&mut elements, &mut items);
            continue;
        }

        if let Some(caps) = MD_HEADING.captures(trimmed) {
            flush_paragraph(&mut elements, &mut paragraph);
            flush_list(&mut elements, &mut items);
            let text = collapse_whitespace(&caps[2]);
            if !text.is_empty() {
                let level = caps[1].len() as u8;
                elements.push(ContentElement::Heading { level, text });
            }
            continue;
        }

        if let Some(caps) = MD_LIST_ITEM.captures(line) {
            flush_paragraph(&mut elements, &mut paragraph);
            let text = collapse_whitespace(&caps[1]);
            if !text.is_empty() {
                items.push(text);
            }
            continue;
        }

        flush_list(&mut elements, &mut items);
        paragraph.push(trimmed.to_string());
    }

    flush_paragraph(&mut elements, &mut paragraph);
    flush_list(&mut elements, &mut items);

    if elements.is_empty() {
        debug!("markdown input produced no content elements");
    }
    elements
}

fn flush_paragraph(elements: &mut Vec<ContentElement>, lines: &mut Vec<String>) {
    if lines.is_empty() {
        return;
    }
    let joined = collapse_whitespace(&lines.join(" "));
    lines.clear();
    if joined.is_empty() {
        return;
    }
    if let Some(caps) = MD_BOLD_LINE.captures(&joined) {
        let inner = caps.get(1).or_else(|| caps.get(2)).map(|m| m.as_str());
        if let Some(inner) = inner {
            let text = collapse_whitespace(inner);
            if !text.is_empty() {
                elements.push(ContentElement::Paragraph {
                    text,
                    emphasized: true,
                });
            }
            return;
        }
    }
    elements.push(ContentElement::Paragraph {
        text: joined,
        emphasized: false,
    });
}

fn flush_list(elements: &mut Vec<ContentElement>, items: &mut Vec<String>) {
    if items.is_empty() {
        return;
    }
    elements.push(ContentElement::List {
        items: std::mem::take(items),
    });
}
