//! Readable-content extraction from fetched page HTML.
//!
//! Strips non-content structure (scripts, styles, navigation, chrome),
//! evaluates a fixed set of candidate content containers, and keeps the
//! best-scoring block of readable text — longer, paragraph-shaped text
//! wins; link-dense containers (menus, "related articles" rails) are
//! penalised. The result is whitespace-normalised and truncated to a
//! caller-supplied character budget.

use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

use crate::error::SearchError;

/// Tags whose entire subtree is never content.
const NOISE_TAGS: &[&str] = &[
    "script", "style", "noscript", "svg", "canvas", "iframe", "form", "nav", "header", "footer",
    "aside", "template", "button",
];

/// Tags that imply a line break after their text.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "li", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "section", "article",
    "blockquote", "pre", "ul", "ol", "table",
];

/// Candidate content containers with a prior weight, most specific
/// first. Dedicated content elements outweigh generic wrappers, and the
/// `body` fallback is discounted so it only wins when nothing better
/// exists — it aggregates the whole page, noise included.
const CANDIDATE_SELECTORS: &[(&str, f64)] = &[
    ("article", 1.2),
    ("main", 1.2),
    ("[role=\"main\"]", 1.2),
    ("#content", 1.1),
    (".content", 1.1),
    (".post", 1.1),
    (".entry-content", 1.1),
    (".markdown-body", 1.1),
    ("body", 0.8),
];

/// Extract readable text content from raw HTML.
///
/// # Errors
///
/// Returns [`SearchError::Extraction`] if no candidate yields any
/// readable text.
pub fn extract_content(html: &str, max_chars: usize) -> Result<String, SearchError> {
    let document = Html::parse_document(html);

    let raw = best_candidate(&document)
        .ok_or_else(|| SearchError::Extraction("no readable content found".into()))?;

    let text = normalise_whitespace(&raw);
    if text.is_empty() {
        return Err(SearchError::Extraction("no readable content found".into()));
    }

    Ok(truncate_with_marker(&text, max_chars))
}

/// Evaluate every candidate selector and return the best-scoring text.
///
/// Candidates are compared by `(readability score, length)` so that a
/// page too short to score still falls through to its longest non-empty
/// block instead of failing.
fn best_candidate(document: &Html) -> Option<String> {
    let mut best: Option<(f64, usize, String)> = None;

    for (selector_str, prior) in CANDIDATE_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };
        let Some(element) = document.select(&selector).next() else {
            continue;
        };

        let text = readable_text(element);
        if text.trim().is_empty() {
            continue;
        }

        let density = link_density(element, &text);
        let score = readable_score(&text) * prior / (1.0 + density * 2.0);
        let len = text.len();

        let better = match &best {
            None => true,
            Some((best_score, best_len, _)) => {
                score > *best_score || (score == *best_score && len > *best_len)
            }
        };
        if better {
            best = Some((score, len, text));
        }
    }

    best.map(|(_, _, text)| text)
}

/// Collect the text of `element`'s subtree, skipping noise tags and
/// inserting line breaks after block-level elements.
fn readable_text(element: ElementRef<'_>) -> String {
    let mut out = String::new();
    collect_text(*element, &mut out);
    out
}

fn collect_text(node: NodeRef<'_, Node>, out: &mut String) {
    for child in node.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(element) = child.value().as_element() {
            let name = element.name();
            if NOISE_TAGS.contains(&name) {
                continue;
            }
            if name == "br" {
                out.push('\n');
                continue;
            }
            collect_text(child, out);
            if BLOCK_TAGS.contains(&name) {
                out.push('\n');
            }
        }
    }
}

/// Fraction of a candidate's text that lives inside links. High density
/// means navigation or a link farm, not an article.
fn link_density(element: ElementRef<'_>, text: &str) -> f64 {
    let total = text.len().max(1) as f64;
    let Ok(anchor_sel) = Selector::parse("a") else {
        return 0.0;
    };
    let link_len: usize = element
        .select(&anchor_sel)
        .map(|a| a.text().map(str::len).sum::<usize>())
        .sum();
    link_len as f64 / total
}

/// Heuristic readability score: rewards length and paragraph structure,
/// penalises runs of very short lines (menus, tag clouds).
fn readable_score(text: &str) -> f64 {
    let trimmed = text.trim();
    if trimmed.len() < 80 {
        return 0.0;
    }

    let length = trimmed.len().min(12_000) as f64 / 40.0;
    let prose_lines = trimmed
        .lines()
        .filter(|l| l.trim().len() >= 60)
        .count()
        .min(60) as f64
        * 1.8;
    let short_lines = trimmed
        .lines()
        .filter(|l| {
            let len = l.trim().len();
            len > 0 && len < 30
        })
        .count() as f64
        * 0.35;

    (length + prose_lines - short_lines).max(0.0)
}

/// Collapse runs of spaces and blank lines: one space within a line, at
/// most one blank line between paragraphs.
fn normalise_whitespace(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut blanks = 0usize;

    for line in text.lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() {
            blanks += 1;
            if blanks == 1 && !out.is_empty() {
                out.push(String::new());
            }
        } else {
            blanks = 0;
            out.push(line);
        }
    }

    while out.last().is_some_and(String::is_empty) {
        out.pop();
    }
    out.join("\n")
}

/// Truncate to `max_chars` characters on a char boundary, appending a
/// marker when anything was clipped.
fn truncate_with_marker(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((byte_idx, _)) => {
            let mut clipped = text[..byte_idx].trim_end().to_string();
            clipped.push_str("\n\n[content truncated]");
            clipped
        }
    }
}
