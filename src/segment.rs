//! Section segmentation.
//!
//! Partitions a document's text into addressable sections along outline
//! boundaries. A parent section is defined narrowly: it runs from its
//! heading to the first child heading, so no text is counted twice in
//! relevance scoring. Documents without an outline fall back to page
//! windows so every document contributes scorable units.

use unicode_normalization::UnicodeNormalization;

use crate::classify::normalize_line;
use crate::config::AnalyzeOptions;
use crate::extract::ExtractedDocument;
use crate::model::{OutlineTree, Section, TextRun};

/// Segments extracted documents into sections.
pub struct SectionSegmenter {
    min_section_tokens: usize,
    fallback_page_window: u32,
}

impl SectionSegmenter {
    /// Create a segmenter from analysis options.
    pub fn new(options: &AnalyzeOptions) -> Self {
        Self {
            min_section_tokens: options.min_section_tokens,
            fallback_page_window: options.fallback_page_window.max(1),
        }
    }

    /// Produce the ordered section sequence for one document.
    pub fn segment(
        &self,
        document_id: &str,
        doc: &ExtractedDocument,
        outline: &OutlineTree,
    ) -> Vec<Section> {
        let sections = if outline.is_empty() {
            self.page_windows(document_id, doc)
        } else {
            self.outline_sections(document_id, doc, outline)
        };
        self.merge_short(sections)
    }

    /// Outline-driven strategy: one section per node, bounded by the next
    /// heading in reading order.
    fn outline_sections(
        &self,
        document_id: &str,
        doc: &ExtractedDocument,
        outline: &OutlineTree,
    ) -> Vec<Section> {
        // (start run index, heading page, heading path) per node.
        let mut bounds: Vec<(usize, u32, Vec<String>)> = Vec::new();
        outline.walk(|node, ancestors| {
            let mut path: Vec<String> =
                ancestors.iter().map(|a| a.text.clone()).collect();
            path.push(node.text.clone());
            bounds.push((start_run_index(node, &doc.runs), node.page, path));
        });
        bounds.sort_by_key(|(start, _, _)| *start);

        let mut sections = Vec::with_capacity(bounds.len() + 1);

        // Preamble before the first heading.
        if let Some(&(first_start, _, _)) = bounds.first() {
            let preamble: Vec<&TextRun> = doc
                .runs
                .iter()
                .filter(|r| r.order_index < first_start && !r.is_empty())
                .collect();
            if let Some(section) = assemble(document_id, Vec::new(), &preamble, None) {
                sections.push(section);
            }
        }

        for (i, (start, page, path)) in bounds.iter().enumerate() {
            let end = bounds.get(i + 1).map(|(s, _, _)| *s).unwrap_or(usize::MAX);
            let body: Vec<&TextRun> = doc
                .runs
                .iter()
                .filter(|r| {
                    r.order_index > *start && r.order_index < end && !r.is_empty()
                })
                .collect();
            if let Some(section) = assemble(document_id, path.clone(), &body, Some((*start, *page))) {
                sections.push(section);
            }
        }

        sections
    }

    /// Fallback strategy: fixed page windows.
    fn page_windows(&self, document_id: &str, doc: &ExtractedDocument) -> Vec<Section> {
        let page_count = doc.page_count.max(1);
        let window = self.fallback_page_window;
        let mut sections = Vec::new();

        let mut start_page = 1u32;
        while start_page <= page_count {
            let end_page = (start_page + window - 1).min(page_count);
            let body: Vec<&TextRun> = doc
                .runs
                .iter()
                .filter(|r| r.page >= start_page && r.page <= end_page && !r.is_empty())
                .collect();
            if let Some(section) = assemble(document_id, Vec::new(), &body, None) {
                sections.push(section);
            }
            start_page = end_page + 1;
        }

        sections
    }

    /// Merge sections below the minimum token count into their successor;
    /// a trailing short section folds backward instead.
    fn merge_short(&self, sections: Vec<Section>) -> Vec<Section> {
        if sections.len() <= 1 {
            return sections;
        }

        let mut out: Vec<Section> = Vec::with_capacity(sections.len());
        let mut pending: Option<Section> = None;

        for section in sections {
            let section = match pending.take() {
                Some(short) => prepend(short, section),
                None => section,
            };
            if section.token_count() < self.min_section_tokens {
                pending = Some(section);
            } else {
                out.push(section);
            }
        }

        if let Some(short) = pending {
            match out.last_mut() {
                Some(last) => {
                    if !short.text.is_empty() {
                        if !last.text.is_empty() {
                            last.text.push(' ');
                        }
                        last.text.push_str(&short.text);
                    }
                    last.page_range.1 = last.page_range.1.max(short.page_range.1);
                }
                None => out.push(short),
            }
        }

        out
    }
}

/// Fold a short section into the one that follows it.
fn prepend(short: Section, mut into: Section) -> Section {
    if !short.text.is_empty() {
        into.text = if into.text.is_empty() {
            short.text
        } else {
            format!("{} {}", short.text, into.text)
        };
    }
    into.page_range.0 = into.page_range.0.min(short.page_range.0);
    into.order_index = into.order_index.min(short.order_index);
    into
}

/// Find the run an outline node starts at.
///
/// Heuristic nodes carry the run's own order index, but TOC-sourced nodes
/// carry synthetic sequential indices that can collide with unrelated runs,
/// so the index is trusted only when the run there actually holds the
/// heading text (a prefix, for wrap-merged headings). Otherwise the heading
/// is located by matching its text on the node's page, falling back to the
/// first run of that page.
fn start_run_index(node: &crate::model::OutlineNode, runs: &[TextRun]) -> usize {
    let wanted = normalize_line(&node.text);

    if let Some(run) = runs
        .iter()
        .find(|r| r.order_index == node.order_index && r.page == node.page)
    {
        if !run.is_empty() && wanted.starts_with(&normalize_line(&run.text)) {
            return node.order_index;
        }
    }

    if let Some(run) = runs
        .iter()
        .find(|r| r.page == node.page && normalize_line(&r.text) == wanted)
    {
        return run.order_index;
    }

    runs.iter()
        .filter(|r| r.page == node.page)
        .map(|r| r.order_index)
        .min()
        .unwrap_or(node.order_index)
}

fn assemble(
    document_id: &str,
    heading_path: Vec<String>,
    body: &[&TextRun],
    heading: Option<(usize, u32)>,
) -> Option<Section> {
    let text = normalize_text(body);
    if text.is_empty() && heading.is_none() {
        return None;
    }

    let first_page = body.iter().map(|r| r.page).min();
    let last_page = body.iter().map(|r| r.page).max();
    let (order_index, page_start) = match heading {
        Some((start, page)) => (start, page),
        None => (
            body.iter().map(|r| r.order_index).min().unwrap_or(0),
            first_page.unwrap_or(1),
        ),
    };
    let page_range = (
        page_start.min(first_page.unwrap_or(page_start)),
        last_page.unwrap_or(page_start).max(page_start),
    );

    Some(Section {
        document_id: document_id.to_string(),
        heading_path,
        page_range,
        text,
        order_index,
    })
}

/// NFKC-normalized concatenation with whitespace collapsed.
fn normalize_text(runs: &[&TextRun]) -> String {
    let joined = runs
        .iter()
        .map(|r| r.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    joined
        .nfkc()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
