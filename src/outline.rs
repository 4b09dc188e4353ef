//! Outline hierarchy construction.
//!
//! Consumes a flat, ordered heading candidate list (native TOC, heuristic,
//! or mixed) and produces a single-rooted tree plus a resolved title. Depth
//! is bounded at four levels (title + H1..H3); level gaps are closed by
//! demotion so consumers always see dense nesting.

use log::debug;

use crate::classify::normalize_line;
use crate::error::{Error, Result};
use crate::model::{HeadingCandidate, HeadingLevel, OutlineNode, OutlineTree};

/// Builds outline trees from candidate sequences.
#[derive(Debug, Default)]
pub struct OutlineBuilder;

impl OutlineBuilder {
    /// Create a builder.
    pub fn new() -> Self {
        Self
    }

    /// Build the outline tree for one document.
    ///
    /// `fallback_title` is used when no TITLE-level candidate exists; only
    /// when that is also absent is the first H1 promoted out of the body.
    /// An empty candidate list is not an error: it yields a title-only tree
    /// (the "no-outline" path).
    pub fn build(
        &self,
        candidates: Vec<HeadingCandidate>,
        fallback_title: Option<&str>,
        document_id: &str,
        page_count: u32,
    ) -> Result<OutlineTree> {
        validate_order(&candidates)?;
        let mut candidates = suppress_duplicates(candidates);

        // Title resolution. A TITLE candidate nearest the start always wins
        // and leaves the body; the fallback title keeps the body intact; H1
        // promotion is the last resort.
        let title = match take_title_candidate(&mut candidates) {
            Some(text) => text,
            None => match fallback_title {
                Some(text) if !text.trim().is_empty() => text.trim().to_string(),
                _ => match take_first_h1(&mut candidates) {
                    Some(text) => text,
                    None => document_id.to_string(),
                },
            },
        };

        if candidates.is_empty() {
            debug!("'{}': no outline candidates, title-only tree", document_id);
            return Ok(OutlineTree::titled(title, page_count));
        }

        let mut tree = OutlineTree::titled(title, page_count);
        // Stack of (rank, index-path into the tree). Plain owned child
        // vectors suffice: depth is bounded and node counts are small.
        let mut stack: Vec<(u8, Vec<usize>)> = Vec::new();

        for candidate in candidates {
            // TITLE candidates remaining in the body behave as H1.
            let wanted = candidate.level.rank().max(1);

            while let Some((top_rank, _)) = stack.last() {
                if *top_rank < wanted {
                    break;
                }
                stack.pop();
            }

            // Gap policy: never deeper than one rank below the parent.
            let parent_rank = stack.last().map(|(r, _)| *r).unwrap_or(0);
            let rank = wanted.min(parent_rank + 1);

            let page = clamp_page(candidate.page, page_count);
            let node = OutlineNode::new(
                HeadingLevel::from_rank(rank),
                candidate.text,
                page,
                candidate.order_index,
            );

            let path = match stack.last() {
                Some((_, parent_path)) => {
                    let parent = node_at_mut(&mut tree, parent_path);
                    parent.children.push(node);
                    let mut path = parent_path.clone();
                    path.push(parent.children.len() - 1);
                    path
                }
                None => {
                    tree.children.push(node);
                    vec![tree.children.len() - 1]
                }
            };
            stack.push((rank, path));
        }

        debug_assert!(tree.depth() <= 4);
        Ok(tree)
    }
}

fn validate_order(candidates: &[HeadingCandidate]) -> Result<()> {
    for (i, pair) in candidates.windows(2).enumerate() {
        if pair[1].order_index <= pair[0].order_index {
            return Err(Error::MalformedCandidateOrder {
                index: i + 1,
                found: pair[1].order_index,
                previous: pair[0].order_index,
            });
        }
    }
    Ok(())
}

/// Collapse consecutive candidates with identical normalized text on the
/// same page; repeated running headers misclassified as headings.
fn suppress_duplicates(candidates: Vec<HeadingCandidate>) -> Vec<HeadingCandidate> {
    let mut out: Vec<HeadingCandidate> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if let Some(last) = out.last() {
            if last.page == candidate.page
                && normalize_line(&last.text) == normalize_line(&candidate.text)
            {
                continue;
            }
        }
        out.push(candidate);
    }
    out
}

fn take_title_candidate(candidates: &mut Vec<HeadingCandidate>) -> Option<String> {
    let pos = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| c.level == HeadingLevel::Title)
        .min_by_key(|(_, c)| c.order_index)
        .map(|(i, _)| i)?;
    Some(candidates.remove(pos).text)
}

fn take_first_h1(candidates: &mut Vec<HeadingCandidate>) -> Option<String> {
    let pos = candidates
        .iter()
        .position(|c| c.level == HeadingLevel::H1)?;
    Some(candidates.remove(pos).text)
}

fn clamp_page(page: u32, page_count: u32) -> u32 {
    if page_count == 0 {
        return page.max(1);
    }
    page.clamp(1, page_count)
}

fn node_at_mut<'a>(tree: &'a mut OutlineTree, path: &[usize]) -> &'a mut OutlineNode {
    let mut node = &mut tree.children[path[0]];
    for &i in &path[1..] {
        node = &mut node.children[i];
    }
    node
}
