//! Heading and outline types.

use serde::{Deserialize, Serialize};

/// Heading level of a candidate or outline node.
///
/// Depth is bounded: title plus three body levels. Anything detected deeper
/// is clamped to `H3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HeadingLevel {
    /// Document title
    Title,
    /// Top-level section
    H1,
    /// Subsection
    H2,
    /// Sub-subsection
    H3,
}

impl HeadingLevel {
    /// Numeric rank: 0 for title, 1..=3 for body headings.
    pub fn rank(&self) -> u8 {
        match self {
            HeadingLevel::Title => 0,
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }

    /// Level for a numeric rank, clamped into the valid range.
    pub fn from_rank(rank: u8) -> Self {
        match rank {
            0 => HeadingLevel::Title,
            1 => HeadingLevel::H1,
            2 => HeadingLevel::H2,
            _ => HeadingLevel::H3,
        }
    }

    /// The level one rank deeper, clamped at `H3`.
    pub fn deeper(&self) -> Self {
        Self::from_rank(self.rank().saturating_add(1))
    }

    /// Level for a numbering depth (`1.` = 1, `1.2` = 2, `1.2.3` = 3).
    pub fn from_numbering_depth(depth: usize) -> Self {
        Self::from_rank((depth as u8).clamp(1, 3))
    }
}

impl std::fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HeadingLevel::Title => "TITLE",
            HeadingLevel::H1 => "H1",
            HeadingLevel::H2 => "H2",
            HeadingLevel::H3 => "H3",
        };
        write!(f, "{}", s)
    }
}

/// A heading candidate produced by the detector.
///
/// Created once, consumed by the hierarchy builder, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadingCandidate {
    /// Heading text
    pub text: String,

    /// Page number (1-indexed)
    pub page: u32,

    /// Assigned level
    pub level: HeadingLevel,

    /// Detection confidence in [0, 1]
    pub score: f32,

    /// Global reading-order index of the originating run
    pub order_index: usize,
}

impl HeadingCandidate {
    /// Create a new heading candidate.
    pub fn new(
        text: impl Into<String>,
        page: u32,
        level: HeadingLevel,
        score: f32,
        order_index: usize,
    ) -> Self {
        Self {
            text: text.into(),
            page,
            level,
            score,
            order_index,
        }
    }
}

/// A node in the outline tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineNode {
    /// Heading level
    pub level: HeadingLevel,

    /// Heading text
    pub text: String,

    /// Page number (1-indexed)
    pub page: u32,

    /// Reading-order index of the heading run
    pub order_index: usize,

    /// Child nodes, ordered by `order_index`
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    /// Create a leaf node.
    pub fn new(level: HeadingLevel, text: impl Into<String>, page: u32, order_index: usize) -> Self {
        Self {
            level,
            text: text.into(),
            page,
            order_index,
            children: Vec::new(),
        }
    }

    /// Maximum depth below this node (a leaf has depth 1).
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(OutlineNode::depth)
            .max()
            .unwrap_or(0)
    }

    /// Total node count including this node.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(OutlineNode::count).sum::<usize>()
    }
}

/// A resolved document outline: a synthetic root holding the title plus the
/// top-level heading nodes.
///
/// The tree is acyclic and owned exclusively by one document result; sharing
/// across documents would break the per-worker ownership model.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OutlineTree {
    /// Resolved document title
    pub title: String,

    /// Top-level nodes in reading order
    pub children: Vec<OutlineNode>,

    /// Page count of the source document
    pub page_count: u32,
}

impl OutlineTree {
    /// Create an empty outline with only a title.
    pub fn titled(title: impl Into<String>, page_count: u32) -> Self {
        Self {
            title: title.into(),
            children: Vec::new(),
            page_count,
        }
    }

    /// Whether the outline has no body headings.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Maximum tree depth counting the synthetic root.
    pub fn depth(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(OutlineNode::depth)
            .max()
            .unwrap_or(0)
    }

    /// Total number of heading nodes.
    pub fn total_nodes(&self) -> usize {
        self.children.iter().map(OutlineNode::count).sum()
    }

    /// Visit all nodes depth-first in reading order.
    pub fn walk<'a>(&'a self, mut visit: impl FnMut(&'a OutlineNode, &[&'a OutlineNode])) {
        fn inner<'a>(
            node: &'a OutlineNode,
            ancestors: &mut Vec<&'a OutlineNode>,
            visit: &mut impl FnMut(&'a OutlineNode, &[&'a OutlineNode]),
        ) {
            visit(node, ancestors);
            ancestors.push(node);
            for child in &node.children {
                inner(child, ancestors, visit);
            }
            ancestors.pop();
        }

        let mut ancestors = Vec::new();
        for child in &self.children {
            inner(child, &mut ancestors, &mut visit);
        }
    }

    /// Flatten to `(level, text, page)` triples in reading order.
    pub fn flatten(&self) -> Vec<(HeadingLevel, String, u32)> {
        let mut out = Vec::with_capacity(self.total_nodes());
        self.walk(|node, _| out.push((node.level, node.text.clone(), node.page)));
        out
    }
}
