//! Section and relevance types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A contiguous span of document text bound to an outline node (or a
/// synthetic fallback span for documents without an outline).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Identifier of the owning document
    pub document_id: String,

    /// Ancestor heading titles, outermost first; the last element is the
    /// section's own heading. Empty for fallback page-window sections.
    pub heading_path: Vec<String>,

    /// Inclusive page range (start, end), 1-indexed
    pub page_range: (u32, u32),

    /// Normalized section text with whitespace collapsed
    pub text: String,

    /// Reading-order index of the section start
    pub order_index: usize,
}

impl Section {
    /// The section's own heading title, if any.
    pub fn title(&self) -> Option<&str> {
        self.heading_path.last().map(String::as_str)
    }

    /// Nesting depth of the heading path.
    pub fn depth(&self) -> usize {
        self.heading_path.len()
    }

    /// Pages covered by this section, in order.
    pub fn page_numbers(&self) -> Vec<u32> {
        (self.page_range.0..=self.page_range.1).collect()
    }

    /// Approximate token count (whitespace-separated).
    pub fn token_count(&self) -> usize {
        self.text.split_whitespace().count()
    }
}

/// The persona and job-to-be-done driving a relevance run.
///
/// Stateless; constructed fresh per run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonaQuery {
    /// Who is asking (e.g., "Research Analyst")
    pub persona: String,

    /// What they need done (e.g., "summarize financial risk")
    pub job: String,
}

impl PersonaQuery {
    /// Create a new persona query.
    pub fn new(persona: impl Into<String>, job: impl Into<String>) -> Self {
        Self {
            persona: persona.into(),
            job: job.into(),
        }
    }

    /// Combined query string used for vectorization.
    pub fn query_text(&self) -> String {
        format!("{} {}", self.persona, self.job)
    }
}

/// A section with its relevance score, final rank, and explainability data.
///
/// Produced fresh per run; never mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedSection {
    /// The scored section
    pub section: Section,

    /// Cosine similarity to the persona query, in [0, 1]
    pub relevance_score: f32,

    /// Final rank, starting at 1
    pub rank: u32,

    /// Vocabulary terms shared by the query and the section
    pub matched_terms: BTreeSet<String>,

    /// Highest-scoring sentence windows from the section text
    pub refined_snippets: Vec<String>,
}
