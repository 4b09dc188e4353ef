//! Published output schema.
//!
//! Thin mapping from internal structures to the schema consumers read. The
//! core owns no wire format beyond these serde structs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::Result;
use crate::model::{HeadingLevel, OutlineTree, PersonaQuery, RankedSection};

/// One flattened outline row: `{level, text, page}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineEntry {
    /// Heading level
    pub level: HeadingLevel,
    /// Heading text
    pub text: String,
    /// Page number (1-indexed)
    pub page: u32,
}

/// Per-document analysis result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    /// Document identifier
    pub document_id: String,

    /// Resolved title
    pub title: String,

    /// Flattened outline in reading order
    pub outline: Vec<OutlineEntry>,

    /// Failure message when the document was excluded from the corpus
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DocumentAnalysis {
    /// Build from a resolved outline tree.
    pub fn from_outline(document_id: impl Into<String>, outline: &OutlineTree) -> Self {
        Self {
            document_id: document_id.into(),
            title: outline.title.clone(),
            outline: outline
                .flatten()
                .into_iter()
                .map(|(level, text, page)| OutlineEntry { level, text, page })
                .collect(),
            error: None,
        }
    }

    /// Build a failure record for an excluded document.
    pub fn failed(document_id: impl Into<String>, message: impl Into<String>) -> Self {
        let document_id = document_id.into();
        Self {
            title: document_id.clone(),
            document_id,
            outline: Vec::new(),
            error: Some(message.into()),
        }
    }

    /// Whether the document was processed successfully.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// One ranked section row in the relevance report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedSectionReport {
    /// Owning document
    pub document_id: String,

    /// The section's own heading, absent for fallback sections
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_title: Option<String>,

    /// Ancestor heading titles, outermost first
    pub heading_path: Vec<String>,

    /// Cosine similarity to the query, in [0, 1]
    pub relevance_score: f32,

    /// Final rank, starting at 1
    pub rank: u32,

    /// Vocabulary terms shared by query and section
    pub matched_terms: BTreeSet<String>,

    /// Pages the section covers
    pub page_numbers: Vec<u32>,

    /// Highest-scoring sentence windows from the section
    pub refined_snippets: Vec<String>,
}

impl From<&RankedSection> for RankedSectionReport {
    fn from(ranked: &RankedSection) -> Self {
        Self {
            document_id: ranked.section.document_id.clone(),
            section_title: ranked.section.title().map(str::to_string),
            heading_path: ranked.section.heading_path.clone(),
            relevance_score: ranked.relevance_score,
            rank: ranked.rank,
            matched_terms: ranked.matched_terms.clone(),
            page_numbers: ranked.section.page_numbers(),
            refined_snippets: ranked.refined_snippets.clone(),
        }
    }
}

/// Run-level relevance report for one persona query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelevanceReport {
    /// Persona string
    pub persona: String,

    /// Job-to-be-done string
    pub job: String,

    /// Selected top-K sections in rank order
    pub sections: Vec<RankedSectionReport>,
}

impl RelevanceReport {
    /// Build from the scorer's output.
    pub fn new(query: &PersonaQuery, ranked: &[RankedSection]) -> Self {
        Self {
            persona: query.persona.clone(),
            job: query.job.clone(),
            sections: ranked.iter().map(RankedSectionReport::from).collect(),
        }
    }
}

/// Complete result of one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Per-document outlines, in input order
    pub documents: Vec<DocumentAnalysis>,

    /// Relevance ranking, when a persona query was supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relevance: Option<RelevanceReport>,

    /// When the run completed
    pub processed_at: DateTime<Utc>,
}

impl RunReport {
    /// Serialize to JSON, pretty-printed or compact.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        json.map_err(|e| crate::error::Error::Other(e.to_string()))
    }
}
