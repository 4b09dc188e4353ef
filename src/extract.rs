//! The narrow seam to the PDF-reading collaborator.
//!
//! Low-level parsing (text runs, font metadata, native TOC, geometry) is
//! owned by an opaque external library. This module only defines the
//! interface the pipeline consumes and the shape of what comes back.

use crate::error::Result;
use crate::model::{TextRun, TocEntry};

/// Everything the collaborator yields for one document.
#[derive(Debug, Clone, Default)]
pub struct ExtractedDocument {
    /// Text runs in global reading order
    pub runs: Vec<TextRun>,

    /// Native table of contents, if the document exposes one
    pub toc: Option<Vec<TocEntry>>,

    /// Title from document metadata, if present
    pub metadata_title: Option<String>,

    /// Total page count
    pub page_count: u32,
}

impl ExtractedDocument {
    /// Build from runs alone, deriving the page count.
    pub fn from_runs(runs: Vec<TextRun>) -> Self {
        let page_count = runs.iter().map(|r| r.page).max().unwrap_or(0);
        Self {
            runs,
            toc: None,
            metadata_title: None,
            page_count,
        }
    }

    /// Attach a native TOC.
    pub fn with_toc(mut self, toc: Vec<TocEntry>) -> Self {
        self.toc = Some(toc);
        self
    }

    /// Attach a metadata title.
    pub fn with_metadata_title(mut self, title: impl Into<String>) -> Self {
        self.metadata_title = Some(title.into());
        self
    }

    /// Whether the collaborator found any usable text.
    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(TextRun::is_empty)
    }
}

/// Interface to the PDF-reading collaborator.
///
/// Implementations must preserve reading order (`order_index` strictly
/// increasing) and 1-indexed page numbers, and must expose a native
/// outline/TOC when the document carries one.
pub trait RunExtractor: Send + Sync {
    /// Extract runs and auxiliary structure for one document.
    ///
    /// An `Err` means the document yields no text at all (corrupt,
    /// encrypted, or scanned-only); the pipeline excludes it from the corpus
    /// and continues with the rest of the batch.
    fn extract_runs(&self, document_id: &str, bytes: &[u8]) -> Result<ExtractedDocument>;

    /// Human-readable name for logging.
    fn name(&self) -> &str {
        "extractor"
    }
}
