//! # docrank
//!
//! Document outline extraction and persona-driven section ranking.
//!
//! Given text runs extracted from page-oriented documents, this library
//! detects heading candidates, builds a well-formed outline hierarchy,
//! segments body text into sections along that outline, and ranks sections
//! against a persona + job query using corpus-wide TF-IDF similarity.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docrank::{
//!     analyze_documents, DocumentInput, ExtractedDocument, PersonaQuery, Result,
//!     RunExtractor, TextRun,
//! };
//!
//! struct MyExtractor;
//!
//! impl RunExtractor for MyExtractor {
//!     fn extract_runs(&self, _id: &str, _bytes: &[u8]) -> Result<ExtractedDocument> {
//!         // Wire up your PDF/text reader here.
//!         Ok(ExtractedDocument::from_runs(vec![
//!             TextRun::new("1. Introduction", 1, 18.0, 0).bold(),
//!             TextRun::new("Risk exposure grew steadily over the year.", 1, 12.0, 1),
//!         ]))
//!     }
//! }
//!
//! fn main() -> Result<()> {
//!     let inputs = vec![DocumentInput::new("report.pdf", std::fs::read("report.pdf")?)];
//!     let query = PersonaQuery::new("Research Analyst", "summarize financial risk");
//!
//!     let report = analyze_documents(&MyExtractor, &inputs, Some(&query))?;
//!     println!("{}", report.to_json(true)?);
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Heading detection**: weighted typographic and lexical rules over
//!   font statistics, with native TOC entries taking precedence
//! - **Outline hierarchy**: well-formed trees with level-gap demotion and
//!   duplicate suppression
//! - **Section segmentation**: narrow parent spans along outline
//!   boundaries, page-window fallback for flat documents
//! - **Persona ranking**: corpus-wide TF-IDF cosine scoring with a
//!   per-document diversity cap and sentence-window snippets
//! - **Parallel batches**: bounded Rayon worker pool with per-document
//!   failure isolation and a single-flight outline cache

pub mod cache;
pub mod classify;
pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod outline;
pub mod output;
pub mod pipeline;
pub mod rank;
pub mod segment;

// Re-export commonly used types
pub use cache::OutlineCache;
pub use classify::{FontStatistics, HeadingDetector};
pub use config::AnalyzeOptions;
pub use error::{Error, Result};
pub use extract::{ExtractedDocument, RunExtractor};
pub use model::{
    BBox, FontWeight, HeadingCandidate, HeadingLevel, OutlineNode, OutlineTree, PersonaQuery,
    RankedSection, Section, TextRun, TocEntry,
};
pub use outline::OutlineBuilder;
pub use output::{DocumentAnalysis, OutlineEntry, RankedSectionReport, RelevanceReport, RunReport};
pub use pipeline::{CancelToken, DocumentInput, Pipeline};
pub use rank::{Lexicon, RelevanceScorer};
pub use segment::SectionSegmenter;

/// Analyze a batch of documents with default options.
///
/// Creates a throwaway [`Pipeline`] per call; batch callers that want
/// outline caching across calls should hold a `Pipeline` instead.
///
/// # Example
///
/// ```no_run
/// # use docrank::{analyze_documents, DocumentInput, ExtractedDocument, PersonaQuery,
/// #     Result, RunExtractor};
/// # struct MyExtractor;
/// # impl RunExtractor for MyExtractor {
/// #     fn extract_runs(&self, _id: &str, _bytes: &[u8]) -> Result<ExtractedDocument> {
/// #         Ok(ExtractedDocument::from_runs(vec![]))
/// #     }
/// # }
/// let inputs = vec![DocumentInput::new("report.pdf", b"...".to_vec())];
/// let query = PersonaQuery::new("Analyst", "find risk");
/// let report = analyze_documents(&MyExtractor, &inputs, Some(&query)).unwrap();
/// ```
pub fn analyze_documents(
    extractor: &dyn RunExtractor,
    inputs: &[DocumentInput],
    query: Option<&PersonaQuery>,
) -> Result<RunReport> {
    analyze_documents_with_options(extractor, inputs, query, AnalyzeOptions::default())
}

/// Analyze a batch of documents with custom options.
pub fn analyze_documents_with_options(
    extractor: &dyn RunExtractor,
    inputs: &[DocumentInput],
    query: Option<&PersonaQuery>,
    options: AnalyzeOptions,
) -> Result<RunReport> {
    Pipeline::new(options).analyze(extractor, inputs, query)
}

/// Build the outline for a single extracted document.
///
/// Runs heading detection and hierarchy construction without the worker
/// pool or cache; useful for tooling that only needs structure.
pub fn build_outline(
    document_id: &str,
    doc: &ExtractedDocument,
    options: &AnalyzeOptions,
) -> Result<OutlineTree> {
    let detector = HeadingDetector::new(options);
    let candidates = detector.detect(doc);
    let fallback = detector.fallback_title(doc);
    OutlineBuilder::new().build(candidates, fallback.as_deref(), document_id, doc.page_count)
}

/// Rank pre-segmented sections against a persona query.
pub fn rank_sections(
    query: &PersonaQuery,
    sections: Vec<Section>,
    options: &AnalyzeOptions,
) -> Vec<RankedSection> {
    RelevanceScorer::new(options).rank(query, sections)
}
