//! Data model for document analysis.
//!
//! Input types (`TextRun`, `TocEntry`) come from the PDF-reading
//! collaborator; derived types (`HeadingCandidate`, `OutlineTree`, `Section`,
//! `RankedSection`) are produced by the pipeline stages and never mutated
//! after creation.

mod outline;
mod run;
mod section;

pub use outline::{HeadingCandidate, HeadingLevel, OutlineNode, OutlineTree};
pub use run::{BBox, FontWeight, TextRun, TocEntry};
pub use section::{PersonaQuery, RankedSection, Section};
