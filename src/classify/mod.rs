//! Heading candidate detection.
//!
//! Scores each text run for "headingness" from layout signals (font size
//! tiers, boldness, isolation) and text-pattern signals (numbering, casing),
//! then assigns a level. When the document exposes a native table of
//! contents, those triples are preferred verbatim and heuristics only fill
//! the pages the TOC does not cover.

mod detector;
mod stats;

pub use detector::HeadingDetector;
pub use stats::{repeated_lines, FontStatistics};

pub(crate) use stats::normalize_line;
