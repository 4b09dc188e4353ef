//! Persona-driven relevance scoring.
//!
//! Builds a lexical TF-IDF vector space over all sections across all input
//! documents plus the persona+job query, ranks sections by cosine
//! similarity, and selects a diverse top-K with sentence-window refinement.
//! The vocabulary is fit once per run over the whole corpus so scores are
//! comparable cross-document.

mod lexicon;
mod scorer;
mod vector;

pub use lexicon::Lexicon;
pub use scorer::RelevanceScorer;
pub use vector::{SparseVector, TfIdfModel};
