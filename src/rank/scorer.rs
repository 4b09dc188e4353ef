//! Corpus-wide relevance scoring and top-K selection.

use std::collections::BTreeSet;

use log::{debug, info};

use super::lexicon::Lexicon;
use super::vector::{SparseVector, TfIdfModel};
use crate::config::AnalyzeOptions;
use crate::model::{PersonaQuery, RankedSection, Section};

/// Scores sections against a persona query and selects a diverse top-K.
pub struct RelevanceScorer {
    lexicon: Lexicon,
    top_k: usize,
    diversity_cap: usize,
    max_subsections: usize,
}

impl RelevanceScorer {
    /// Create a scorer with the default English lexicon.
    pub fn new(options: &AnalyzeOptions) -> Self {
        Self::with_lexicon(options, Lexicon::english())
    }

    /// Create a scorer with a caller-supplied lexicon.
    pub fn with_lexicon(options: &AnalyzeOptions, lexicon: Lexicon) -> Self {
        Self {
            lexicon,
            top_k: options.top_k,
            diversity_cap: options.diversity_cap,
            max_subsections: options.max_subsections,
        }
    }

    /// Rank all sections against the query and return the selected top-K.
    ///
    /// The vocabulary is fit over the whole section corpus in one pass so
    /// scores are comparable cross-document. An empty corpus returns an
    /// empty list; a query with no recognized vocabulary terms yields
    /// uniform zero scores but still a fully ranked, stably ordered list.
    pub fn rank(&self, query: &PersonaQuery, sections: Vec<Section>) -> Vec<RankedSection> {
        if sections.is_empty() {
            info!("empty corpus, nothing to rank");
            return Vec::new();
        }

        let section_tokens: Vec<Vec<String>> = sections
            .iter()
            .map(|s| self.section_tokens(s))
            .collect();
        let model = TfIdfModel::fit(&section_tokens);
        debug!(
            "fitted vocabulary of {} terms over {} sections",
            model.vocab_size(),
            sections.len()
        );

        let query_tokens = self.lexicon.tokenize(&query.query_text());
        let query_vec = model.transform(&query_tokens);
        if query_vec.is_zero() {
            debug!("query has no recognized vocabulary terms, scores are uniform zero");
        }

        let vectors: Vec<SparseVector> = section_tokens
            .iter()
            .map(|tokens| model.transform(tokens))
            .collect();
        let scores: Vec<f32> = vectors.iter().map(|v| query_vec.cosine(v)).collect();

        // Score descending; exact ties prefer the shallower heading path,
        // then a submission-order-independent document key.
        let mut order: Vec<usize> = (0..sections.len()).collect();
        order.sort_by(|&a, &b| {
            scores[b]
                .partial_cmp(&scores[a])
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| sections[a].depth().cmp(&sections[b].depth()))
                .then_with(|| sections[a].document_id.cmp(&sections[b].document_id))
                .then_with(|| sections[a].order_index.cmp(&sections[b].order_index))
        });

        let selected = self.apply_diversity_cap(&order, &sections);

        let mut ranked = Vec::with_capacity(selected.len());
        for (rank, &i) in selected.iter().enumerate() {
            let matched_terms: BTreeSet<String> = query_vec
                .common_terms(&vectors[i])
                .into_iter()
                .map(|id| model.term(id).to_string())
                .collect();
            let refined_snippets =
                self.refine_snippets(&sections[i].text, &model, &query_vec);
            ranked.push(RankedSection {
                section: sections[i].clone(),
                relevance_score: scores[i].clamp(0.0, 1.0),
                rank: rank as u32 + 1,
                matched_terms,
                refined_snippets,
            });
        }
        ranked
    }

    /// Heading path terms count toward the section's vector; a heading is
    /// often the strongest statement of what a section is about.
    fn section_tokens(&self, section: &Section) -> Vec<String> {
        let mut tokens = self.lexicon.tokenize(&section.heading_path.join(" "));
        tokens.extend(self.lexicon.tokenize(&section.text));
        tokens
    }

    /// Walk ranked order, skipping sections from documents that already hit
    /// the per-document cap, until top-K are selected. Skipped sections are
    /// not rescored.
    fn apply_diversity_cap(&self, order: &[usize], sections: &[Section]) -> Vec<usize> {
        let mut per_doc: std::collections::HashMap<&str, usize> =
            std::collections::HashMap::new();
        let mut selected = Vec::with_capacity(self.top_k);
        for &i in order {
            if selected.len() >= self.top_k {
                break;
            }
            let count = per_doc
                .entry(sections[i].document_id.as_str())
                .or_insert(0);
            if *count >= self.diversity_cap {
                continue;
            }
            *count += 1;
            selected.push(i);
        }
        selected
    }

    /// Re-score sentence windows of the section text against the query and
    /// keep the best few as refined snippets.
    fn refine_snippets(
        &self,
        text: &str,
        model: &TfIdfModel,
        query_vec: &SparseVector,
    ) -> Vec<String> {
        if self.max_subsections == 0 || query_vec.is_zero() {
            return Vec::new();
        }

        let sentences = split_sentences(text);
        if sentences.len() <= 1 {
            return Vec::new();
        }

        let mut scored: Vec<(f32, usize, String)> = Vec::new();
        for (i, window) in sentences.windows(2).enumerate() {
            let snippet = window.join(" ");
            let tokens = self.lexicon.tokenize(&snippet);
            let score = query_vec.cosine(&model.transform(&tokens));
            if score > 0.0 {
                scored.push((score, i, snippet));
            }
        }

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.1.cmp(&b.1))
        });
        scored
            .into_iter()
            .take(self.max_subsections)
            .map(|(_, _, snippet)| snippet)
            .collect()
    }
}

/// Split text into sentences on terminal punctuation followed by space.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') && chars.peek().is_some_and(|n| n.is_whitespace()) {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
            }
            current.clear();
        }
    }
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    sentences
}
