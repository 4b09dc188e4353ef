//! TF-IDF vector space over a section corpus.

use std::collections::HashMap;

/// A sparse, L2-normalized term-weight vector.
///
/// Entries are sorted by term id so dot products are a linear merge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f32)>,
}

impl SparseVector {
    /// Build from raw (term id, weight) pairs; sorts and L2-normalizes.
    pub fn from_weights(mut entries: Vec<(usize, f32)>) -> Self {
        entries.retain(|(_, w)| *w > 0.0);
        entries.sort_by_key(|(id, _)| *id);

        let norm = entries.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            for (_, w) in &mut entries {
                *w /= norm;
            }
        }
        Self { entries }
    }

    /// Whether the vector carries no weight at all.
    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cosine similarity; both vectors are unit-length so this is a dot
    /// product, clamped into [0, 1] against rounding.
    pub fn cosine(&self, other: &SparseVector) -> f32 {
        let mut dot = 0.0f32;
        let (mut i, mut j) = (0, 0);
        while i < self.entries.len() && j < other.entries.len() {
            let (a_id, a_w) = self.entries[i];
            let (b_id, b_w) = other.entries[j];
            match a_id.cmp(&b_id) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    dot += a_w * b_w;
                    i += 1;
                    j += 1;
                }
            }
        }
        dot.clamp(0.0, 1.0)
    }

    /// Term ids present in both vectors with non-zero weight.
    pub fn common_terms(&self, other: &SparseVector) -> Vec<usize> {
        let mut common = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < self.entries.len() && j < other.entries.len() {
            let a_id = self.entries[i].0;
            let b_id = other.entries[j].0;
            match a_id.cmp(&b_id) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    common.push(a_id);
                    i += 1;
                    j += 1;
                }
            }
        }
        common
    }
}

/// Term-frequency / inverse-document-frequency model fit over one corpus.
///
/// Sublinear tf (1 + ln tf) and smoothed idf (ln((1+N)/(1+df)) + 1), the
/// weighting scikit-learn's `TfidfVectorizer` uses by default for smoothing.
/// Fit once per run across the whole corpus; transforming text with unseen
/// terms simply drops them.
#[derive(Debug, Clone, Default)]
pub struct TfIdfModel {
    term_ids: HashMap<String, usize>,
    terms: Vec<String>,
    idf: Vec<f32>,
}

impl TfIdfModel {
    /// Fit vocabulary and idf over tokenized documents.
    pub fn fit(documents: &[Vec<String>]) -> Self {
        let mut term_ids: HashMap<String, usize> = HashMap::new();
        let mut terms: Vec<String> = Vec::new();
        let mut df: Vec<u32> = Vec::new();

        for tokens in documents {
            let mut seen: Vec<usize> = tokens
                .iter()
                .map(|token| match term_ids.get(token) {
                    Some(&id) => id,
                    None => {
                        let id = terms.len();
                        term_ids.insert(token.clone(), id);
                        terms.push(token.clone());
                        df.push(0);
                        id
                    }
                })
                .collect();
            seen.sort_unstable();
            seen.dedup();
            for id in seen {
                df[id] += 1;
            }
        }

        let n = documents.len() as f32;
        let idf = df
            .iter()
            .map(|&df| ((1.0 + n) / (1.0 + df as f32)).ln() + 1.0)
            .collect();

        Self {
            term_ids,
            terms,
            idf,
        }
    }

    /// Number of vocabulary terms.
    pub fn vocab_size(&self) -> usize {
        self.terms.len()
    }

    /// Term string for an id.
    pub fn term(&self, id: usize) -> &str {
        &self.terms[id]
    }

    /// Transform tokens into a normalized tf-idf vector. Terms outside the
    /// fitted vocabulary are ignored.
    pub fn transform(&self, tokens: &[String]) -> SparseVector {
        let mut counts: HashMap<usize, u32> = HashMap::new();
        for token in tokens {
            if let Some(&id) = self.term_ids.get(token) {
                *counts.entry(id).or_insert(0) += 1;
            }
        }

        let weights = counts
            .into_iter()
            .map(|(id, tf)| (id, (1.0 + (tf as f32).ln()) * self.idf[id]))
            .collect();
        SparseVector::from_weights(weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_fit_and_transform() {
        let corpus = vec![
            tokens(&["risk", "financial", "model"]),
            tokens(&["travel", "guide", "cities"]),
        ];
        let model = TfIdfModel::fit(&corpus);
        assert_eq!(model.vocab_size(), 6);

        let vec = model.transform(&tokens(&["risk", "risk", "financial"]));
        assert!(!vec.is_zero());

        // Unseen terms are dropped.
        let unseen = model.transform(&tokens(&["zebra"]));
        assert!(unseen.is_zero());
    }

    #[test]
    fn test_cosine_self_is_one() {
        let model = TfIdfModel::fit(&[tokens(&["risk", "financial"])]);
        let v = model.transform(&tokens(&["risk", "financial"]));
        assert!((v.cosine(&v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_disjoint_is_zero() {
        let model = TfIdfModel::fit(&[
            tokens(&["risk", "financial"]),
            tokens(&["travel", "guide"]),
        ]);
        let a = model.transform(&tokens(&["risk"]));
        let b = model.transform(&tokens(&["travel"]));
        assert_eq!(a.cosine(&b), 0.0);
    }

    #[test]
    fn test_cosine_bounds() {
        let model = TfIdfModel::fit(&[
            tokens(&["risk", "financial", "model"]),
            tokens(&["risk", "travel"]),
        ]);
        let a = model.transform(&tokens(&["risk", "financial"]));
        let b = model.transform(&tokens(&["risk", "travel"]));
        let sim = a.cosine(&b);
        assert!(sim > 0.0 && sim < 1.0);
    }

    #[test]
    fn test_common_terms() {
        let model = TfIdfModel::fit(&[tokens(&["risk", "financial", "travel"])]);
        let a = model.transform(&tokens(&["risk", "financial"]));
        let b = model.transform(&tokens(&["risk", "travel"]));
        let common = a.common_terms(&b);
        assert_eq!(common.len(), 1);
        assert_eq!(model.term(common[0]), "risk");
    }

    #[test]
    fn test_rarer_terms_weigh_more() {
        // "common" appears in every doc, "rare" in one.
        let corpus = vec![
            tokens(&["common", "rare"]),
            tokens(&["common", "other"]),
            tokens(&["common", "third"]),
        ];
        let model = TfIdfModel::fit(&corpus);
        let query = model.transform(&tokens(&["common", "rare"]));
        let rare_doc = model.transform(&tokens(&["rare"]));
        let common_doc = model.transform(&tokens(&["common"]));
        assert!(query.cosine(&rare_doc) > query.cosine(&common_doc));
    }
}
