//! Tokenization and stopword filtering.

use std::collections::HashSet;

use unicode_normalization::UnicodeNormalization;

/// Default English stopwords. Kept deliberately small; the lexicon is a
/// pluggable resource and callers with better lists should supply them.
const ENGLISH_STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "been", "but", "by", "can", "do", "does", "for",
    "from", "had", "has", "have", "if", "in", "into", "is", "it", "its", "may", "more", "most",
    "not", "of", "on", "or", "our", "shall", "should", "such", "than", "that", "the", "their",
    "them", "then", "there", "these", "they", "this", "to", "was", "we", "were", "which", "will",
    "with", "would", "you", "your",
];

/// Lexical resource: tokenizer plus stopword list.
#[derive(Debug, Clone)]
pub struct Lexicon {
    stopwords: HashSet<String>,
}

impl Lexicon {
    /// Lexicon with the built-in English stopword set.
    pub fn english() -> Self {
        Self {
            stopwords: ENGLISH_STOPWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Lexicon with a caller-supplied stopword list.
    pub fn with_stopwords<I, S>(stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            stopwords: stopwords
                .into_iter()
                .map(|s| s.into().to_lowercase())
                .collect(),
        }
    }

    /// Whether a (lowercased) token is a stopword.
    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    /// Tokenize: NFKC-normalize, lowercase, split on non-alphanumeric
    /// boundaries, drop one-character tokens and stopwords.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let normalized: String = text.nfkc().collect::<String>().to_lowercase();
        normalized
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| t.chars().count() > 1)
            .filter(|t| !self.is_stopword(t))
            .map(|t| t.to_string())
            .collect()
    }
}

impl Default for Lexicon {
    fn default() -> Self {
        Self::english()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_drops_stopwords_and_punctuation() {
        let lexicon = Lexicon::english();
        let tokens = lexicon.tokenize("The risk, and the FINANCIAL model!");
        assert_eq!(tokens, vec!["risk", "financial", "model"]);
    }

    #[test]
    fn test_tokenize_all_stopwords() {
        let lexicon = Lexicon::english();
        assert!(lexicon.tokenize("the and of a to").is_empty());
    }

    #[test]
    fn test_custom_stopwords() {
        let lexicon = Lexicon::with_stopwords(["Risk"]);
        let tokens = lexicon.tokenize("the risk model");
        assert_eq!(tokens, vec!["the", "model"]);
    }

    #[test]
    fn test_short_tokens_dropped() {
        let lexicon = Lexicon::english();
        assert_eq!(lexicon.tokenize("x y model"), vec!["model"]);
    }
}
