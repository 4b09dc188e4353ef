//! Analysis options and configuration.

use std::time::Duration;

/// Options controlling heading detection, segmentation, and ranking.
///
/// The numeric thresholds are policy knobs without a single correct value;
/// they are exposed here rather than hard-coded so callers can tune them
/// against representative documents. `validate` clamps values into sane
/// ranges instead of failing.
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Font size must exceed the body median by this ratio to count as a
    /// heading-sized run
    pub font_ratio: f32,

    /// Minimum weighted rule score for a run to become a heading candidate
    pub score_threshold: f32,

    /// Maximum character length for heading text
    pub max_heading_len: usize,

    /// Sections below this token count are merged with the following section
    pub min_section_tokens: usize,

    /// Page window size for no-outline fallback segmentation
    pub fallback_page_window: u32,

    /// Maximum sections a single document may contribute to the top-K
    pub diversity_cap: usize,

    /// Number of ranked sections to select
    pub top_k: usize,

    /// Maximum refined sentence-window snippets per reported section
    pub max_subsections: usize,

    /// Worker pool size for the per-document phase
    pub workers: usize,

    /// Time-to-live for cached outlines
    pub cache_ttl: Duration,

    /// Soft per-document processing timeout
    pub soft_timeout: Duration,

    /// Classifier configuration version; part of the cache fingerprint so a
    /// config change invalidates stale results
    pub config_version: String,
}

impl AnalyzeOptions {
    /// Create options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the heading font-size ratio.
    pub fn with_font_ratio(mut self, ratio: f32) -> Self {
        self.font_ratio = ratio;
        self
    }

    /// Set the candidate score threshold.
    pub fn with_score_threshold(mut self, threshold: f32) -> Self {
        self.score_threshold = threshold;
        self
    }

    /// Set the minimum section token count.
    pub fn with_min_section_tokens(mut self, tokens: usize) -> Self {
        self.min_section_tokens = tokens;
        self
    }

    /// Set the fallback page window size.
    pub fn with_fallback_page_window(mut self, pages: u32) -> Self {
        self.fallback_page_window = pages;
        self
    }

    /// Set the per-document diversity cap.
    pub fn with_diversity_cap(mut self, cap: usize) -> Self {
        self.diversity_cap = cap;
        self
    }

    /// Set the number of top sections to select.
    pub fn with_top_k(mut self, k: usize) -> Self {
        self.top_k = k;
        self
    }

    /// Set the worker pool size.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the cache TTL.
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Set the soft per-document timeout.
    pub fn with_soft_timeout(mut self, timeout: Duration) -> Self {
        self.soft_timeout = timeout;
        self
    }

    /// Set the configuration version string.
    pub fn with_config_version(mut self, version: impl Into<String>) -> Self {
        self.config_version = version.into();
        self
    }

    /// Clamp values into valid ranges.
    pub fn validate(mut self) -> Self {
        if !(1.0..=4.0).contains(&self.font_ratio) {
            self.font_ratio = 1.15;
        }
        if !(0.1..=1.0).contains(&self.score_threshold) {
            self.score_threshold = 0.5;
        }
        self.max_heading_len = self.max_heading_len.max(16);
        self.fallback_page_window = self.fallback_page_window.max(1);
        self.diversity_cap = self.diversity_cap.max(1);
        self.top_k = self.top_k.max(1);
        self.workers = self.workers.max(1);
        self
    }
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            font_ratio: 1.15,
            score_threshold: 0.5,
            max_heading_len: 200,
            min_section_tokens: 20,
            fallback_page_window: 1,
            diversity_cap: 2,
            top_k: 10,
            max_subsections: 3,
            workers: 4,
            cache_ttl: Duration::from_secs(3600),
            soft_timeout: Duration::from_secs(30),
            config_version: "v2".to_string(),
        }
    }
}
