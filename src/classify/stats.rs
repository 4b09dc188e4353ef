//! Document-wide font statistics for heading detection.

use std::collections::{HashMap, HashSet};

use crate::model::TextRun;

/// Font size statistics over one document.
///
/// Sizes are bucketed at 0.1pt precision. The modal bucket is taken as body
/// text; distinct larger sizes form the heading tiers, largest first.
#[derive(Debug, Clone, Default)]
pub struct FontStatistics {
    /// Body text font size (most common)
    pub body_size: f32,
    /// Distinct font sizes larger than body, sorted descending
    pub heading_sizes: Vec<f32>,
    /// Observed font sizes with frequency, keyed at 0.1pt precision
    size_histogram: HashMap<i32, usize>,
}

impl FontStatistics {
    /// Build statistics from runs, skipping repeated header/footer lines.
    pub fn from_runs(runs: &[TextRun], repeated: &HashSet<String>) -> Self {
        let mut stats = Self::default();
        for run in runs {
            if run.is_empty() || repeated.contains(&normalize_line(&run.text)) {
                continue;
            }
            stats.add_size(run.font_size);
        }
        stats.analyze();
        stats
    }

    /// Add a font size observation.
    pub fn add_size(&mut self, size: f32) {
        let key = (size * 10.0) as i32;
        *self.size_histogram.entry(key).or_insert(0) += 1;
    }

    /// Calculate body size and heading tiers.
    pub fn analyze(&mut self) {
        if self.size_histogram.is_empty() {
            self.body_size = 12.0;
            self.heading_sizes.clear();
            return;
        }

        // Count ties resolve toward the smaller size; body text is never
        // the larger of two equally common sizes in practice.
        let (body_key, _) = self
            .size_histogram
            .iter()
            .map(|(k, c)| (*k, *c))
            .max_by_key(|&(k, c)| (c, std::cmp::Reverse(k)))
            .unwrap_or((120, 0));
        self.body_size = body_key as f32 / 10.0;

        let mut larger: Vec<f32> = self
            .size_histogram
            .keys()
            .filter(|k| **k as f32 / 10.0 > self.body_size + 0.5)
            .map(|k| *k as f32 / 10.0)
            .collect();
        larger.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        self.heading_sizes = larger;
    }

    /// Tier index for a font size: 0 for the largest heading size, 1 for the
    /// next, and so on. `None` when the size is body-sized or smaller.
    pub fn tier_for(&self, font_size: f32) -> Option<usize> {
        if font_size <= self.body_size + 0.5 {
            return None;
        }
        for (i, &size) in self.heading_sizes.iter().enumerate() {
            if font_size >= size - 0.05 {
                return Some(i);
            }
        }
        // Larger than body but between known tiers; treat as the deepest tier.
        Some(self.heading_sizes.len().saturating_sub(1))
    }

    /// Whether a size clears the configured heading ratio over body text.
    pub fn exceeds_ratio(&self, font_size: f32, ratio: f32) -> bool {
        self.body_size > 0.0 && font_size >= self.body_size * ratio
    }
}

/// Normalized form of a line for repetition comparison.
pub(crate) fn normalize_line(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Lines repeated across pages (running headers, footers, page furniture).
///
/// A normalized line counts as repeated when it occurs at least three times
/// and appears on at least half of the document's pages.
pub fn repeated_lines(runs: &[TextRun], page_count: u32) -> HashSet<String> {
    if page_count < 3 {
        return HashSet::new();
    }

    let mut pages_by_line: HashMap<String, HashSet<u32>> = HashMap::new();
    for run in runs {
        if run.is_empty() {
            continue;
        }
        pages_by_line
            .entry(normalize_line(&run.text))
            .or_default()
            .insert(run.page);
    }

    pages_by_line
        .into_iter()
        .filter(|(_, pages)| pages.len() >= 3 && pages.len() as u32 * 2 >= page_count)
        .map(|(line, _)| line)
        .collect()
}
