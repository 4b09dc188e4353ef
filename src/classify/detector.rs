//! Rule-based heading candidate detection.

use std::collections::HashSet;

use log::{debug, trace};
use regex::Regex;

use super::stats::{normalize_line, repeated_lines, FontStatistics};
use crate::config::AnalyzeOptions;
use crate::extract::ExtractedDocument;
use crate::model::{HeadingCandidate, HeadingLevel, TextRun};

/// Everything a scoring rule may look at for one run.
struct RuleInput<'a> {
    run: &'a TextRun,
    text: &'a str,
    stats: &'a FontStatistics,
    numbering_depth: Option<usize>,
    isolated: bool,
    leading: bool,
    font_ratio: f32,
}

/// A single scoring predicate with its weight.
///
/// Rules form a fixed ordered list combined by weighted sum; new rules are
/// added by extending this list.
struct Rule {
    name: &'static str,
    weight: f32,
    applies: fn(&RuleInput) -> bool,
}

const RULES: &[Rule] = &[
    Rule {
        name: "font-ratio",
        weight: 0.4,
        applies: |input| input.stats.exceeds_ratio(input.run.font_size, input.font_ratio),
    },
    Rule {
        name: "bold",
        weight: 0.3,
        applies: |input| input.run.is_bold(),
    },
    Rule {
        name: "numbering",
        weight: 0.5,
        applies: |input| input.numbering_depth.is_some(),
    },
    Rule {
        name: "casing",
        weight: 0.2,
        applies: |input| {
            let text = input.text;
            if text.chars().count() > 100 {
                return false;
            }
            is_all_caps(text) || is_title_case(text)
        },
    },
    Rule {
        name: "isolated",
        weight: 0.15,
        applies: |input| input.isolated && input.leading,
    },
];

/// Scores text runs for "headingness" and assigns levels.
pub struct HeadingDetector {
    options: AnalyzeOptions,
    numbering: Regex,
}

impl HeadingDetector {
    /// Create a detector with the given options.
    pub fn new(options: &AnalyzeOptions) -> Self {
        Self {
            options: options.clone(),
            numbering: Regex::new(r"^(\d+(?:\.\d+)*)[.)]?\s+").expect("valid numbering pattern"),
        }
    }

    /// Detect heading candidates for one document, ordered by reading order.
    ///
    /// Native TOC triples, when present, are taken verbatim; heuristic
    /// detection only fills the pages the TOC does not cover. Returns an
    /// empty list (not an error) when nothing qualifies.
    pub fn detect(&self, doc: &ExtractedDocument) -> Vec<HeadingCandidate> {
        match &doc.toc {
            Some(toc) if !toc.is_empty() => self.from_toc(toc, doc),
            _ => self.heuristic_candidates(doc),
        }
    }

    /// Fallback title for documents where no TITLE candidate emerges:
    /// metadata title first, then the first run at the largest font size.
    pub fn fallback_title(&self, doc: &ExtractedDocument) -> Option<String> {
        if let Some(title) = &doc.metadata_title {
            let title = title.trim();
            if !title.is_empty() {
                return Some(title.to_string());
            }
        }

        let max_size = doc
            .runs
            .iter()
            .filter(|r| !r.is_empty())
            .map(|r| r.font_size)
            .fold(f32::NEG_INFINITY, f32::max);
        doc.runs
            .iter()
            .find(|r| !r.is_empty() && (r.font_size - max_size).abs() < 0.05)
            .map(|r| r.text.trim().to_string())
    }

    fn from_toc(&self, toc: &[crate::model::TocEntry], doc: &ExtractedDocument) -> Vec<HeadingCandidate> {
        let covered: HashSet<u32> = toc.iter().map(|e| e.page).collect();

        // TOC entries carry full confidence; heuristics fill uncovered pages.
        let mut combined: Vec<(u32, usize, HeadingCandidate)> = toc
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let level = HeadingLevel::from_numbering_depth(entry.level as usize);
                (
                    entry.page,
                    i,
                    HeadingCandidate::new(entry.text.clone(), entry.page, level, 1.0, 0),
                )
            })
            .collect();

        let gap_fill = self
            .heuristic_candidates(doc)
            .into_iter()
            .filter(|c| !covered.contains(&c.page));
        for (i, candidate) in gap_fill.enumerate() {
            combined.push((candidate.page, toc.len() + i, candidate));
        }

        combined.sort_by_key(|(page, seq, _)| (*page, *seq));
        combined
            .into_iter()
            .enumerate()
            .map(|(i, (_, _, mut candidate))| {
                candidate.order_index = i;
                candidate
            })
            .collect()
    }

    fn heuristic_candidates(&self, doc: &ExtractedDocument) -> Vec<HeadingCandidate> {
        let repeated = repeated_lines(&doc.runs, doc.page_count);
        let stats = FontStatistics::from_runs(&doc.runs, &repeated);
        let page_widths = page_widths(&doc.runs);

        let mut candidates = Vec::new();
        for (i, run) in doc.runs.iter().enumerate() {
            let text = run.text.trim();
            if text.is_empty()
                || text.chars().count() > self.options.max_heading_len
                || repeated.contains(&normalize_line(text))
            {
                continue;
            }

            let numbering_depth = self.numbering_depth(text);
            let input = RuleInput {
                run,
                text,
                stats: &stats,
                numbering_depth,
                isolated: is_isolated(run, &doc.runs, i),
                leading: is_leading(run, page_widths.get(&run.page).copied().unwrap_or(0.0)),
                font_ratio: self.options.font_ratio,
            };

            let mut score = 0.0f32;
            for rule in RULES {
                if (rule.applies)(&input) {
                    trace!("rule '{}' matched '{}'", rule.name, text);
                    score += rule.weight;
                }
            }
            let score = score.min(1.0);
            if score < self.options.score_threshold {
                continue;
            }

            let level = self.assign_level(numbering_depth, &stats, run.font_size);
            debug!(
                "heading candidate '{}' (page {}, score {:.2}, level {})",
                text, run.page, score, level
            );
            candidates.push(HeadingCandidate::new(
                text,
                run.page,
                level,
                score,
                run.order_index,
            ));
        }

        merge_wrapped(candidates, &doc.runs)
    }

    /// Explicit numbering is a stronger structural signal than visual size,
    /// so its depth overrides the font-size tier.
    fn assign_level(
        &self,
        numbering_depth: Option<usize>,
        stats: &FontStatistics,
        font_size: f32,
    ) -> HeadingLevel {
        if let Some(depth) = numbering_depth {
            return HeadingLevel::from_numbering_depth(depth);
        }
        match stats.tier_for(font_size) {
            Some(tier) => HeadingLevel::from_rank(tier.min(3) as u8),
            None => HeadingLevel::H3,
        }
    }

    fn numbering_depth(&self, text: &str) -> Option<usize> {
        self.numbering
            .captures(text)
            .map(|caps| caps[1].matches('.').count() + 1)
    }
}

/// Rightmost text edge per page, used as the effective page width.
fn page_widths(runs: &[TextRun]) -> std::collections::HashMap<u32, f32> {
    let mut widths = std::collections::HashMap::new();
    for run in runs {
        let entry = widths.entry(run.page).or_insert(0.0f32);
        *entry = entry.max(run.bbox.x1);
    }
    widths
}

/// Whether the run sits alone on its line (no vertical overlap with another
/// non-empty run on the same page).
fn is_isolated(run: &TextRun, runs: &[TextRun], index: usize) -> bool {
    runs.iter().enumerate().all(|(j, other)| {
        j == index
            || other.page != run.page
            || other.is_empty()
            || other.bbox.y1 <= run.bbox.y0
            || run.bbox.y1 <= other.bbox.y0
    })
}

/// Whether the run starts within the leading third of the page width.
fn is_leading(run: &TextRun, page_width: f32) -> bool {
    page_width <= 0.0 || run.bbox.x0 <= page_width * 0.33
}

fn is_all_caps(text: &str) -> bool {
    let letters: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
    letters.len() > 3 && letters.iter().all(|c| c.is_uppercase())
}

fn is_title_case(text: &str) -> bool {
    let words: Vec<&str> = text.split_whitespace().filter(|w| w.len() > 3).collect();
    !words.is_empty()
        && words
            .iter()
            .all(|w| w.chars().next().is_some_and(|c| c.is_uppercase()))
}

/// Merge adjacent candidates with identical scores on the same line; these
/// are hyphenation or wrap artifacts split by the collaborator.
fn merge_wrapped(candidates: Vec<HeadingCandidate>, runs: &[TextRun]) -> Vec<HeadingCandidate> {
    let mut merged: Vec<HeadingCandidate> = Vec::with_capacity(candidates.len());
    // Order index of the last run folded into merged.last(); a merged
    // candidate keeps the order index of its first run.
    let mut last_end = 0usize;
    for candidate in candidates {
        if let Some(last) = merged.last_mut() {
            if candidate.page == last.page
                && candidate.order_index == last_end + 1
                && (candidate.score - last.score).abs() < f32::EPSILON
                && same_line(last_end, candidate.order_index, runs)
            {
                last.text.push(' ');
                last.text.push_str(&candidate.text);
                last_end = candidate.order_index;
                continue;
            }
        }
        last_end = candidate.order_index;
        merged.push(candidate);
    }
    merged
}

fn same_line(a: usize, b: usize, runs: &[TextRun]) -> bool {
    let find = |idx: usize| runs.iter().find(|r| r.order_index == idx);
    match (find(a), find(b)) {
        (Some(ra), Some(rb)) => ra.bbox.y1 > rb.bbox.y0 && rb.bbox.y1 > ra.bbox.y0,
        _ => false,
    }
}
