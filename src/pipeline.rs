//! Batch orchestration.
//!
//! Runs the per-document phase (extract, detect, build, segment) on a
//! bounded worker pool, joins at a barrier, then runs one corpus-wide
//! scoring phase so relevance scores are comparable across documents.
//! Document failures are isolated: a bad document is reported and excluded
//! while the rest of the batch proceeds.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use crossbeam_channel::unbounded;
use log::{info, warn};
use rayon::ThreadPoolBuilder;

use crate::cache::OutlineCache;
use crate::classify::HeadingDetector;
use crate::config::AnalyzeOptions;
use crate::error::{Error, Result};
use crate::extract::RunExtractor;
use crate::model::{PersonaQuery, Section};
use crate::outline::OutlineBuilder;
use crate::output::{DocumentAnalysis, RelevanceReport, RunReport};
use crate::rank::RelevanceScorer;
use crate::segment::SectionSegmenter;

/// One input document: an identifier plus raw bytes.
#[derive(Debug, Clone)]
pub struct DocumentInput {
    /// Caller-chosen identifier, echoed in all outputs
    pub id: String,
    /// Raw document bytes
    pub bytes: Vec<u8>,
}

impl DocumentInput {
    /// Create an input document.
    pub fn new(id: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            id: id.into(),
            bytes,
        }
    }
}

/// Cooperative cancellation handle for a run.
///
/// Cancellation is checked between stages; a running stage is never
/// interrupted. Results already published to the cache stay valid.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Two-phase analysis pipeline over a document batch.
///
/// Owns the outline cache, so repeated `analyze` calls on the same
/// `Pipeline` reuse outlines for unchanged documents.
pub struct Pipeline {
    options: AnalyzeOptions,
    cache: OutlineCache,
    cancel: CancelToken,
}

impl Pipeline {
    /// Create a pipeline; options are clamped into valid ranges.
    pub fn new(options: AnalyzeOptions) -> Self {
        let options = options.validate();
        let cache = OutlineCache::open(options.cache_ttl, options.config_version.clone());
        Self {
            options,
            cache,
            cancel: CancelToken::new(),
        }
    }

    /// Handle for cancelling this pipeline's runs from another thread.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// The pipeline's outline cache.
    pub fn cache(&self) -> &OutlineCache {
        &self.cache
    }

    /// The effective (validated) options.
    pub fn options(&self) -> &AnalyzeOptions {
        &self.options
    }

    /// Analyze a batch of documents, optionally ranking sections against a
    /// persona query.
    ///
    /// Per-document failures are reported in the returned `documents` list
    /// and excluded from the ranking corpus. Errors escape only when the
    /// whole run cannot proceed: pool startup failure or cancellation.
    pub fn analyze(
        &self,
        extractor: &dyn RunExtractor,
        inputs: &[DocumentInput],
        query: Option<&PersonaQuery>,
    ) -> Result<RunReport> {
        info!(
            "analyzing {} documents with {} ({} workers)",
            inputs.len(),
            extractor.name(),
            self.options.workers
        );

        let pool = ThreadPoolBuilder::new()
            .num_threads(self.options.workers)
            .thread_name(|i| format!("docrank-worker-{i}"))
            .build()
            .map_err(|e| Error::WorkerPool(e.to_string()))?;

        let (tx, rx) = unbounded();
        // The scope is the barrier: it returns only once every document
        // task has finished.
        pool.scope(|scope| {
            for (index, input) in inputs.iter().enumerate() {
                let tx = tx.clone();
                scope.spawn(move |_| {
                    let outcome = self.process_document(extractor, input);
                    let _ = tx.send((index, outcome));
                });
            }
        });
        drop(tx);

        let mut outcomes: Vec<(usize, (DocumentAnalysis, Vec<Section>))> =
            rx.into_iter().collect();
        outcomes.sort_by_key(|(index, _)| *index);

        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let mut documents = Vec::with_capacity(outcomes.len());
        let mut corpus: Vec<Section> = Vec::new();
        for (_, (analysis, sections)) in outcomes {
            corpus.extend(sections);
            documents.push(analysis);
        }

        let relevance = query.map(|query| {
            let scorer = RelevanceScorer::new(&self.options);
            let ranked = scorer.rank(query, corpus);
            RelevanceReport::new(query, &ranked)
        });

        Ok(RunReport {
            documents,
            relevance,
            processed_at: Utc::now(),
        })
    }

    /// Run one document end to end, folding any failure into its analysis
    /// record so the batch keeps going.
    fn process_document(
        &self,
        extractor: &dyn RunExtractor,
        input: &DocumentInput,
    ) -> (DocumentAnalysis, Vec<Section>) {
        match self.run_document(extractor, input) {
            Ok(done) => done,
            Err(err) => {
                warn!("{}: excluded from corpus: {}", input.id, err);
                (
                    DocumentAnalysis::failed(&input.id, err.to_string()),
                    Vec::new(),
                )
            }
        }
    }

    fn run_document(
        &self,
        extractor: &dyn RunExtractor,
        input: &DocumentInput,
    ) -> Result<(DocumentAnalysis, Vec<Section>)> {
        let started = Instant::now();
        self.checkpoint(&input.id, started)?;

        let doc = extractor.extract_runs(&input.id, &input.bytes)?;
        if doc.is_empty() {
            return Err(Error::Extraction {
                document_id: input.id.clone(),
                reason: "no text layer".to_string(),
            });
        }
        self.checkpoint(&input.id, started)?;

        let outline = self.cache.get_or_compute(&input.bytes, || {
            let detector = HeadingDetector::new(&self.options);
            let candidates = detector.detect(&doc);
            let fallback = detector.fallback_title(&doc);
            OutlineBuilder::new().build(
                candidates,
                fallback.as_deref(),
                &input.id,
                doc.page_count,
            )
        })?;
        self.checkpoint(&input.id, started)?;

        let sections = SectionSegmenter::new(&self.options).segment(&input.id, &doc, &outline);
        info!(
            "{}: {} outline nodes, {} sections",
            input.id,
            outline.total_nodes(),
            sections.len()
        );

        Ok((DocumentAnalysis::from_outline(&input.id, &outline), sections))
    }

    /// Stage boundary check: cancellation first, then the soft timeout.
    fn checkpoint(&self, document_id: &str, started: Instant) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let elapsed = started.elapsed();
        if elapsed > self.options.soft_timeout {
            return Err(Error::Timeout(
                document_id.to_string(),
                elapsed.as_millis() as u64,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ExtractedDocument;
    use crate::model::TextRun;
    use std::collections::HashMap;
    use std::time::Duration;

    /// Extractor serving canned runs keyed by document id.
    struct StubExtractor {
        docs: HashMap<String, ExtractedDocument>,
        delay: Option<Duration>,
    }

    impl StubExtractor {
        fn new() -> Self {
            Self {
                docs: HashMap::new(),
                delay: None,
            }
        }

        fn with(mut self, id: &str, doc: ExtractedDocument) -> Self {
            self.docs.insert(id.to_string(), doc);
            self
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }
    }

    impl RunExtractor for StubExtractor {
        fn extract_runs(&self, document_id: &str, _bytes: &[u8]) -> Result<ExtractedDocument> {
            if let Some(delay) = self.delay {
                std::thread::sleep(delay);
            }
            self.docs.get(document_id).cloned().ok_or_else(|| {
                Error::Extraction {
                    document_id: document_id.to_string(),
                    reason: "unreadable".to_string(),
                }
            })
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn heading(text: &str, page: u32, order: usize) -> TextRun {
        TextRun::new(text, page, 18.0, order).bold()
    }

    fn body(text: &str, page: u32, order: usize) -> TextRun {
        let padded = format!(
            "{} with enough additional narrative words to pass the minimum \
             section token threshold without any trouble at all here",
            text
        );
        TextRun::new(&padded, page, 12.0, order)
    }

    fn sample_doc() -> ExtractedDocument {
        ExtractedDocument::from_runs(vec![
            heading("1. Introduction", 1, 0),
            body("financial risk overview", 1, 1),
            heading("2. Methods", 2, 2),
            body("travel and catering notes", 2, 3),
            body("closing remarks", 2, 4),
        ])
    }

    #[test]
    fn test_batch_with_query() {
        let extractor = StubExtractor::new().with("report.pdf", sample_doc());
        let pipeline = Pipeline::new(AnalyzeOptions::default());
        let inputs = [DocumentInput::new("report.pdf", b"report-bytes".to_vec())];
        let query = PersonaQuery::new("Research Analyst", "summarize financial risk");

        let report = pipeline
            .analyze(&extractor, &inputs, Some(&query))
            .unwrap();

        assert_eq!(report.documents.len(), 1);
        assert!(report.documents[0].is_ok());
        assert_eq!(report.documents[0].outline.len(), 2);

        let relevance = report.relevance.unwrap();
        assert_eq!(relevance.persona, "Research Analyst");
        assert!(!relevance.sections.is_empty());
        assert_eq!(relevance.sections[0].document_id, "report.pdf");
    }

    #[test]
    fn test_failed_document_is_isolated() {
        let extractor = StubExtractor::new().with("good.pdf", sample_doc());
        let pipeline = Pipeline::new(AnalyzeOptions::default());
        let inputs = [
            DocumentInput::new("good.pdf", b"good".to_vec()),
            DocumentInput::new("missing.pdf", b"missing".to_vec()),
        ];

        let report = pipeline.analyze(&extractor, &inputs, None).unwrap();

        assert_eq!(report.documents.len(), 2);
        assert!(report.documents[0].is_ok());
        assert!(!report.documents[1].is_ok());
        assert!(report.relevance.is_none());
    }

    #[test]
    fn test_output_preserves_input_order() {
        let extractor = StubExtractor::new()
            .with("a.pdf", sample_doc())
            .with("b.pdf", sample_doc())
            .with("c.pdf", sample_doc());
        let pipeline = Pipeline::new(AnalyzeOptions::default().with_workers(3));
        let inputs = [
            DocumentInput::new("a.pdf", b"a".to_vec()),
            DocumentInput::new("b.pdf", b"b".to_vec()),
            DocumentInput::new("c.pdf", b"c".to_vec()),
        ];

        let report = pipeline.analyze(&extractor, &inputs, None).unwrap();
        let ids: Vec<&str> = report
            .documents
            .iter()
            .map(|d| d.document_id.as_str())
            .collect();
        assert_eq!(ids, vec!["a.pdf", "b.pdf", "c.pdf"]);
    }

    #[test]
    fn test_empty_document_excluded() {
        let extractor = StubExtractor::new()
            .with("empty.pdf", ExtractedDocument::from_runs(vec![]));
        let pipeline = Pipeline::new(AnalyzeOptions::default());
        let inputs = [DocumentInput::new("empty.pdf", b"empty".to_vec())];

        let report = pipeline.analyze(&extractor, &inputs, None).unwrap();
        assert!(!report.documents[0].is_ok());
    }

    #[test]
    fn test_empty_corpus_yields_empty_relevance() {
        let extractor = StubExtractor::new();
        let pipeline = Pipeline::new(AnalyzeOptions::default());
        let inputs = [DocumentInput::new("missing.pdf", b"x".to_vec())];
        let query = PersonaQuery::new("Analyst", "anything");

        let report = pipeline
            .analyze(&extractor, &inputs, Some(&query))
            .unwrap();
        assert!(report.relevance.unwrap().sections.is_empty());
    }

    #[test]
    fn test_cancellation_aborts_run() {
        let extractor = StubExtractor::new().with("report.pdf", sample_doc());
        let pipeline = Pipeline::new(AnalyzeOptions::default());
        pipeline.cancel_token().cancel();

        let inputs = [DocumentInput::new("report.pdf", b"x".to_vec())];
        let result = pipeline.analyze(&extractor, &inputs, None);
        assert!(matches!(result, Err(Error::Cancelled)));
    }

    #[test]
    fn test_soft_timeout_marks_document_failed() {
        let extractor = StubExtractor::new()
            .with("slow.pdf", sample_doc())
            .with_delay(Duration::from_millis(20));
        let options = AnalyzeOptions::default().with_soft_timeout(Duration::from_millis(1));
        let pipeline = Pipeline::new(options);

        let inputs = [DocumentInput::new("slow.pdf", b"slow".to_vec())];
        let report = pipeline.analyze(&extractor, &inputs, None).unwrap();

        assert!(!report.documents[0].is_ok());
        let message = report.documents[0].error.as_deref().unwrap_or_default();
        assert!(message.contains("timed out"));
    }

    #[test]
    fn test_repeated_analyze_hits_cache() {
        let extractor = StubExtractor::new().with("report.pdf", sample_doc());
        let pipeline = Pipeline::new(AnalyzeOptions::default());
        let inputs = [DocumentInput::new("report.pdf", b"report-bytes".to_vec())];

        pipeline.analyze(&extractor, &inputs, None).unwrap();
        assert_eq!(pipeline.cache().len(), 1);

        let report = pipeline.analyze(&extractor, &inputs, None).unwrap();
        assert!(report.documents[0].is_ok());
        assert_eq!(pipeline.cache().len(), 1);
    }
}
