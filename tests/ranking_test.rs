//! End-to-end pipeline tests: extraction through persona ranking.

use std::collections::HashMap;

use docrank::{
    AnalyzeOptions, DocumentInput, ExtractedDocument, PersonaQuery, Pipeline, Result,
    RunExtractor, TextRun,
};

/// Extractor serving canned documents keyed by id.
struct CannedExtractor {
    docs: HashMap<String, ExtractedDocument>,
}

impl CannedExtractor {
    fn new() -> Self {
        Self {
            docs: HashMap::new(),
        }
    }

    fn with(mut self, id: &str, doc: ExtractedDocument) -> Self {
        self.docs.insert(id.to_string(), doc);
        self
    }
}

impl RunExtractor for CannedExtractor {
    fn extract_runs(&self, document_id: &str, _bytes: &[u8]) -> Result<ExtractedDocument> {
        self.docs
            .get(document_id)
            .cloned()
            .ok_or_else(|| docrank::Error::Extraction {
                document_id: document_id.to_string(),
                reason: "unreadable".to_string(),
            })
    }

    fn name(&self) -> &str {
        "canned"
    }
}

/// Two-section document: numbered bold headings over 12pt body text.
fn two_section_doc(first: &str, second: &str) -> ExtractedDocument {
    let pad = "plus enough surrounding narrative words that each section \
               comfortably clears the minimum token threshold on its own";
    ExtractedDocument::from_runs(vec![
        TextRun::new("1. Overview", 1, 18.0, 0).bold(),
        TextRun::new(format!("{} {}", first, pad), 1, 12.0, 1),
        TextRun::new("2. Details", 2, 18.0, 2).bold(),
        TextRun::new(format!("{} {}", second, pad), 2, 12.0, 3),
        TextRun::new("Closing remarks paragraph.", 2, 12.0, 4),
    ])
}

fn analyst_query() -> PersonaQuery {
    PersonaQuery::new("Research Analyst", "summarize financial risk")
}

fn inputs(ids: &[&str]) -> Vec<DocumentInput> {
    ids.iter()
        .map(|id| DocumentInput::new(*id, id.as_bytes().to_vec()))
        .collect()
}

#[test]
fn test_relevant_sections_rise_to_the_top() {
    let extractor = CannedExtractor::new()
        .with(
            "finance.pdf",
            two_section_doc(
                "financial risk exposure grew across the portfolio this quarter",
                "risk mitigation requires updated financial models and controls",
            ),
        )
        .with(
            "travel.pdf",
            two_section_doc(
                "coastal cities offer pleasant walking tours and beaches",
                "local restaurants serve seasonal regional cuisine",
            ),
        );

    let pipeline = Pipeline::new(AnalyzeOptions::default());
    let report = pipeline
        .analyze(&extractor, &inputs(&["finance.pdf", "travel.pdf"]), Some(&analyst_query()))
        .unwrap();

    assert!(report.documents.iter().all(|d| d.is_ok()));

    let relevance = report.relevance.unwrap();
    assert_eq!(relevance.persona, "Research Analyst");
    assert!(!relevance.sections.is_empty());
    assert_eq!(relevance.sections[0].document_id, "finance.pdf");
    assert!(relevance.sections[0].matched_terms.contains("risk"));

    // Ranks are sequential from 1 and scores stay in the unit interval.
    for (i, section) in relevance.sections.iter().enumerate() {
        assert_eq!(section.rank, i as u32 + 1);
        assert!((0.0..=1.0).contains(&section.relevance_score));
    }
}

#[test]
fn test_diversity_cap_limits_one_document() {
    // Four highly relevant sections in one document, one elsewhere.
    let dominant = ExtractedDocument::from_runs(vec![
        TextRun::new("1. Alpha", 1, 18.0, 0).bold(),
        TextRun::new(filler("financial risk"), 1, 12.0, 1),
        TextRun::new("2. Beta", 2, 18.0, 2).bold(),
        TextRun::new(filler("financial risk"), 2, 12.0, 3),
        TextRun::new("3. Gamma", 3, 18.0, 4).bold(),
        TextRun::new(filler("financial risk"), 3, 12.0, 5),
        TextRun::new("4. Delta", 4, 18.0, 6).bold(),
        TextRun::new(filler("financial risk"), 4, 12.0, 7),
    ]);
    let extractor = CannedExtractor::new()
        .with("dominant.pdf", dominant)
        .with(
            "other.pdf",
            two_section_doc("risk notes appear here", "unrelated appendix content"),
        );

    let pipeline = Pipeline::new(AnalyzeOptions::default());
    let report = pipeline
        .analyze(&extractor, &inputs(&["dominant.pdf", "other.pdf"]), Some(&analyst_query()))
        .unwrap();

    let relevance = report.relevance.unwrap();
    let dominant_count = relevance
        .sections
        .iter()
        .filter(|s| s.document_id == "dominant.pdf")
        .count();
    assert!(dominant_count <= 2);
    assert!(relevance
        .sections
        .iter()
        .any(|s| s.document_id == "other.pdf"));
}

#[test]
fn test_failed_documents_do_not_poison_ranking() {
    let extractor = CannedExtractor::new().with(
        "good.pdf",
        two_section_doc("financial risk discussion", "appendix material"),
    );

    let pipeline = Pipeline::new(AnalyzeOptions::default());
    let report = pipeline
        .analyze(
            &extractor,
            &inputs(&["good.pdf", "broken.pdf"]),
            Some(&analyst_query()),
        )
        .unwrap();

    assert!(report.documents[0].is_ok());
    assert!(!report.documents[1].is_ok());

    let relevance = report.relevance.unwrap();
    assert!(relevance
        .sections
        .iter()
        .all(|s| s.document_id == "good.pdf"));
}

#[test]
fn test_all_documents_failing_yields_empty_ranking() {
    let extractor = CannedExtractor::new();
    let pipeline = Pipeline::new(AnalyzeOptions::default());
    let report = pipeline
        .analyze(&extractor, &inputs(&["a.pdf", "b.pdf"]), Some(&analyst_query()))
        .unwrap();

    assert!(report.documents.iter().all(|d| !d.is_ok()));
    assert!(report.relevance.unwrap().sections.is_empty());
}

#[test]
fn test_empty_batch() {
    let extractor = CannedExtractor::new();
    let pipeline = Pipeline::new(AnalyzeOptions::default());
    let report = pipeline.analyze(&extractor, &[], Some(&analyst_query())).unwrap();

    assert!(report.documents.is_empty());
    assert!(report.relevance.unwrap().sections.is_empty());
}

#[test]
fn test_report_serializes_to_json() {
    let extractor = CannedExtractor::new().with(
        "report.pdf",
        two_section_doc("financial risk content", "other content"),
    );
    let pipeline = Pipeline::new(AnalyzeOptions::default());
    let report = pipeline
        .analyze(&extractor, &inputs(&["report.pdf"]), Some(&analyst_query()))
        .unwrap();

    let json = report.to_json(true).unwrap();
    assert!(json.contains("\"documents\""));
    assert!(json.contains("\"relevance\""));
    assert!(json.contains("\"heading_path\""));
    assert!(json.contains("report.pdf"));

    // Compact form round-trips through serde.
    let compact = report.to_json(false).unwrap();
    let parsed: docrank::RunReport = serde_json::from_str(&compact).unwrap();
    assert_eq!(parsed.documents.len(), report.documents.len());
}

fn filler(topic: &str) -> String {
    format!(
        "{} {} considerations with enough additional narrative words that the \
         section comfortably clears the minimum token threshold by itself",
        topic, topic
    )
}
