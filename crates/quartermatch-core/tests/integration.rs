//! Integration tests for the extract-and-reconcile pipeline.
//!
//! Uses a MockExtractor that returns a pre-built PageLayout without
//! invoking pdftotext, and a scripted language model, so these tests run
//! without poppler-utils or a model backend.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::Mutex;

use quartermatch_core::config::builtin::load_preset;
use quartermatch_core::error::QuartermatchError;
use quartermatch_core::extraction::llm::{LanguageModel, LlmExtractor};
use quartermatch_core::extraction::table::TableExtractor;
use quartermatch_core::extraction::{
    BBox, Cell, Document, PageLayout, PdfExtractor, SpreadsheetRow, TextFragment,
};
use quartermatch_core::model::RawValue;
use quartermatch_core::parsing::fuzzy::LabelMatcher;
use quartermatch_core::{extract_pdf_metrics, load_pdf, reconcile_documents};
use rust_decimal_macros::dec;

struct MockExtractor {
    page: PageLayout,
    requested: Mutex<Option<usize>>,
}

impl MockExtractor {
    fn new(page: PageLayout) -> Self {
        MockExtractor {
            page,
            requested: Mutex::new(None),
        }
    }
}

impl PdfExtractor for MockExtractor {
    fn extract_page(&self, _pdf_bytes: &[u8], page_number: usize) -> Result<PageLayout, QuartermatchError> {
        if let Ok(mut requested) = self.requested.lock() {
            *requested = Some(page_number);
        }
        Ok(self.page.clone())
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

/// Replays canned completions in call order.
struct ScriptedModel {
    responses: RefCell<VecDeque<String>>,
    prompts: Rc<RefCell<Vec<String>>>,
}

impl ScriptedModel {
    fn new(responses: &[&str]) -> Self {
        ScriptedModel {
            responses: RefCell::new(responses.iter().map(|s| s.to_string()).collect()),
            prompts: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

impl LanguageModel for ScriptedModel {
    fn complete(&self, prompt: &str) -> Result<String, QuartermatchError> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| QuartermatchError::Llm("script exhausted".into()))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

fn label_row(y: f32, label: &str, values: &[&str]) -> (TextFragment, Vec<TextFragment>) {
    let block = TextFragment::block(BBox::new(40.0, y, 250.0, y + 10.0), label);
    let words = values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let x0 = 300.0 + 60.0 * i as f32;
            TextFragment::word(BBox::new(x0, y, x0 + 40.0, y + 10.0), *v)
        })
        .collect();
    (block, words)
}

/// Financial summary page: header row, then one row per metric with values
/// for 3Q'24, 2Q'24, 3Q'23, QoQ% and YoY%.
fn summary_page() -> PageLayout {
    let rows = [
        label_row(100.0, "Total revenues, net of interest expense", &["20,315", "20,139", "19,471", "1%", "4%"]),
        label_row(120.0, "Citigroup's net income", &["$3,238", "$3,217", "$3,546", "1%", "(9)%"]),
        label_row(140.0, "Book value per share", &["$101.91", "$99.70", "$99.28", "2%", "3%"]),
        label_row(160.0, "Tangible book value per share", &["$89.67", "$87.53", "$86.90", "2%", "3%"]),
        label_row(180.0, "Common Equity Tier 1 (CET1) Capital ratio(1)", &["13.7%", "13.6%", "13.5%"]),
    ];

    let mut blocks = vec![TextFragment::block(
        BBox::new(300.0, 80.0, 580.0, 90.0),
        "3Q'24 2Q'24 3Q'23 QoQ% YoY%",
    )];
    let mut words = vec![
        TextFragment::word(BBox::new(300.0, 80.0, 340.0, 90.0), "3Q'24"),
        TextFragment::word(BBox::new(360.0, 80.0, 400.0, 90.0), "2Q'24"),
    ];
    // Footnote digit inside the CET1 label span.
    words.push(TextFragment::word(BBox::new(230.0, 180.0, 235.0, 190.0), "1"));
    for (block, row_words) in rows {
        blocks.push(block);
        words.extend(row_words);
    }

    PageLayout {
        page_number: 2,
        blocks,
        words,
    }
}

fn text(s: &str) -> Cell {
    Cell::Text(s.to_string())
}

fn summary_sheet() -> Vec<SpreadsheetRow> {
    vec![
        SpreadsheetRow::new(vec![
            Cell::Empty,
            text("3Q'23"),
            text("4Q'23"),
            text("1Q'24"),
            text("2Q'24"),
            text("3Q'24"),
        ]),
        SpreadsheetRow::new(vec![
            text("Total revenues, net of interest expense"),
            Cell::Int(19471),
            Cell::Int(17440),
            Cell::Int(21104),
            Cell::Int(20139),
            Cell::Int(20315),
        ]),
        SpreadsheetRow::new(vec![
            text("Citigroup's net income"),
            Cell::Empty,
            Cell::Int(3546),
            Cell::Int(-1839),
            Cell::Int(3371),
            Cell::Int(3217),
            Cell::Int(3238),
        ]),
        SpreadsheetRow::new(vec![
            text("Book value per share"),
            Cell::Float(99.28),
            Cell::Float(98.71),
            Cell::Float(99.08),
            Cell::Float(99.70),
            Cell::Float(101.91),
        ]),
        SpreadsheetRow::new(vec![
            text("Tangible book value per share"),
            Cell::Float(86.90),
            Cell::Float(86.19),
            Cell::Float(86.67),
            Cell::Float(87.53),
            Cell::Float(89.76),
        ]),
        SpreadsheetRow::new(vec![
            text("Common Equity Tier 1 (CET1) Capital ratio"),
            Cell::Float(13.5),
            Cell::Float(13.4),
            Cell::Float(13.6),
            Cell::Float(13.6),
            Cell::Float(13.7),
        ]),
    ]
}

// ---------------------------------------------------------------------------
// Test 1: PDF page loaded through the extractor trait, configured page used
// ---------------------------------------------------------------------------
#[test]
fn pdf_metrics_from_configured_page() {
    let config = load_preset("citi-3q24").unwrap();
    let extractor = MockExtractor::new(summary_page());

    let result = extract_pdf_metrics(&[], &extractor, &config).unwrap();

    assert_eq!(*extractor.requested.lock().unwrap(), Some(config.pdf.page));
    assert_eq!(result.len(), 5);
    assert_eq!(
        result.value("Citigroup's net income", "3Q'24"),
        Some(&RawValue::from("$3,238"))
    );
    // "(9)%" is not a numeric token, so YoY% is left out.
    let net_income = result.get("Citigroup's net income").unwrap();
    assert_eq!(net_income.len(), 4);
    assert!(!net_income.contains_key("YoY%"));
    // The footnote digit inside the label is not taken as the first value.
    assert_eq!(
        result.value("Common Equity Tier 1 (CET1) Capital ratio", "3Q'24"),
        Some(&RawValue::from("13.7%"))
    );
    assert_eq!(
        result.value("Tangible book value per share", "2Q'24"),
        Some(&RawValue::from("$87.53"))
    );
}

// ---------------------------------------------------------------------------
// Test 2: Table strategy over both sources, one deliberate mismatch
// ---------------------------------------------------------------------------
#[test]
fn table_reconcile_pdf_against_sheet() {
    let config = load_preset("citi-3q24").unwrap();
    let extractor = MockExtractor::new(summary_page());
    let pdf = load_pdf(&[], &extractor, &config).unwrap();
    let sheet = Document::Spreadsheet(summary_sheet());

    let report = reconcile_documents(&pdf, &sheet, &TableExtractor::from_config(&config), &config).unwrap();

    assert_eq!(report.left_source, "pdf");
    assert_eq!(report.right_source, "excel");
    assert_eq!(report.rows.len(), 5);

    let metrics: Vec<&str> = report.rows.iter().map(|r| r.metric.as_str()).collect();
    assert_eq!(metrics, config.metrics.iter().map(|s| s.as_str()).collect::<Vec<_>>());

    assert!(report.row("Total revenues, net of interest expense").unwrap().all_matched());
    assert!(report.row("Citigroup's net income").unwrap().all_matched());
    assert!(report.row("Book value per share").unwrap().all_matched());
    assert!(report.row("Common Equity Tier 1 (CET1) Capital ratio").unwrap().all_matched());

    let tbvps = report.row("Tangible book value per share").unwrap();
    assert!(tbvps.comparison("2Q'24").unwrap().matched);
    let q3 = tbvps.comparison("3Q'24").unwrap();
    assert!(!q3.matched);
    assert_eq!(q3.left, Some(RawValue::from("$89.67")));
    assert_eq!(q3.right, Some(RawValue::Number(dec!(89.76))));

    assert_eq!(report.mismatch_count(), 1);
}

// ---------------------------------------------------------------------------
// Test 3: Metric missing from the PDF is dropped by the join
// ---------------------------------------------------------------------------
#[test]
fn metric_missing_from_pdf_is_dropped() {
    let config = load_preset("citi-3q24").unwrap();
    let mut page = summary_page();
    page.blocks.retain(|b| b.text != "Book value per share");
    let pdf = Document::Pdf(page);
    let sheet = Document::Spreadsheet(summary_sheet());

    let report = reconcile_documents(&pdf, &sheet, &TableExtractor::from_config(&config), &config).unwrap();

    assert_eq!(report.rows.len(), 4);
    assert!(report.row("Book value per share").is_none());
    assert!(report.row("Tangible book value per share").is_some());
}

// ---------------------------------------------------------------------------
// Test 4: Metric missing from the sheet yields unmatched quarters
// ---------------------------------------------------------------------------
#[test]
fn metric_missing_from_sheet_is_unmatched() {
    let config = load_preset("citi-3q24").unwrap();
    let pdf = Document::Pdf(summary_page());
    let mut rows = summary_sheet();
    rows.retain(|r| r.cells.first() != Some(&text("Citigroup's net income")));
    let sheet = Document::Spreadsheet(rows);

    let report = reconcile_documents(&pdf, &sheet, &TableExtractor::from_config(&config), &config).unwrap();

    // The sheet result keeps the metric with no values, so the row survives.
    let row = report.row("Citigroup's net income").unwrap();
    assert!(row.quarters.iter().all(|q| !q.matched && q.right.is_none()));
    assert_eq!(report.mismatch_count(), 3);
}

// ---------------------------------------------------------------------------
// Test 5: LLM strategy behind the same interface
// ---------------------------------------------------------------------------
#[test]
fn llm_reconcile_with_scripted_model() {
    let config = load_preset("citi-3q24").unwrap();
    let model = ScriptedModel::new(&[
        r#"```json
{"2Q'24": {"Book value per share": "$99.70", "Citigroup's net income": "3,217"},
 "3Q'24": {"Book value per share": "$101.91", "Citigroup's net income": "3,238"}}
```"#,
        r#"{"2Q'24": {"Book value per share": 99.7, "Citigroup's net income": 3217},
 "3Q'24": {"Book value per share": 101.91, "Citigroup's net income": 3283}}"#,
    ]);
    let strategy = LlmExtractor::new(
        model,
        config.metrics.clone(),
        config.report_quarters.clone(),
        LabelMatcher::new(config.match_threshold),
    );

    let pdf = Document::Pdf(summary_page());
    let sheet = Document::Spreadsheet(summary_sheet());
    let report = reconcile_documents(&pdf, &sheet, &strategy, &config).unwrap();

    assert_eq!(report.rows.len(), 2);
    assert!(report.row("Book value per share").unwrap().all_matched());
    let net_income = report.row("Citigroup's net income").unwrap();
    assert!(net_income.comparison("2Q'24").unwrap().matched);
    assert!(!net_income.comparison("3Q'24").unwrap().matched);
}

#[test]
fn llm_prompt_carries_document_text() {
    let config = load_preset("citi-3q24").unwrap();
    let model = ScriptedModel::new(&["{}"]);
    let prompts = Rc::clone(&model.prompts);
    let strategy = LlmExtractor::new(
        model,
        config.metrics.clone(),
        config.report_quarters.clone(),
        LabelMatcher::default(),
    );

    let sheet = Document::Spreadsheet(summary_sheet());
    let result = quartermatch_core::extraction::MetricSource::extract(&strategy, &sheet).unwrap();
    assert!(result.is_empty());

    let prompts = prompts.borrow();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("for 2Q'24 and 3Q'24"));
    assert!(prompts[0].contains("Book value per share 99.28 98.71 99.08 99.7 101.91"));
}

// ---------------------------------------------------------------------------
// Test 6: Unparseable value aborts the report
// ---------------------------------------------------------------------------
#[test]
fn unparseable_value_is_an_error() {
    let config = load_preset("citi-3q24").unwrap();
    let pdf = Document::Pdf(summary_page());
    let mut rows = summary_sheet();
    rows[3].cells[4] = text("n/a");
    let sheet = Document::Spreadsheet(rows);

    let err = reconcile_documents(&pdf, &sheet, &TableExtractor::from_config(&config), &config).unwrap_err();

    match err {
        QuartermatchError::Normalization(e) => assert_eq!(e.raw, "n/a"),
        other => panic!("expected normalization error, got {other:?}"),
    }
}

#[test]
fn invalid_xlsx_bytes_rejected() {
    let config = load_preset("citi-3q24").unwrap();
    let err = quartermatch_core::extract_xlsx_metrics(b"not a workbook", &config).unwrap_err();
    assert!(matches!(err, QuartermatchError::Spreadsheet(_)));
}
