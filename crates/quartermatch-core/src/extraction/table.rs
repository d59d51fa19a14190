use std::collections::BTreeMap;

use crate::config::schema::ExtractionConfig;
use crate::error::QuartermatchError;
use crate::extraction::pdf_table::PdfTableExtractor;
use crate::extraction::sheet_table::SheetTableExtractor;
use crate::extraction::spatial::RowCorrelator;
use crate::extraction::{Document, MetricSource};
use crate::model::MetricExtractionResult;
use crate::parsing::fuzzy::LabelMatcher;

/// Rule-based extraction: fuzzy label search plus positional value lookup,
/// dispatching to the PDF or spreadsheet variant by document kind.
#[derive(Debug, Clone)]
pub struct TableExtractor {
    metrics: Vec<String>,
    known_columns: Vec<String>,
    column_quarters: BTreeMap<usize, String>,
    pdf: PdfTableExtractor,
    sheet: SheetTableExtractor,
}

impl TableExtractor {
    pub fn from_config(config: &ExtractionConfig) -> Self {
        let matcher = LabelMatcher::new(config.match_threshold);
        TableExtractor {
            metrics: config.metrics.clone(),
            known_columns: config.pdf.known_columns.clone(),
            column_quarters: config.spreadsheet.column_quarters.clone(),
            pdf: PdfTableExtractor::new(
                matcher,
                RowCorrelator::new(config.pdf.row_tolerance),
                config.label_selection,
            ),
            sheet: SheetTableExtractor::new(matcher, config.label_selection),
        }
    }
}

impl MetricSource for TableExtractor {
    fn extract(&self, document: &Document) -> Result<MetricExtractionResult, QuartermatchError> {
        let result = match document {
            Document::Pdf(page) => self.pdf.extract(page, &self.metrics, &self.known_columns),
            Document::Spreadsheet(rows) => {
                self.sheet.extract(rows, &self.metrics, &self.column_quarters)
            }
        };
        Ok(result)
    }

    fn strategy_name(&self) -> &str {
        "table"
    }
}
