pub mod config;
pub mod error;
pub mod extraction;
pub mod model;
pub mod parsing;
pub mod reconcile;

use std::path::Path;

use config::schema::ExtractionConfig;
use error::QuartermatchError;
use extraction::table::TableExtractor;
use extraction::{Document, MetricSource, PdfExtractor};
use model::{MatchReport, MetricExtractionResult};

/// Source document formats, detected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Xlsx,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Result<DocumentKind, QuartermatchError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("pdf") => Ok(DocumentKind::Pdf),
            Some("xlsx") => Ok(DocumentKind::Xlsx),
            _ => Err(QuartermatchError::UnsupportedInput(path.display().to_string())),
        }
    }
}

/// Load the configured page of a PDF report.
pub fn load_pdf(
    pdf_bytes: &[u8],
    extractor: &dyn PdfExtractor,
    config: &ExtractionConfig,
) -> Result<Document, QuartermatchError> {
    tracing::debug!(backend = extractor.backend_name(), page = config.pdf.page, "loading PDF page");
    let page = extractor.extract_page(pdf_bytes, config.pdf.page)?;
    Ok(Document::Pdf(page))
}

/// Load the configured worksheet of an xlsx supplement.
pub fn load_xlsx(bytes: &[u8], config: &ExtractionConfig) -> Result<Document, QuartermatchError> {
    let rows = extraction::xlsx::read_sheet_rows(bytes, &config.spreadsheet.sheet)?;
    Ok(Document::Spreadsheet(rows))
}

/// Main API entry point for a PDF report: load the page and run table
/// extraction.
pub fn extract_pdf_metrics(
    pdf_bytes: &[u8],
    extractor: &dyn PdfExtractor,
    config: &ExtractionConfig,
) -> Result<MetricExtractionResult, QuartermatchError> {
    let document = load_pdf(pdf_bytes, extractor, config)?;
    TableExtractor::from_config(config).extract(&document)
}

/// Main API entry point for a spreadsheet: load the sheet and run table
/// extraction.
pub fn extract_xlsx_metrics(
    bytes: &[u8],
    config: &ExtractionConfig,
) -> Result<MetricExtractionResult, QuartermatchError> {
    let document = load_xlsx(bytes, config)?;
    TableExtractor::from_config(config).extract(&document)
}

/// Run one extraction strategy over both documents and compare the results
/// for the configured report quarters.
pub fn reconcile_documents(
    pdf: &Document,
    excel: &Document,
    source: &dyn MetricSource,
    config: &ExtractionConfig,
) -> Result<MatchReport, QuartermatchError> {
    let pdf_metrics = source.extract(pdf)?;
    let excel_metrics = source.extract(excel)?;

    tracing::info!(
        strategy = source.strategy_name(),
        pdf_metrics = pdf_metrics.len(),
        excel_metrics = excel_metrics.len(),
        "extraction finished"
    );

    let report = reconcile::reconcile(
        pdf.kind(),
        &pdf_metrics,
        excel.kind(),
        &excel_metrics,
        &config.report_quarters,
    )?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_kind_from_extension() {
        assert_eq!(DocumentKind::from_path(Path::new("a/2024pr.PDF")).unwrap(), DocumentKind::Pdf);
        assert_eq!(DocumentKind::from_path(Path::new("3Q24.xlsx")).unwrap(), DocumentKind::Xlsx);
        assert!(DocumentKind::from_path(Path::new("notes.txt")).is_err());
        assert!(DocumentKind::from_path(Path::new("README")).is_err());
    }
}
