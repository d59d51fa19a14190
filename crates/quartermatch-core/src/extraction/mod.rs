pub mod llm;
pub mod pdf_table;
pub mod pdftotext;
pub mod sheet_table;
pub mod spatial;
pub mod table;
pub mod xlsx;

use crate::error::QuartermatchError;
use crate::model::{MetricExtractionResult, RawValue};
use rust_decimal::Decimal;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        BBox { x0, y0, x1, y1 }
    }

    pub fn mid_y(&self) -> f32 {
        (self.y0 + self.y1) / 2.0
    }

    /// Reading order: top to bottom, then left to right.
    pub fn reading_order(&self, other: &BBox) -> Ordering {
        self.y0
            .total_cmp(&other.y0)
            .then_with(|| self.x0.total_cmp(&other.x0))
    }
}

/// Which pdftotext element a fragment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentLayer {
    /// Paragraph-level block, searched for metric labels.
    Block,
    /// Single word, searched for values.
    Word,
}

/// A positioned piece of text on a PDF page.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFragment {
    pub bbox: BBox,
    pub text: String,
    pub layer: FragmentLayer,
}

impl TextFragment {
    pub fn block(bbox: BBox, text: impl Into<String>) -> Self {
        TextFragment {
            bbox,
            text: text.into(),
            layer: FragmentLayer::Block,
        }
    }

    pub fn word(bbox: BBox, text: impl Into<String>) -> Self {
        TextFragment {
            bbox,
            text: text.into(),
            layer: FragmentLayer::Word,
        }
    }
}

/// Text blocks and words of a single PDF page.
#[derive(Debug, Clone, Default)]
pub struct PageLayout {
    pub page_number: usize,
    pub blocks: Vec<TextFragment>,
    pub words: Vec<TextFragment>,
}

impl PageLayout {
    /// Plain text of the page, one block per line in reading order.
    pub fn plain_text(&self) -> String {
        let mut blocks: Vec<&TextFragment> = self.blocks.iter().collect();
        blocks.sort_by(|a, b| a.bbox.reading_order(&b.bbox));
        blocks
            .iter()
            .map(|b| b.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Trait for PDF text extraction backends.
pub trait PdfExtractor: Send + Sync {
    /// Extract blocks and words of one page (1-indexed) from PDF bytes.
    fn extract_page(&self, pdf_bytes: &[u8], page_number: usize)
        -> Result<PageLayout, QuartermatchError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// A spreadsheet cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Empty,
}

impl Cell {
    /// Empty cells and whitespace-only text count as absent.
    pub fn is_absent(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn to_raw_value(&self) -> RawValue {
        match self {
            Cell::Text(s) => RawValue::Text(s.clone()),
            Cell::Int(i) => RawValue::Number(Decimal::from(*i)),
            Cell::Float(f) => match f64_to_decimal(*f) {
                Some(d) => RawValue::Number(d),
                None => RawValue::Text(f.to_string()),
            },
            Cell::Bool(b) => RawValue::Text(b.to_string()),
            Cell::Empty => RawValue::Text(String::new()),
        }
    }
}

/// One sheet row, cells in column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpreadsheetRow {
    pub cells: Vec<Cell>,
}

impl SpreadsheetRow {
    pub fn new(cells: Vec<Cell>) -> Self {
        SpreadsheetRow { cells }
    }

    /// The row with absent cells removed. Column offsets index into this.
    pub fn compacted(&self) -> Vec<&Cell> {
        self.cells.iter().filter(|c| !c.is_absent()).collect()
    }

    /// Present cells rendered as text.
    pub fn present_text(&self) -> impl Iterator<Item = String> + '_ {
        self.compacted().into_iter().map(|c| c.to_raw_value().to_string())
    }
}

/// A loaded source document.
#[derive(Debug, Clone)]
pub enum Document {
    Pdf(PageLayout),
    Spreadsheet(Vec<SpreadsheetRow>),
}

impl Document {
    pub fn kind(&self) -> &'static str {
        match self {
            Document::Pdf(_) => "pdf",
            Document::Spreadsheet(_) => "excel",
        }
    }

    /// Plain-text rendering used by text-only strategies.
    pub fn plain_text(&self) -> String {
        match self {
            Document::Pdf(page) => page.plain_text(),
            Document::Spreadsheet(rows) => rows
                .iter()
                .flat_map(|r| r.present_text())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// A strategy that turns a document into metric values.
pub trait MetricSource {
    fn extract(&self, document: &Document) -> Result<MetricExtractionResult, QuartermatchError>;

    /// Name of this strategy (for diagnostics).
    fn strategy_name(&self) -> &str;
}

/// Convert f64 to Decimal, preserving reasonable precision.
///
/// Uses string round-trip to avoid floating-point artifacts
/// (e.g., 0.0035_f64 becoming 0.00349999...). `None` for NaN, infinities
/// and magnitudes outside Decimal's range.
pub fn f64_to_decimal(f: f64) -> Option<Decimal> {
    let s = format!("{f}");
    s.parse::<Decimal>().ok().or_else(|| Decimal::try_from(f).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn f64_to_decimal_preserves_precision() {
        assert_eq!(f64_to_decimal(0.0035), Some(dec!(0.0035)));
        assert_eq!(f64_to_decimal(68.0), Some(dec!(68)));
        assert_eq!(f64_to_decimal(86.59), Some(dec!(86.59)));
    }

    #[test]
    fn test_out_of_range_float_kept_as_text() {
        assert_eq!(f64_to_decimal(1e30), None);
        assert_eq!(f64_to_decimal(f64::NAN), None);

        let value = Cell::Float(1e30).to_raw_value();
        assert!(matches!(value, RawValue::Text(_)));
        assert!(crate::parsing::numeric::normalize_value(&value).is_err());
        assert!(crate::parsing::numeric::normalize_value(&Cell::Float(f64::INFINITY).to_raw_value()).is_err());
    }

    #[test]
    fn test_compacted_skips_absent_cells() {
        let row = SpreadsheetRow::new(vec![
            Cell::Text("Net income".into()),
            Cell::Empty,
            Cell::Text("   ".into()),
            Cell::Int(100),
            Cell::Float(0.5),
        ]);
        let compacted = row.compacted();
        assert_eq!(compacted.len(), 3);
        assert_eq!(compacted[1], &Cell::Int(100));
    }

    #[test]
    fn test_reading_order() {
        let a = BBox::new(50.0, 10.0, 60.0, 20.0);
        let b = BBox::new(0.0, 10.0, 10.0, 20.0);
        let c = BBox::new(0.0, 30.0, 10.0, 40.0);
        assert_eq!(b.reading_order(&a), Ordering::Less);
        assert_eq!(c.reading_order(&a), Ordering::Greater);
    }

    #[test]
    fn test_page_plain_text_in_reading_order() {
        let page = PageLayout {
            page_number: 1,
            blocks: vec![
                TextFragment::block(BBox::new(0.0, 50.0, 10.0, 60.0), "second"),
                TextFragment::block(BBox::new(0.0, 10.0, 10.0, 20.0), "first"),
            ],
            words: vec![],
        };
        assert_eq!(page.plain_text(), "first\nsecond");
    }

    #[test]
    fn test_spreadsheet_plain_text() {
        let doc = Document::Spreadsheet(vec![
            SpreadsheetRow::new(vec![Cell::Text("Net income".into()), Cell::Empty, Cell::Int(5)]),
            SpreadsheetRow::new(vec![Cell::Empty]),
            SpreadsheetRow::new(vec![Cell::Text("BVPS".into()), Cell::Float(86.59)]),
        ]);
        assert_eq!(doc.plain_text(), "Net income 5 BVPS 86.59");
    }
}
