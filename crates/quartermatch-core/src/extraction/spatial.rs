use crate::extraction::{BBox, TextFragment};
use crate::parsing::numeric::is_numeric_token;

/// Default vertical slack, in PDF units, between a label and its values.
pub const DEFAULT_ROW_TOLERANCE: f32 = 6.0;

/// Groups value words into the table row of a label.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowCorrelator {
    tolerance: f32,
}

impl RowCorrelator {
    pub fn new(tolerance: f32) -> Self {
        RowCorrelator { tolerance }
    }

    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    /// Numeric words on the label's row, in reading order.
    ///
    /// A word belongs to the row when it straddles the label's vertical
    /// midline and both its top and bottom edges lie within the tolerance of
    /// the label's. Words starting inside the label's own x-span are part of
    /// the label and are skipped. An empty result means the row has no values.
    pub fn correlate<'a>(&self, label: &BBox, words: &'a [TextFragment]) -> Vec<&'a TextFragment> {
        let mid = label.mid_y();

        let mut row: Vec<&TextFragment> = words
            .iter()
            .filter(|w| w.bbox.y0 < mid && mid < w.bbox.y1)
            .filter(|w| {
                (w.bbox.y0 - label.y0).abs() <= self.tolerance
                    && (w.bbox.y1 - label.y1).abs() <= self.tolerance
            })
            .filter(|w| !(label.x0 < w.bbox.x0 && w.bbox.x0 < label.x1))
            .filter(|w| is_numeric_token(&w.text))
            .collect();

        row.sort_by(|a, b| a.bbox.reading_order(&b.bbox));
        row
    }
}

impl Default for RowCorrelator {
    fn default() -> Self {
        Self::new(DEFAULT_ROW_TOLERANCE)
    }
}
