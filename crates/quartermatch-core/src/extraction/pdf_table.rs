use crate::config::schema::LabelSelection;
use crate::extraction::spatial::RowCorrelator;
use crate::extraction::{PageLayout, TextFragment};
use crate::model::{MetricExtractionResult, QuarterValues, RawValue};
use crate::parsing::fuzzy::LabelMatcher;

/// Locates metric rows on a PDF page and reads their values by position.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTableExtractor {
    pub matcher: LabelMatcher,
    pub correlator: RowCorrelator,
    pub selection: LabelSelection,
}

impl PdfTableExtractor {
    pub fn new(matcher: LabelMatcher, correlator: RowCorrelator, selection: LabelSelection) -> Self {
        PdfTableExtractor {
            matcher,
            correlator,
            selection,
        }
    }

    /// Extract metric values from one page.
    ///
    /// For each metric, the label block is chosen among blocks in reading
    /// order (see [`LabelSelection`]). The numeric words on its row are
    /// assigned to `known_columns` by position: the first value to the first
    /// column, and so on. Columns beyond the last value are left out, and a
    /// metric whose label is not on the page is absent from the result.
    ///
    /// Values are never matched against the column header text, so a source
    /// whose columns are reordered relative to `known_columns` yields
    /// mislabeled quarters.
    pub fn extract(
        &self,
        page: &PageLayout,
        metric_names: &[String],
        known_columns: &[String],
    ) -> MetricExtractionResult {
        let mut blocks: Vec<&TextFragment> = page.blocks.iter().collect();
        blocks.sort_by(|a, b| a.bbox.reading_order(&b.bbox));

        let mut words = page.words.clone();
        words.sort_by(|a, b| a.bbox.reading_order(&b.bbox));

        let mut metrics = Vec::new();
        for metric in metric_names {
            let Some((label, score)) = self.select_label(&blocks, metric) else {
                tracing::warn!(metric = %metric, page = page.page_number, "no matching label block");
                continue;
            };

            let values = self.correlator.correlate(&label.bbox, &words);
            tracing::debug!(
                metric = %metric,
                label = %label.text,
                score,
                values = values.len(),
                "label block matched"
            );

            let quarters: QuarterValues = known_columns
                .iter()
                .zip(values)
                .map(|(column, word)| (column.clone(), RawValue::Text(word.text.clone())))
                .collect();

            metrics.push((metric.clone(), quarters));
        }

        metrics.into_iter().collect()
    }

    fn select_label<'a>(
        &self,
        blocks: &[&'a TextFragment],
        metric: &str,
    ) -> Option<(&'a TextFragment, u8)> {
        let mut scored = blocks
            .iter()
            .filter_map(|b| self.matcher.score(&b.text, metric).map(|s| (*b, s)));

        match self.selection {
            LabelSelection::First => scored.next(),
            LabelSelection::BestScore => scored.fold(None, |best, (block, score)| match best {
                Some((_, best_score)) if best_score >= score => best,
                _ => Some((block, score)),
            }),
        }
    }
}
