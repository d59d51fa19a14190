use indexmap::IndexMap;
use std::collections::BTreeMap;

use crate::config::schema::LabelSelection;
use crate::extraction::{Cell, SpreadsheetRow};
use crate::model::{MetricExtractionResult, MetricKey, QuarterValues};
use crate::parsing::fuzzy::LabelMatcher;

/// Locates metric rows in a worksheet and reads values at fixed offsets.
#[derive(Debug, Clone, Copy, Default)]
pub struct SheetTableExtractor {
    pub matcher: LabelMatcher,
    pub selection: LabelSelection,
}

impl SheetTableExtractor {
    pub fn new(matcher: LabelMatcher, selection: LabelSelection) -> Self {
        SheetTableExtractor { matcher, selection }
    }

    /// Extract metric values from worksheet rows.
    ///
    /// A row is a candidate for a metric when its first present cell is text
    /// that matches the metric name. Offsets in `column_quarters` index the
    /// row after absent cells are removed, so offset 4 is the fifth present
    /// cell. A row whose present cells do not reach the largest offset is
    /// read by literal column instead, for every offset of that row. With
    /// [`LabelSelection::First`] every candidate row contributes,
    /// and the first value written for a metric and quarter is kept.
    ///
    /// Unlike the PDF extractor, every metric is present in the result, with
    /// an empty quarter map when no row matched.
    pub fn extract(
        &self,
        rows: &[SpreadsheetRow],
        metric_names: &[String],
        column_quarters: &BTreeMap<usize, String>,
    ) -> MetricExtractionResult {
        let mut metrics: IndexMap<MetricKey, QuarterValues> = metric_names
            .iter()
            .map(|m| (m.clone(), QuarterValues::new()))
            .collect();

        let compacted: Vec<Vec<&Cell>> = rows.iter().map(|r| r.compacted()).collect();

        match self.selection {
            LabelSelection::First => {
                for (row_idx, (row, cells)) in rows.iter().zip(&compacted).enumerate() {
                    let Some(label) = row_label(cells) else {
                        continue;
                    };
                    for metric in metric_names {
                        let Some(score) = self.matcher.score(label, metric) else {
                            continue;
                        };
                        tracing::debug!(metric = %metric, label, score, row = row_idx, "label row matched");
                        if let Some(quarters) = metrics.get_mut(metric) {
                            fill_quarters(quarters, row, cells, column_quarters);
                        }
                    }
                }
            }
            LabelSelection::BestScore => {
                for metric in metric_names {
                    let best = compacted
                        .iter()
                        .enumerate()
                        .filter_map(|(i, cells)| {
                            let score = self.matcher.score(row_label(cells)?, metric)?;
                            Some((i, score))
                        })
                        .fold(None, |best: Option<(usize, u8)>, (i, score)| match best {
                            Some((_, best_score)) if best_score >= score => best,
                            _ => Some((i, score)),
                        });

                    if let Some((row_idx, score)) = best {
                        tracing::debug!(metric = %metric, score, row = row_idx, "best label row");
                        if let Some(quarters) = metrics.get_mut(metric) {
                            fill_quarters(quarters, &rows[row_idx], &compacted[row_idx], column_quarters);
                        }
                    }
                }
            }
        }

        for (metric, quarters) in &metrics {
            if quarters.is_empty() {
                tracing::warn!(metric = %metric, "no values found in worksheet");
            }
        }

        MetricExtractionResult::new(metrics)
    }
}

fn row_label<'a>(cells: &[&'a Cell]) -> Option<&'a str> {
    cells.first()?.as_text()
}

fn fill_quarters(
    quarters: &mut QuarterValues,
    row: &SpreadsheetRow,
    cells: &[&Cell],
    column_quarters: &BTreeMap<usize, String>,
) {
    let Some(max_offset) = column_quarters.keys().next_back() else {
        return;
    };
    // One indexing rule per row, so a cell never lands in two quarters.
    let literal = cells.len() <= *max_offset;

    for (index, quarter) in column_quarters {
        if quarters.contains_key(quarter) {
            continue;
        }
        let cell = if literal {
            row.cells.get(*index).filter(|c| !c.is_absent())
        } else {
            cells.get(*index).copied()
        };
        if let Some(cell) = cell {
            quarters.insert(quarter.clone(), cell.to_raw_value());
        }
    }
}
