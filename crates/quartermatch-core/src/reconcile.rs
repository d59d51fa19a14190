use crate::error::NormalizationError;
use crate::model::{MatchReport, MatchRow, MetricExtractionResult, QuarterComparison};
use crate::parsing::numeric::compare_values;

/// Inner-join two extractions by metric and compare them quarter by quarter.
///
/// Rows follow the metric order of `left`; metrics missing from either side
/// are dropped. A quarter matches when both values are present and
/// normalize to the same number. A present value that cannot be normalized
/// fails the whole report.
pub fn reconcile(
    left_source: &str,
    left: &MetricExtractionResult,
    right_source: &str,
    right: &MetricExtractionResult,
    quarters: &[String],
) -> Result<MatchReport, NormalizationError> {
    let mut rows = Vec::new();

    for (metric, left_values) in left.iter() {
        let Some(right_values) = right.get(metric) else {
            tracing::debug!(metric = %metric, source = right_source, "metric dropped by join");
            continue;
        };

        let mut comparisons = Vec::with_capacity(quarters.len());
        for quarter in quarters {
            let l = left_values.get(quarter);
            let r = right_values.get(quarter);
            let matched = match (l, r) {
                (Some(a), Some(b)) => compare_values(a, b)?,
                _ => false,
            };
            if !matched {
                tracing::info!(
                    metric = %metric,
                    quarter = %quarter,
                    left = ?l.map(|v| v.to_string()),
                    right = ?r.map(|v| v.to_string()),
                    "values differ"
                );
            }
            comparisons.push(QuarterComparison {
                quarter: quarter.clone(),
                left: l.cloned(),
                right: r.cloned(),
                matched,
            });
        }

        rows.push(MatchRow {
            metric: metric.clone(),
            quarters: comparisons,
        });
    }

    Ok(MatchReport {
        left_source: left_source.to_string(),
        right_source: right_source.to_string(),
        quarters: quarters.to_vec(),
        rows,
    })
}
