use quartermatch_core::model::{MatchReport, MetricExtractionResult, RawValue};
use std::fmt::Write;

/// One line per metric, values in the quarter order they were found.
pub fn format_extraction(result: &MetricExtractionResult) -> String {
    let mut out = String::new();

    let mut quarters: Vec<&str> = Vec::new();
    for (_, values) in result.iter() {
        for quarter in values.keys() {
            if !quarters.contains(&quarter.as_str()) {
                quarters.push(quarter);
            }
        }
    }

    let name_width = result.metric_names().map(str::len).max().unwrap_or(10).max(6);

    let _ = write!(out, "  {:<width$}", "Metric", width = name_width);
    for quarter in &quarters {
        let _ = write!(out, "  {:>10}", quarter);
    }
    out.push('\n');
    let _ = writeln!(out, "  {}", "-".repeat(name_width + quarters.len() * 12));

    for (metric, values) in result.iter() {
        let _ = write!(out, "  {:<width$}", metric, width = name_width);
        for quarter in &quarters {
            let cell = values.get(*quarter).map(RawValue::to_string);
            let _ = write!(out, "  {:>10}", cell.as_deref().unwrap_or("-"));
        }
        out.push('\n');
    }

    if result.is_empty() {
        out.push_str("  (no metrics found)\n");
    }

    out
}

pub fn format_report(report: &MatchReport, strategy: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "=== {} vs {} ({}) ===\n",
        report.left_source, report.right_source, strategy
    );

    for row in &report.rows {
        let _ = writeln!(out, "  {}", row.metric);
        for comparison in &row.quarters {
            let left = comparison.left.as_ref().map(RawValue::to_string);
            let right = comparison.right.as_ref().map(RawValue::to_string);
            let status = if comparison.matched { "ok" } else { "MISMATCH" };
            let _ = writeln!(
                out,
                "    {:<8} {:>12}  {:>12}  {}",
                comparison.quarter,
                left.as_deref().unwrap_or("-"),
                right.as_deref().unwrap_or("-"),
                status
            );
        }
    }

    if report.rows.is_empty() {
        out.push_str("  (no metrics found in both sources)\n");
    }

    let _ = writeln!(
        out,
        "\n  {} metric(s), {} mismatch(es)\n",
        report.rows.len(),
        report.mismatch_count()
    );
    out
}
