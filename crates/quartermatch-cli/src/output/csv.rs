use quartermatch_core::error::QuartermatchError;
use quartermatch_core::model::{MatchReport, RawValue};
use std::io;
use std::path::Path;

/// Write a reconciliation report as CSV.
///
/// Columns: `metric_name`, then `<source>_extraction_<quarter>` for both
/// sources per quarter, then one `<quarter>_match` column per quarter.
pub fn write_report(report: &MatchReport, path: &Path) -> Result<(), QuartermatchError> {
    let mut writer = csv::Writer::from_path(path).map_err(io::Error::from)?;
    write_records(&mut writer, report).map_err(io::Error::from)?;
    writer.flush()?;
    Ok(())
}

fn write_records<W: io::Write>(
    writer: &mut csv::Writer<W>,
    report: &MatchReport,
) -> Result<(), csv::Error> {
    let slugs: Vec<String> = report.quarters.iter().map(|q| quarter_slug(q)).collect();

    let mut header = vec!["metric_name".to_string()];
    for slug in &slugs {
        header.push(format!("{}_extraction_{}", report.left_source, slug));
        header.push(format!("{}_extraction_{}", report.right_source, slug));
    }
    for slug in &slugs {
        header.push(format!("{slug}_match"));
    }
    writer.write_record(&header)?;

    for row in &report.rows {
        let mut record = vec![row.metric.clone()];
        for quarter in &report.quarters {
            let comparison = row.comparison(quarter);
            record.push(cell(comparison.and_then(|c| c.left.as_ref())));
            record.push(cell(comparison.and_then(|c| c.right.as_ref())));
        }
        for quarter in &report.quarters {
            let matched = row.comparison(quarter).is_some_and(|c| c.matched);
            record.push(if matched { "True" } else { "False" }.to_string());
        }
        writer.write_record(&record)?;
    }

    Ok(())
}

fn cell(value: Option<&RawValue>) -> String {
    value.map(RawValue::to_string).unwrap_or_default()
}

/// Column-safe quarter name: `2Q'24` becomes `Q2_24`; anything else has
/// non-alphanumeric characters replaced by `_`.
pub fn quarter_slug(quarter: &str) -> String {
    if let Some((number, year)) = quarter.split_once("Q'") {
        let is_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
        if number.len() == 1 && is_digits(number) && is_digits(year) {
            return format!("Q{number}_{year}");
        }
    }
    quarter
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
