pub mod builtin;
pub mod schema;

use crate::error::QuartermatchError;
use schema::ExtractionConfig;
use std::collections::HashSet;
use std::path::Path;

/// Load an extraction config from a JSON file.
pub fn load_config(path: &Path) -> Result<ExtractionConfig, QuartermatchError> {
    let content = std::fs::read_to_string(path).map_err(|e| QuartermatchError::ConfigLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    parse_config(&content, path)
}

/// Parse an extraction config from a JSON string.
pub fn parse_config(json: &str, source: &Path) -> Result<ExtractionConfig, QuartermatchError> {
    let config: ExtractionConfig =
        serde_json::from_str(json).map_err(|e| QuartermatchError::ConfigLoad {
            path: source.to_path_buf(),
            reason: e.to_string(),
        })?;
    validate_config(&config)?;
    Ok(config)
}

/// Parse an extraction config from a JSON string (no file path context).
pub fn parse_config_str(json: &str) -> Result<ExtractionConfig, QuartermatchError> {
    let config: ExtractionConfig = serde_json::from_str(json).map_err(QuartermatchError::Json)?;
    validate_config(&config)?;
    Ok(config)
}

/// Validate that a config is usable by both extractors.
pub fn validate_config(config: &ExtractionConfig) -> Result<(), QuartermatchError> {
    if config.metrics.is_empty() {
        return Err(QuartermatchError::ConfigInvalid(
            "metrics must not be empty".into(),
        ));
    }

    let mut seen = HashSet::new();
    for metric in &config.metrics {
        if metric.trim().is_empty() {
            return Err(QuartermatchError::ConfigInvalid(
                "metric name must not be empty".into(),
            ));
        }
        if !seen.insert(metric.as_str()) {
            return Err(QuartermatchError::ConfigInvalid(format!(
                "metric '{}' is listed more than once",
                metric
            )));
        }
    }

    if config.match_threshold > 100 {
        return Err(QuartermatchError::ConfigInvalid(format!(
            "match_threshold {} is out of range (0-100)",
            config.match_threshold
        )));
    }

    if config.pdf.page == 0 {
        return Err(QuartermatchError::ConfigInvalid(
            "pdf.page is 1-indexed and must be at least 1".into(),
        ));
    }

    if config.pdf.known_columns.is_empty() {
        return Err(QuartermatchError::ConfigInvalid(
            "pdf.known_columns must not be empty".into(),
        ));
    }

    if config.pdf.row_tolerance.is_nan() || config.pdf.row_tolerance < 0.0 {
        return Err(QuartermatchError::ConfigInvalid(format!(
            "pdf.row_tolerance must be a non-negative number, got {}",
            config.pdf.row_tolerance
        )));
    }

    if config.spreadsheet.sheet.trim().is_empty() {
        return Err(QuartermatchError::ConfigInvalid(
            "spreadsheet.sheet must not be empty".into(),
        ));
    }

    if config.spreadsheet.column_quarters.is_empty() {
        return Err(QuartermatchError::ConfigInvalid(
            "spreadsheet.column_quarters must not be empty".into(),
        ));
    }

    if config.spreadsheet.column_quarters.contains_key(&0) {
        return Err(QuartermatchError::ConfigInvalid(
            "spreadsheet.column_quarters cannot use index 0 (the label cell)".into(),
        ));
    }

    if config.report_quarters.is_empty() {
        return Err(QuartermatchError::ConfigInvalid(
            "report_quarters must not be empty".into(),
        ));
    }

    for quarter in &config.report_quarters {
        let in_pdf = config.pdf.known_columns.contains(quarter);
        let in_sheet = config
            .spreadsheet
            .column_quarters
            .values()
            .any(|q| q == quarter);
        if !in_pdf && !in_sheet {
            return Err(QuartermatchError::ConfigInvalid(format!(
                "report quarter '{}' is produced by neither pdf.known_columns nor spreadsheet.column_quarters",
                quarter
            )));
        }
    }

    Ok(())
}
