use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::extraction::spatial::DEFAULT_ROW_TOLERANCE;
use crate::parsing::fuzzy::DEFAULT_MATCH_THRESHOLD;

/// Everything the extractors need to know about one filing layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Metric registry. These exact strings key every extraction result.
    pub metrics: Vec<String>,
    #[serde(default = "default_threshold")]
    pub match_threshold: u8,
    #[serde(default)]
    pub label_selection: LabelSelection,
    pub pdf: PdfLayout,
    pub spreadsheet: SheetLayout,
    /// Quarters compared in the reconciliation report.
    pub report_quarters: Vec<String>,
}

/// How a label is chosen when several rows match the same metric.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelSelection {
    /// Earliest matching row in reading order wins, even if a later row
    /// scores higher.
    #[default]
    First,
    /// Highest-scoring row wins; ties go to the earliest.
    BestScore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdfLayout {
    /// 1-indexed page holding the highlights table.
    pub page: usize,
    /// Value columns in left-to-right order. Correlated values are assigned
    /// to these by position.
    pub known_columns: Vec<String>,
    #[serde(default = "default_tolerance")]
    pub row_tolerance: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetLayout {
    pub sheet: String,
    /// Index into the compacted row (empty cells removed) -> quarter.
    pub column_quarters: BTreeMap<usize, String>,
}

fn default_threshold() -> u8 {
    DEFAULT_MATCH_THRESHOLD
}

fn default_tolerance() -> f32 {
    DEFAULT_ROW_TOLERANCE
}
