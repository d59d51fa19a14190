use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical metric name, exactly as listed in the configured registry.
pub type MetricKey = String;

/// Reporting period column identifier, e.g. `3Q'24`.
pub type QuarterLabel = String;

/// Quarter -> raw value mapping for a single metric.
pub type QuarterValues = IndexMap<QuarterLabel, RawValue>;

/// A value as it was found in the source document, before normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Text(String),
    Number(Decimal),
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Text(s) => write!(f, "{s}"),
            RawValue::Number(d) => write!(f, "{d}"),
        }
    }
}

impl From<&str> for RawValue {
    fn from(s: &str) -> Self {
        RawValue::Text(s.to_string())
    }
}

impl From<Decimal> for RawValue {
    fn from(d: Decimal) -> Self {
        RawValue::Number(d)
    }
}

/// Metric -> quarter -> raw value, in metric registry order.
///
/// Built once per document by an extraction strategy and only read
/// afterwards. A metric missing from the map was not found in the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricExtractionResult {
    metrics: IndexMap<MetricKey, QuarterValues>,
}

impl MetricExtractionResult {
    pub fn new(metrics: IndexMap<MetricKey, QuarterValues>) -> Self {
        Self { metrics }
    }

    pub fn get(&self, metric: &str) -> Option<&QuarterValues> {
        self.metrics.get(metric)
    }

    /// Raw value for one metric and quarter, if both were found.
    pub fn value(&self, metric: &str, quarter: &str) -> Option<&RawValue> {
        self.metrics.get(metric)?.get(quarter)
    }

    pub fn contains(&self, metric: &str) -> bool {
        self.metrics.contains_key(metric)
    }

    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        self.metrics.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&MetricKey, &QuarterValues)> {
        self.metrics.iter()
    }

    pub fn len(&self) -> usize {
        self.metrics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty()
    }
}

impl FromIterator<(MetricKey, QuarterValues)> for MetricExtractionResult {
    fn from_iter<I: IntoIterator<Item = (MetricKey, QuarterValues)>>(iter: I) -> Self {
        Self {
            metrics: iter.into_iter().collect(),
        }
    }
}

/// Outcome of comparing one quarter of one metric across two sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuarterComparison {
    pub quarter: QuarterLabel,
    pub left: Option<RawValue>,
    pub right: Option<RawValue>,
    /// Computed from normalized values. False when either side is missing.
    pub matched: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRow {
    pub metric: MetricKey,
    pub quarters: Vec<QuarterComparison>,
}

impl MatchRow {
    pub fn comparison(&self, quarter: &str) -> Option<&QuarterComparison> {
        self.quarters.iter().find(|q| q.quarter == quarter)
    }

    pub fn all_matched(&self) -> bool {
        self.quarters.iter().all(|q| q.matched)
    }
}

/// Inner join of two extractions with per-quarter match outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    pub left_source: String,
    pub right_source: String,
    pub quarters: Vec<QuarterLabel>,
    pub rows: Vec<MatchRow>,
}

impl MatchReport {
    pub fn row(&self, metric: &str) -> Option<&MatchRow> {
        self.rows.iter().find(|r| r.metric == metric)
    }

    pub fn mismatch_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|r| r.quarters.iter())
            .filter(|q| !q.matched)
            .count()
    }
}
