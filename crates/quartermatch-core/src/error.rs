use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum QuartermatchError {
    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    #[error("failed to read spreadsheet: {0}")]
    Spreadsheet(String),

    #[error(transparent)]
    Normalization(#[from] NormalizationError),

    #[error("failed to load config from {path}: {reason}")]
    ConfigLoad { path: PathBuf, reason: String },

    #[error("invalid config: {0}")]
    ConfigInvalid(String),

    #[error("LLM extraction failed: {0}")]
    Llm(String),

    #[error("unsupported input: {0}. Expected a .pdf or .xlsx file")]
    UnsupportedInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A value token that could not be reduced to a number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot convert '{raw}' to a valid number (cleaned: '{cleaned}')")]
pub struct NormalizationError {
    pub raw: String,
    pub cleaned: String,
}
