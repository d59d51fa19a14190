use quartermatch_core::error::QuartermatchError;
use quartermatch_core::extraction::pdftotext::PdftotextExtractor;
use quartermatch_core::DocumentKind;
use std::path::PathBuf;

use crate::output;

pub fn run(
    input_file: PathBuf,
    config_file: Option<PathBuf>,
    preset: Option<String>,
    output_format: &str,
) -> Result<(), QuartermatchError> {
    let config = super::resolve_config(config_file, preset)?;
    tracing::debug!(config = %config.name, metrics = config.metrics.len(), "using extraction config");
    let kind = DocumentKind::from_path(&input_file)?;
    let bytes = std::fs::read(&input_file)?;

    let result = match kind {
        DocumentKind::Pdf => {
            let extractor = PdftotextExtractor::new();
            quartermatch_core::extract_pdf_metrics(&bytes, &extractor, &config)?
        }
        DocumentKind::Xlsx => quartermatch_core::extract_xlsx_metrics(&bytes, &config)?,
    };

    match output_format {
        "json" => output::json::print(&result)?,
        _ => print!("{}", output::table::format_extraction(&result)),
    }

    Ok(())
}
