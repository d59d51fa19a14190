use quartermatch_core::config::schema::ExtractionConfig;
use quartermatch_core::error::QuartermatchError;
use quartermatch_core::extraction::llm::{CommandModel, LlmExtractor};
use quartermatch_core::extraction::pdftotext::PdftotextExtractor;
use quartermatch_core::extraction::table::TableExtractor;
use quartermatch_core::extraction::{Document, MetricSource};
use quartermatch_core::parsing::fuzzy::LabelMatcher;
use quartermatch_core::DocumentKind;
use std::path::{Path, PathBuf};

use crate::output;

const TABLE_RESULTS_FILE: &str = "non_llm_results.csv";
const LLM_RESULTS_FILE: &str = "llm_results.csv";

pub fn run(
    pdf_file: PathBuf,
    xlsx_file: PathBuf,
    config_file: Option<PathBuf>,
    preset: Option<String>,
    out_dir: PathBuf,
    llm_command: Option<String>,
    output_format: &str,
) -> Result<(), QuartermatchError> {
    let config = super::resolve_config(config_file, preset)?;
    tracing::debug!(config = %config.name, metrics = config.metrics.len(), "using extraction config");
    expect_kind(&pdf_file, DocumentKind::Pdf)?;
    expect_kind(&xlsx_file, DocumentKind::Xlsx)?;
    if !PdftotextExtractor::is_available() {
        return Err(QuartermatchError::PdftotextNotFound);
    }

    let pdf_bytes = std::fs::read(&pdf_file)?;
    let xlsx_bytes = std::fs::read(&xlsx_file)?;

    let extractor = PdftotextExtractor::new();
    let pdf = quartermatch_core::load_pdf(&pdf_bytes, &extractor, &config)?;
    let excel = quartermatch_core::load_xlsx(&xlsx_bytes, &config)?;

    std::fs::create_dir_all(&out_dir)?;

    let table = TableExtractor::from_config(&config);
    run_strategy(&table, &pdf, &excel, &config, &out_dir.join(TABLE_RESULTS_FILE), output_format)?;

    if let Some(command_line) = llm_command {
        let model = CommandModel::parse(&command_line)?;
        let llm = LlmExtractor::new(
            model,
            config.metrics.clone(),
            config.report_quarters.clone(),
            LabelMatcher::new(config.match_threshold),
        );
        run_strategy(&llm, &pdf, &excel, &config, &out_dir.join(LLM_RESULTS_FILE), output_format)?;
    }

    Ok(())
}

fn run_strategy(
    source: &dyn MetricSource,
    pdf: &Document,
    excel: &Document,
    config: &ExtractionConfig,
    csv_path: &Path,
    output_format: &str,
) -> Result<(), QuartermatchError> {
    let report = quartermatch_core::reconcile_documents(pdf, excel, source, config)?;
    output::csv::write_report(&report, csv_path)?;

    match output_format {
        "json" => output::json::print(&report)?,
        _ => print!("{}", output::table::format_report(&report, source.strategy_name())),
    }

    eprintln!(
        "{} extraction: {} metric(s) compared, {} mismatch(es), written to {}",
        source.strategy_name(),
        report.rows.len(),
        report.mismatch_count(),
        csv_path.display()
    );
    Ok(())
}

fn expect_kind(path: &Path, expected: DocumentKind) -> Result<(), QuartermatchError> {
    if DocumentKind::from_path(path)? == expected {
        Ok(())
    } else {
        let ext = match expected {
            DocumentKind::Pdf => "pdf",
            DocumentKind::Xlsx => "xlsx",
        };
        Err(QuartermatchError::UnsupportedInput(format!(
            "{} is in the .{} position",
            path.display(),
            ext
        )))
    }
}
