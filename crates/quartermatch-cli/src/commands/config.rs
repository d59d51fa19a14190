use quartermatch_core::config::builtin;
use quartermatch_core::config::schema::{ExtractionConfig, LabelSelection};
use quartermatch_core::error::QuartermatchError;
use std::path::Path;

pub fn list() -> Result<(), QuartermatchError> {
    println!("Available predefined configs:\n");
    for name in builtin::PRESETS {
        let config = builtin::load_preset(name)?;
        let marker = if *name == builtin::DEFAULT_PRESET {
            " (default)"
        } else {
            ""
        };
        println!("  {:<12} {}{}", name, config.name, marker);
        if let Some(ref desc) = config.description {
            println!("               {}", desc);
        }
        println!();
    }
    Ok(())
}

pub fn show(preset: Option<&str>) -> Result<(), QuartermatchError> {
    let config = builtin::load_preset(preset.unwrap_or(builtin::DEFAULT_PRESET))?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

pub fn validate(file: &Path) -> Result<(), QuartermatchError> {
    let config = quartermatch_core::config::load_config(file)?;

    println!("Config '{}' is valid.", config.name);
    print_summary(&config);

    let mut warnings = Vec::new();
    if config.match_threshold < 50 {
        warnings.push(format!(
            "match_threshold {} accepts loosely related labels",
            config.match_threshold
        ));
    }
    for quarter in &config.report_quarters {
        if !config.pdf.known_columns.contains(quarter) {
            warnings.push(format!("report quarter '{quarter}' is not a PDF column"));
        }
        if !config.spreadsheet.column_quarters.values().any(|q| q == quarter) {
            warnings.push(format!("report quarter '{quarter}' is not a spreadsheet column"));
        }
    }

    if !warnings.is_empty() {
        println!("\nWarnings:");
        for w in &warnings {
            println!("  - {}", w);
        }
    }

    Ok(())
}

fn print_summary(config: &ExtractionConfig) {
    let selection = match config.label_selection {
        LabelSelection::First => "first match",
        LabelSelection::BestScore => "best score",
    };
    println!("  Metrics: {}", config.metrics.len());
    println!(
        "  Label matching: threshold {}, {}",
        config.match_threshold, selection
    );
    println!(
        "  PDF: page {}, columns {}",
        config.pdf.page,
        config.pdf.known_columns.join(", ")
    );
    let sheet_columns: Vec<String> = config
        .spreadsheet
        .column_quarters
        .iter()
        .map(|(index, quarter)| format!("{index}={quarter}"))
        .collect();
    println!(
        "  Spreadsheet: sheet '{}', columns {}",
        config.spreadsheet.sheet,
        sheet_columns.join(", ")
    );
    println!("  Report quarters: {}", config.report_quarters.join(", "));
}
