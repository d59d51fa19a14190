mod commands;
mod logging;
mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "quartermatch",
    version,
    about = "Extract quarterly financial metrics from a PDF report and its spreadsheet supplement, and reconcile them"
)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract metric values from a single PDF or XLSX file
    Extract {
        /// Path to PDF or XLSX file
        input_file: PathBuf,

        /// Custom JSON extraction config
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Built-in config preset (default: citi-3q24)
        #[arg(short, long, value_name = "NAME")]
        preset: Option<String>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Extract from a PDF report and its XLSX supplement and compare the values
    Reconcile {
        /// Path to the PDF report
        pdf_file: PathBuf,

        /// Path to the XLSX supplement
        xlsx_file: PathBuf,

        /// Custom JSON extraction config
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Built-in config preset (default: citi-3q24)
        #[arg(short, long, value_name = "NAME")]
        preset: Option<String>,

        /// Directory for the CSV result files
        #[arg(short = 'd', long, value_name = "DIR", default_value = ".")]
        out_dir: PathBuf,

        /// Also run LLM extraction; the prompt is piped to this command's stdin
        #[arg(long, value_name = "CMD")]
        llm_command: Option<String>,

        /// Output format: table (default) or json
        #[arg(short, long, default_value = "table")]
        output: String,
    },
    /// Inspect and validate extraction configs
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// List built-in presets
    List,
    /// Print a built-in preset as JSON
    Show {
        /// Preset name (default: citi-3q24)
        preset: Option<String>,
    },
    /// Validate a custom config file
    Validate {
        /// Path to JSON config file
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::setup_logging(cli.verbose);

    let result = match cli.command {
        Commands::Extract {
            input_file,
            config,
            preset,
            output,
        } => commands::extract::run(input_file, config, preset, &output),
        Commands::Reconcile {
            pdf_file,
            xlsx_file,
            config,
            preset,
            out_dir,
            llm_command,
            output,
        } => commands::reconcile::run(
            pdf_file,
            xlsx_file,
            config,
            preset,
            out_dir,
            llm_command,
            &output,
        ),
        Commands::Config { action } => match action {
            ConfigAction::List => commands::config::list(),
            ConfigAction::Show { preset } => commands::config::show(preset.as_deref()),
            ConfigAction::Validate { file } => commands::config::validate(&file),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
