pub mod config;
pub mod extract;
pub mod reconcile;

use quartermatch_core::config::builtin;
use quartermatch_core::config::schema::ExtractionConfig;
use quartermatch_core::error::QuartermatchError;
use std::path::PathBuf;

/// A config file wins over a preset; with neither, the default preset is used.
pub fn resolve_config(
    config_file: Option<PathBuf>,
    preset: Option<String>,
) -> Result<ExtractionConfig, QuartermatchError> {
    match (config_file, preset) {
        (Some(_), Some(_)) => Err(QuartermatchError::ConfigInvalid(
            "use either --config or --preset, not both".into(),
        )),
        (Some(path), None) => quartermatch_core::config::load_config(&path),
        (None, preset) => builtin::load_preset(preset.as_deref().unwrap_or(builtin::DEFAULT_PRESET)),
    }
}
