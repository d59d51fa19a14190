use crate::config::schema::ExtractionConfig;
use crate::error::QuartermatchError;

const CITI_3Q24_JSON: &str = include_str!("../../../../presets/citi-3q24.json");

/// Available predefined layouts.
pub const PRESETS: &[&str] = &["citi-3q24"];

pub const DEFAULT_PRESET: &str = "citi-3q24";

/// Load a predefined layout by name.
pub fn load_preset(name: &str) -> Result<ExtractionConfig, QuartermatchError> {
    match name {
        "citi-3q24" => {
            let config: ExtractionConfig = serde_json::from_str(CITI_3Q24_JSON)?;
            Ok(config)
        }
        _ => Err(QuartermatchError::ConfigInvalid(format!(
            "unknown preset '{}'. Available: {}",
            name,
            PRESETS.join(", ")
        ))),
    }
}
