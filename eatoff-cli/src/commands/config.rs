use std::fs;

use anyhow::{Context, Result};
use shared::config::{ClientConfig, ConfigFormat};

/// Generates a configuration file with default values in the current directory.
///
/// # Errors
/// Returns an error if the format is unsupported or if writing the file fails.
pub fn generate_config(format: Option<&str>) -> Result<()> {
    let format: ConfigFormat = format
        .unwrap_or("yaml")
        .parse()
        .map_err(|_| anyhow::anyhow!("Unsupported format. Use 'yaml', 'json' or 'toml'."))?;

    let serialized = ClientConfig::with_defaults().render(format)?;
    let file_name = format.file_name();
    fs::write(file_name, serialized)
        .with_context(|| format!("failed to write configuration file '{file_name}'"))?;

    println!("Configuration file '{file_name}' generated successfully.");
    Ok(())
}
