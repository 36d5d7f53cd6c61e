//! CLI commands.

pub mod batch;
pub mod canonicalize;
pub mod config;
pub mod extract;

use std::path::Path;

use labscan_core::LabscanConfig;

/// Load the configuration from `--config`, else from the default location
/// when it exists, else the defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<LabscanConfig> {
    if let Some(path) = config_path {
        return Ok(LabscanConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        Ok(LabscanConfig::from_file(&default_path)?)
    } else {
        Ok(LabscanConfig::default())
    }
}
