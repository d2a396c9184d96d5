pub mod ask;
pub mod doctor;
pub mod models;
pub mod serve;

use std::path::Path;

use askrelay_config::AppConfig;

/// Load from `--config` when given, else the default location.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => AppConfig::load_with_path(path),
        None => AppConfig::load(),
    };
    Ok(config.map_err(|e| format!("Failed to load config: {e}"))?)
}
