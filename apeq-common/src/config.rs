//! Configuration loading and asset folder resolution

use crate::{Error, Result};
use std::path::PathBuf;

/// Asset folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file (`asset_folder` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_asset_folder(cli_arg: Option<&str>, env_var_name: &str) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return Ok(PathBuf::from(path));
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = load_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(asset_folder) = config.get("asset_folder").and_then(|v| v.as_str()) {
                    return Ok(PathBuf::from(asset_folder));
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    Ok(get_default_asset_folder())
}

/// Get the configuration file path for the platform
fn load_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/apeq/config.toml first, then /etc/apeq/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("apeq").join("config.toml"));
        let system_config = PathBuf::from("/etc/apeq/config.toml");

        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        if system_config.exists() {
            return Ok(system_config);
        }
        return Err(Error::Config("No config file found".to_string()));
    }

    let config_path = dirs::config_dir()
        .map(|d| d.join("apeq").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    if config_path.exists() {
        Ok(config_path)
    } else {
        Err(Error::Config(format!("Config file not found: {:?}", config_path)))
    }
}

/// Get OS-dependent default asset folder path
fn get_default_asset_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("apeq").join("assets"))
        .unwrap_or_else(|| PathBuf::from("./apeq_assets"))
}
