//! Configuration loading and label-log path resolution

use crate::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Resolve the label-log path following the priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file (`label_log` key)
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_label_log(cli_arg: Option<&str>, env_var_name: &str) -> PathBuf {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        debug!("Label log from command line: {}", path);
        return PathBuf::from(path);
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        debug!("Label log from {}: {}", env_var_name, path);
        return PathBuf::from(path);
    }

    // Priority 3: TOML config file
    if let Some(config_path) = find_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(path) = config.get("label_log").and_then(|v| v.as_str()) {
                    debug!("Label log from {}: {}", config_path.display(), path);
                    return PathBuf::from(path);
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    default_label_log()
}

/// Locate the platform config file, if one exists
fn find_config_file() -> Option<PathBuf> {
    if let Some(path) = dirs::config_dir().map(|d| d.join("earmark").join("config.toml")) {
        if path.exists() {
            return Some(path);
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/earmark/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    None
}

/// OS-dependent default location for the label log
fn default_label_log() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("earmark"))
        .unwrap_or_else(|| PathBuf::from("./earmark_data"))
        .join("labeled_records.csv")
}

/// Create the parent directory of `path` if it does not already exist
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
