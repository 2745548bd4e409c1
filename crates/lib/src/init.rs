//! Initialize the configuration directory: create ~/.civic and a default config file.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Create the config directory and default config if they do not exist.
/// Returns the config directory. An existing config file is left untouched.
pub fn init_config_dir(config_path: &Path) -> Result<PathBuf> {
    let config_dir = config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(config_dir)
        .with_context(|| format!("creating config directory {}", config_dir.display()))?;

    if !config_path.exists() {
        std::fs::write(config_path, b"{}")
            .with_context(|| format!("writing default config to {}", config_path.display()))?;
        log::info!("created default config at {}", config_path.display());
    } else {
        log::debug!("config already exists at {}, skipping", config_path.display());
    }

    Ok(config_dir.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_directory_and_keeps_existing_file() {
        let dir = std::env::temp_dir().join(format!("civic-init-test-{}", uuid::Uuid::new_v4()));
        let path = dir.join("nested").join("config.json");
        let created = init_config_dir(&path).unwrap();
        assert_eq!(created, dir.join("nested"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");

        std::fs::write(&path, br#"{"ui":{"language":"Hindi"}}"#).unwrap();
        init_config_dir(&path).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("Hindi"));
    }
}
