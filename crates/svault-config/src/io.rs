use std::fs;
use std::path::{Path, PathBuf};

use svault_constants::{APP_NAME, CONFIG_FILE_NAME};

use crate::config::SaverConfig;

#[must_use]
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

#[must_use]
pub fn default_config_path() -> PathBuf {
    default_config_dir().join(CONFIG_FILE_NAME)
}

pub fn read_config(path: &Path) -> anyhow::Result<SaverConfig> {
    let content = fs::read_to_string(path)?;
    let parsed: SaverConfig = serde_json::from_str(&content)?;
    Ok(parsed)
}

pub fn write_config(path: &Path, config: &SaverConfig) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

/// A missing file yields the defaults; a malformed one is an error.
pub fn load_or_default(path: &Path) -> anyhow::Result<SaverConfig> {
    if !path.exists() {
        svault_logger::debug(&format!("No config at {}, using defaults", path.display()));
        return Ok(SaverConfig::default());
    }
    read_config(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn written_config_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(CONFIG_FILE_NAME);
        let config = SaverConfig {
            public_media_root: dir.path().join("Pictures"),
            load_timeout_secs: 12,
            ..SaverConfig::default()
        };

        write_config(&path, &config).unwrap();
        assert_eq!(read_config(&path).unwrap(), config);
        assert!(fs::read_to_string(&path).unwrap().contains("\"publicMediaRoot\""));
    }

    #[test]
    fn missing_file_means_defaults_but_garbage_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        assert_eq!(load_or_default(&path).unwrap(), SaverConfig::default());

        fs::write(&path, "{ not json").unwrap();
        assert!(load_or_default(&path).is_err());
    }
}
