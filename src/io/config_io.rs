use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::{CONFIG_FILE, Config};

/// Error type for config I/O
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse della.toml: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// A loaded configuration plus the directory it applies to.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    /// Directory holding della.toml, or the start directory when none exists
    pub base_dir: PathBuf,
    /// Path of the config file, if one was found
    pub source: Option<PathBuf>,
}

impl LoadedConfig {
    /// Tasks file path, resolved against the config directory.
    pub fn tasks_path(&self) -> PathBuf {
        self.base_dir.join(&self.config.tasks.file)
    }
}

/// Walk up from `start` looking for della.toml.
pub fn discover_config(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(CONFIG_FILE);
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

pub fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(toml::from_str(&text)?)
}

/// Discover and read the config for `start`, falling back to defaults.
pub fn load_config(start: &Path) -> Result<LoadedConfig, ConfigError> {
    match discover_config(start) {
        Some(path) => {
            let config = read_config(&path)?;
            let base_dir = path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| start.to_path_buf());
            Ok(LoadedConfig {
                config,
                base_dir,
                source: Some(path),
            })
        }
        None => Ok(LoadedConfig {
            config: Config::default(),
            base_dir: start.to_path_buf(),
            source: None,
        }),
    }
}
