use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::model::config::Config;

/// Name of the optional config file inside the data directory
pub const CONFIG_FILE: &str = "config.toml";

/// Environment variable that overrides the default data directory
pub const DATA_DIR_ENV: &str = "HOMESHELL_DIR";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Pick the data directory: explicit flag, then `HOMESHELL_DIR`, then
/// `~/.homeshell`, then `./.homeshell` when no home directory is known.
pub fn resolve_data_dir(flag: Option<&Path>) -> PathBuf {
    if let Some(dir) = flag {
        return dir.to_path_buf();
    }
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    match std::env::var_os("HOME").filter(|v| !v.is_empty()) {
        Some(home) => PathBuf::from(home).join(".homeshell"),
        None => PathBuf::from(".homeshell"),
    }
}

/// Read `config.toml` from the data directory. A missing file yields the
/// defaults; a malformed one is an error.
pub fn read_config(data_dir: &Path) -> Result<Config, ConfigError> {
    let path = data_dir.join(CONFIG_FILE);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Config::default()),
        Err(source) => return Err(ConfigError::Read { path, source }),
    };
    Ok(toml::from_str(&text)?)
}
