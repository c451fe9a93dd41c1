use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

use clipdeck_engine::{EditorConfig, EngineError};

/// Environment variable naming an optional JSON editor config.
pub const CONFIG_ENV: &str = "CLIPDECK_CONFIG";

#[derive(Debug)]
pub enum ConfigLoadError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Invalid {
        path: PathBuf,
        source: EngineError,
    },
}

impl Display for ConfigLoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "cannot read config {}: {source}", path.display())
            }
            Self::Invalid { path, source } => {
                write!(f, "invalid config {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Invalid { source, .. } => Some(source),
        }
    }
}

/// Loads the config named by [`CONFIG_ENV`], if the variable is set.
pub fn load_from_env() -> Result<Option<EditorConfig>, ConfigLoadError> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => load_from_path(Path::new(&path)).map(Some),
        None => Ok(None),
    }
}

pub fn load_from_path(path: &Path) -> Result<EditorConfig, ConfigLoadError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    EditorConfig::from_json_str(&raw).map_err(|source| ConfigLoadError::Invalid {
        path: path.to_path_buf(),
        source,
    })
}
