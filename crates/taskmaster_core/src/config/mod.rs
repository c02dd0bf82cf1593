use crate::display::DisplayMode;
use crate::error::AppError;
use crate::export::DEFAULT_EXPORT_FILE;
use crate::storage::json_store;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "TASKMASTER_CONFIG_PATH";
pub const DATA_DIR_ENV_VAR: &str = "TASKMASTER_DATA_DIR";

/// User settings read at startup. Nothing in here is ever written back.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Startup display mode name (`light`, `dark` and their aliases).
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default)]
    pub export_path: Option<PathBuf>,
    #[serde(default)]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub theme: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub export_path: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl Config {
    /// Unknown theme names fall back to light.
    pub fn display_mode(&self) -> DisplayMode {
        self.theme
            .as_deref()
            .and_then(DisplayMode::from_theme_name)
            .unwrap_or_default()
    }

    /// `TASKMASTER_DATA_DIR`, then `data_dir`, then the per-user directory.
    pub fn data_dir(&self) -> Result<PathBuf, AppError> {
        if let Ok(path) = std::env::var(DATA_DIR_ENV_VAR)
            && !path.trim().is_empty()
        {
            return Ok(PathBuf::from(path));
        }

        match self.data_dir.as_ref() {
            Some(dir) => Ok(dir.clone()),
            None => json_store::user_data_dir(),
        }
    }

    pub fn export_path(&self) -> PathBuf {
        self.export_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_FILE))
    }
}

/// Lowercases and collapses runs of other characters to a single `_`.
/// Returns `None` when nothing alphanumeric is left.
pub fn canonical_name(raw: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    Ok(json_store::user_data_dir()?.join(CONFIG_FILE_NAME))
}

/// Never fails: a missing file gives defaults, an unreadable one gives
/// defaults plus the error for the caller to report.
pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(theme) = overrides.theme.as_ref() {
        merged.theme = Some(theme.clone());
    }
    if let Some(dir) = overrides.data_dir.as_ref() {
        merged.data_dir = Some(dir.clone());
    }
    if let Some(path) = overrides.export_path.as_ref() {
        merged.export_path = Some(path.clone());
    }
    if let Some(level) = overrides.log_level.as_ref() {
        merged.log_level = Some(level.clone());
    }

    merged
}
