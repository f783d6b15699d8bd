//! User settings (`config.toml`).
//!
//! Loaded from `--config <path>` or the platform config dir
//! (`~/.config/tourgrid/config.toml` on Linux). A missing file means
//! defaults; a broken one means defaults plus a warning.

use directories::ProjectDirs;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Result, read_limited};

const MAX_CONFIG_BYTES: u64 = 65_536; // 64 KiB

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub enable_column_resize: bool,
    pub enable_row_drag: bool,
    /// Directory for persisted column widths.
    pub width_dir: Option<PathBuf>,
    /// `env_logger` filter, e.g. `debug` or `tourgrid_core=trace`.
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            enable_column_resize: true,
            enable_row_drag: true,
            width_dir: None,
            log_level: None,
            log_file: None,
        }
    }
}

impl Settings {
    pub fn parse(content: &str) -> Result<Settings> {
        Ok(toml::from_str(content)?)
    }

    pub fn width_dir(&self) -> PathBuf {
        self.width_dir
            .clone()
            .or_else(|| project_dirs().map(|p| p.data_dir().join("widths")))
            .unwrap_or_else(|| PathBuf::from(".tourgrid").join("widths"))
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_file
            .clone()
            .or_else(|| project_dirs().map(|p| p.data_dir().join("tourgrid.log")))
            .unwrap_or_else(|| PathBuf::from(".tourgrid").join("tourgrid.log"))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "tourgrid")
}

pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|p| p.config_dir().join("config.toml"))
}

/// Load settings, collecting problems as warnings instead of failing.
pub fn load_settings(config_file: Option<&Path>) -> (Settings, Vec<String>) {
    let mut warnings = Vec::new();
    let path = config_file.map(Path::to_path_buf).or_else(default_config_path);

    let Some(path) = path else {
        return (Settings::default(), warnings);
    };
    if !path.exists() {
        if config_file.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (Settings::default(), warnings);
    }

    match read_limited(&path, MAX_CONFIG_BYTES).and_then(|content| Settings::parse(&content)) {
        Ok(settings) => (settings, warnings),
        Err(err) => {
            warnings.push(format!("Failed to load {}: {}", path.display(), err));
            (Settings::default(), warnings)
        }
    }
}
