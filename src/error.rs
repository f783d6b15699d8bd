//! Error types for the tourgrid application

use thiserror::Error;

/// Errors raised while loading or saving grid documents and settings
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid grid document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid settings: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Grid(#[from] tourgrid_core::GridError),

    #[error("Refusing to read {path}: file too large ({size} bytes, max {max})")]
    TooLarge { path: String, size: u64, max: u64 },
}

pub type Result<T> = std::result::Result<T, AppError>;

/// Read a whole file, refusing anything larger than `max` bytes.
pub fn read_limited(path: &std::path::Path, max: u64) -> Result<String> {
    let meta = std::fs::metadata(path)?;
    if meta.len() > max {
        return Err(AppError::TooLarge {
            path: path.display().to_string(),
            size: meta.len(),
            max,
        });
    }
    Ok(std::fs::read_to_string(path)?)
}
