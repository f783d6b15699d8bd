//! Log setup. Records go to a file so they never draw over the terminal UI.

use env_logger::{Builder, Env, Target};
use std::fs::OpenOptions;

use crate::config::Settings;
use crate::error::Result;

const DEFAULT_FILTER: &str = "info";

/// Install the global logger. `RUST_LOG` wins over the configured level.
pub fn init_logging(settings: &Settings) -> Result<()> {
    let path = settings.log_file();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    let filter = settings.log_level.as_deref().unwrap_or(DEFAULT_FILTER);
    Builder::from_env(Env::default().default_filter_or(filter))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_secs()
        .try_init()
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    log::info!("logging to {}", path.display());
    Ok(())
}
