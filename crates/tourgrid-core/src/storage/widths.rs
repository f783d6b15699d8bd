//! Column width persistence.
//!
//! Widths are stored as a JSON object `{ "<column key>": <width> }` under the
//! key `columnWidths_<grid id>` in a string key-value [`WidthStore`].

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use crate::error::{GridError, Result};

pub const WIDTH_KEY_PREFIX: &str = "columnWidths_";

const MAX_WIDTH_FILE_BYTES: u64 = 1_048_576; // 1 MiB

/// Column key -> width override.
pub type ColumnWidths = BTreeMap<String, u32>;

/// A local string key-value store.
pub trait WidthStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

pub fn width_key(grid_id: &str) -> String {
    format!("{}{}", WIDTH_KEY_PREFIX, grid_id)
}

/// Load the width overrides for a grid. Missing or unreadable data yields an
/// empty map.
pub fn load_widths(store: &dyn WidthStore, grid_id: &str) -> ColumnWidths {
    let key = width_key(grid_id);
    let raw = match store.get(&key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return ColumnWidths::new(),
        Err(e) => {
            log::warn!("could not read {}: {}", key, e);
            return ColumnWidths::new();
        }
    };
    match serde_json::from_str(&raw) {
        Ok(widths) => widths,
        Err(e) => {
            log::warn!("ignoring corrupt {}: {}", key, e);
            ColumnWidths::new()
        }
    }
}

pub fn save_widths(store: &mut dyn WidthStore, grid_id: &str, widths: &ColumnWidths) -> Result<()> {
    let raw = serde_json::to_string(widths)?;
    store.set(&width_key(grid_id), &raw)
}

#[derive(Debug, Default)]
pub struct MemoryWidthStore {
    entries: HashMap<String, String>,
}

impl MemoryWidthStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl WidthStore for MemoryWidthStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per entry inside a directory.
#[derive(Debug, Clone)]
pub struct FileWidthStore {
    dir: PathBuf,
}

impl FileWidthStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileWidthStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(key)))
    }
}

/// File name for a store key: ASCII letters, digits, `_` and `-` are kept,
/// every other byte becomes `%XX`. Distinct keys never share a file.
fn file_stem(key: &str) -> String {
    let mut stem = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'_' || byte == b'-' {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("%{:02X}", byte));
        }
    }
    stem
}

impl WidthStore for FileWidthStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        let meta = match std::fs::metadata(&path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if meta.len() > MAX_WIDTH_FILE_BYTES {
            return Err(GridError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "Refusing to read {}: width file too large ({} bytes, max {})",
                    path.display(),
                    meta.len(),
                    MAX_WIDTH_FILE_BYTES
                ),
            )));
        }
        Ok(Some(std::fs::read_to_string(&path)?))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path_for(key), value)?;
        Ok(())
    }
}
