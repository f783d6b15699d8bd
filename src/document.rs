//! Grid documents: the JSON file a grid is loaded from, and the host that
//! writes grid changes back to it.
//!
//! ```json
//! {
//!   "grid_id": "tour-2024-kyoto",
//!   "base_price": 1200,
//!   "add_ons": [{ "key": "insurance", "name": "Travel insurance", "price": 45 }],
//!   "columns": [{ "key": "name", "label": "Name", "type": "text", "protection": "core" }],
//!   "rows": [{ "name": "Ada" }]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tourgrid_core::{AddOn, CellChange, ColumnDescriptor, GridHost, GridProps, RowRecord};

use crate::config::Settings;
use crate::error::{Result, read_limited};

const MAX_DOCUMENT_BYTES: u64 = 16_777_216; // 16 MiB

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GridDocument {
    pub grid_id: String,
    pub columns: Vec<ColumnDescriptor>,
    #[serde(default)]
    pub rows: Vec<RowRecord>,
    #[serde(default)]
    pub hidden_columns: Vec<String>,
    #[serde(default)]
    pub add_ons: Vec<AddOn>,
    #[serde(default)]
    pub base_price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editable_fields: Option<Vec<String>>,
}

impl GridDocument {
    pub fn load(path: &Path) -> Result<GridDocument> {
        let content = read_limited(path, MAX_DOCUMENT_BYTES)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json + "\n")?;
        Ok(())
    }

    /// Grid props for this document under the given settings.
    pub fn props(&self, settings: &Settings) -> GridProps {
        GridProps {
            grid_id: self.grid_id.clone(),
            columns: self.columns.clone(),
            rows: self.rows.clone(),
            hidden_columns: self.hidden_columns.clone(),
            add_ons: self.add_ons.clone(),
            base_price: self.base_price,
            editable_fields: self.editable_fields.clone(),
            enable_column_resize: settings.enable_column_resize,
            enable_row_drag: settings.enable_row_drag,
        }
    }
}

/// Grid host that mirrors every change into a [`GridDocument`] and saves it.
pub struct DocumentHost {
    pub document: GridDocument,
    pub path: Option<PathBuf>,
    /// Last thing that happened, for the status bar.
    pub last_event: Option<String>,
}

impl DocumentHost {
    pub fn new(document: GridDocument, path: Option<PathBuf>) -> Self {
        DocumentHost {
            document,
            path,
            last_event: None,
        }
    }

    /// Record a column being shown again (the grid has no callback for it).
    pub fn column_shown(&mut self, key: &str) {
        self.document.hidden_columns.retain(|k| k != key);
        self.persist(&format!("column {} shown", key));
    }

    fn persist(&mut self, what: &str) {
        let Some(path) = &self.path else {
            self.last_event = Some(what.to_string());
            return;
        };
        match self.document.save(path) {
            Ok(()) => {
                log::debug!("saved {} ({})", path.display(), what);
                self.last_event = Some(format!("{} - saved", what));
            }
            Err(e) => {
                log::warn!("could not save {}: {}", path.display(), e);
                self.last_event = Some(format!("Error: could not save: {}", e));
            }
        }
    }
}

impl GridHost for DocumentHost {
    fn on_data_update(&mut self, rows: &[RowRecord]) {
        self.document.rows = rows.to_vec();
        self.persist("rows updated");
    }

    fn on_cells_changed(&mut self, changes: &[CellChange]) {
        for change in changes {
            log::debug!(
                "row {} {} = {:?}",
                change.row,
                change.column,
                change.value
            );
        }
    }

    fn on_column_hide(&mut self, key: &str) {
        if !self.document.hidden_columns.iter().any(|k| k == key) {
            self.document.hidden_columns.push(key.to_string());
        }
        self.persist(&format!("column {} hidden", key));
    }

    fn on_column_delete(&mut self, key: &str) {
        self.document.columns.retain(|c| c.key != key);
        self.document.hidden_columns.retain(|k| k != key);
        for row in &mut self.document.rows {
            row.remove(key);
        }
        self.persist(&format!("column {} deleted", key));
    }

    fn on_columns_reordered(&mut self, keys: &[String]) {
        self.document
            .columns
            .sort_by_key(|c| keys.iter().position(|k| *k == c.key).unwrap_or(usize::MAX));
        self.persist("columns reordered");
    }
}
