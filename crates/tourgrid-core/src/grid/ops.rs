//! Interaction entry points of the facade.
//!
//! Invalid interactions (header drags, read-only edits, disabled features)
//! are ignored: the method returns `false`/`None`/empty and logs why.

use super::{DataGrid, GridHost};
use crate::error::GridError;
use crate::interaction::{
    CellChange, CellEdit, CellPos, DragState, GridKey, apply_edits, arrow, move_item, parse_paste,
    paste_edits, tab,
};
use crate::storage::{WidthStore, save_widths};

impl<H: GridHost, S: WidthStore> DataGrid<H, S> {
    // ---- column resize ----

    /// Pointer down on a column's resize handle at `x`.
    pub fn begin_resize(&mut self, key: &str, x: i32) -> bool {
        if !self.enable_column_resize {
            log::debug!("{}", GridError::Disabled("column resize"));
            return false;
        }
        if self.state.column(key).is_none() {
            log::debug!("{}", GridError::UnknownColumn(key.to_string()));
            return false;
        }
        let base = self.state.column_width(key);
        self.resize.begin(key, x, base);
        true
    }

    pub fn track_resize(&mut self, x: i32) -> Option<u32> {
        self.resize.track(x)
    }

    /// Pointer up at `x`: commits the final width and persists all widths.
    pub fn end_resize(&mut self, x: i32) -> Option<u32> {
        let (key, width) = self.resize.finish(x)?;
        self.state.widths.insert(key, width);
        if let Err(e) = save_widths(&mut self.store, &self.grid_id, &self.state.widths) {
            log::warn!("could not persist column widths for {}: {}", self.grid_id, e);
        }
        Some(width)
    }

    // ---- row and column drag ----

    /// Start dragging sheet row `row`.
    pub fn begin_row_drag(&mut self, row: usize) -> bool {
        if !self.enable_row_drag {
            log::debug!("{}", GridError::Disabled("row drag"));
            return false;
        }
        if let Err(e) = self.check_data_row(row) {
            log::debug!("ignoring row drag: {}", e);
            return false;
        }
        self.drag = DragState::Row(row);
        true
    }

    /// Drop the dragged row onto sheet row `target`. The drag ends either way.
    pub fn drop_row(&mut self, target: usize) -> bool {
        let Some(from) = std::mem::take(&mut self.drag).dragged_row() else {
            return false;
        };
        if let Err(e) = self.check_data_row(target) {
            log::debug!("ignoring row drop: {}", e);
            return false;
        }

        let mut rows = self.state.rows.clone();
        if !move_item(&mut rows, from - 1, target - 1) {
            return false;
        }
        self.state.rows = rows;
        self.cursor.cancel();
        self.host.on_data_update(&self.state.rows);
        true
    }

    pub fn begin_column_drag(&mut self, key: &str) -> bool {
        if self.state.column(key).is_none() {
            log::debug!("{}", GridError::UnknownColumn(key.to_string()));
            return false;
        }
        self.drag = DragState::Column(key.to_string());
        true
    }

    /// Drop the dragged column onto the column `target`.
    pub fn drop_column(&mut self, target: &str) -> bool {
        let DragState::Column(key) = std::mem::take(&mut self.drag) else {
            return false;
        };
        let columns = &self.state.columns;
        let (Some(from), Some(to)) = (
            columns.iter().position(|c| c.key == key),
            columns.iter().position(|c| c.key == target),
        ) else {
            log::debug!("ignoring column drop: {} -> {}", key, target);
            return false;
        };

        if !move_item(&mut self.state.columns, from, to) {
            return false;
        }
        self.cursor.cancel();
        let keys: Vec<String> = self.state.columns.iter().map(|c| c.key.clone()).collect();
        self.host.on_columns_reordered(&keys);
        true
    }

    /// Drag ended without a drop.
    pub fn end_drag(&mut self) {
        self.drag.clear();
    }

    fn check_data_row(&self, row: usize) -> crate::Result<()> {
        if row == 0 {
            return Err(GridError::HeaderRow);
        }
        let len = self.state.rows.len();
        if row > len {
            return Err(GridError::RowOutOfBounds {
                index: row - 1,
                len,
            });
        }
        Ok(())
    }

    // ---- editing ----

    pub fn select(&mut self, row: usize, col: usize) {
        self.selection = CellPos::new(row, col);
        self.clamp_selection();
    }

    /// Enter edit mode on the selected cell, committing any other edit.
    pub fn begin_edit(&mut self) -> bool {
        let CellPos { row, col } = self.selection;
        self.begin_edit_at(row, col)
    }

    pub fn begin_edit_at(&mut self, row: usize, col: usize) -> bool {
        let initial = {
            let columns = self.state.visible_columns();
            let Some(column) = columns.get(col) else {
                return false;
            };
            if row == 0 || column.is_read_only() {
                return false;
            }
            let Some(data) = self.state.rows.get(row - 1) else {
                return false;
            };
            data.get(&column.key)
                .map(|v| v.to_input_string())
                .unwrap_or_default()
        };

        self.selection = CellPos::new(row, col);
        if let Some(previous) = self.cursor.begin(row, col, initial) {
            self.commit(&[previous]);
        }
        true
    }

    pub fn edit_input(&mut self, c: char) {
        self.cursor.push(c);
    }

    pub fn edit_backspace(&mut self) {
        self.cursor.backspace();
    }

    pub fn set_edit_buffer(&mut self, text: &str) {
        self.cursor.set_buffer(text);
    }

    /// Commit the edit in progress (blur, Enter, Tab).
    pub fn commit_edit(&mut self) -> Vec<CellChange> {
        match self.cursor.commit() {
            Some(edit) => self.commit(&[edit]),
            None => Vec::new(),
        }
    }

    /// Leave edit mode without committing.
    pub fn cancel_edit(&mut self) {
        self.cursor.cancel();
    }

    /// Apply edits and report them to the host. Edits that cannot be applied
    /// are skipped; nothing is reported if none apply.
    pub fn commit(&mut self, edits: &[CellEdit]) -> Vec<CellChange> {
        let mut rows = self.state.rows.clone();
        let changes = {
            let columns = self.state.visible_columns();
            apply_edits(&columns, &mut rows, edits)
        };
        if changes.is_empty() {
            return changes;
        }
        self.state.rows = rows;
        self.host.on_data_update(&self.state.rows);
        self.host.on_cells_changed(&changes);
        changes
    }

    /// Set one cell from editor input.
    pub fn set_cell(&mut self, row: usize, col: usize, input: &str) -> Option<CellChange> {
        self.commit(&[CellEdit::new(row, col, input)]).pop()
    }

    /// Paste clipboard text with its top-left cell at the selection.
    pub fn paste(&mut self, text: &str) -> Vec<CellChange> {
        self.cursor.cancel();
        let matrix = parse_paste(text);
        let anchor = (self.selection.row, self.selection.col);
        let cols = self.state.visible_columns().len();
        let edits = paste_edits(&matrix, anchor, self.state.sheet_rows(), cols);
        self.commit(&edits)
    }

    /// The selected cell's stored value as editor text.
    pub fn copy_selection(&self) -> Option<String> {
        let columns = self.state.visible_columns();
        let column = columns.get(self.selection.col)?;
        let row = self.state.rows.get(self.selection.row.checked_sub(1)?)?;
        Some(
            row.get(&column.key)
                .map(|v| v.to_input_string())
                .unwrap_or_default(),
        )
    }

    /// Keyboard handling. Returns whether the key did anything.
    pub fn handle_key(&mut self, key: GridKey) -> bool {
        let rows = self.state.rows.len();
        let cols = self.state.visible_columns().len();
        match key {
            GridKey::Escape => {
                let editing = self.cursor.is_editing();
                self.cancel_edit();
                editing
            }
            GridKey::Enter => {
                if self.cursor.is_editing() {
                    self.commit_edit();
                    true
                } else {
                    self.begin_edit()
                }
            }
            GridKey::Tab | GridKey::BackTab => {
                self.commit_edit();
                let order = self.tab_order();
                let next = tab(self.selection, key == GridKey::Tab, &order, rows);
                let moved = next != self.selection;
                self.selection = next;
                moved
            }
            GridKey::Up | GridKey::Down | GridKey::Left | GridKey::Right => {
                self.commit_edit();
                let next = arrow(self.selection, key, rows, cols);
                let moved = next != self.selection;
                self.selection = next;
                moved
            }
        }
    }

    // ---- header affordances ----

    pub fn hide_column(&mut self, key: &str) -> bool {
        match self.state.column(key) {
            Some(column) if column.can_hide() => {}
            _ => {
                log::debug!("column {} cannot be hidden", key);
                return false;
            }
        }
        if !self.state.hidden.insert(key.to_string()) {
            return false;
        }
        self.cursor.cancel();
        self.clamp_selection();
        self.host.on_column_hide(key);
        true
    }

    pub fn show_column(&mut self, key: &str) -> bool {
        let shown = self.state.hidden.remove(key);
        if shown {
            self.cursor.cancel();
        }
        shown
    }

    /// Remove a custom column. Row data is left for the host to clean up.
    pub fn delete_column(&mut self, key: &str) -> bool {
        let Some(index) = self
            .state
            .columns
            .iter()
            .position(|c| c.key == key && c.can_delete())
        else {
            log::debug!("column {} cannot be deleted", key);
            return false;
        };
        self.state.columns.remove(index);
        self.state.hidden.remove(key);
        self.cursor.cancel();
        self.clamp_selection();
        self.host.on_column_delete(key);
        true
    }
}
