//! Application state for the terminal front end.

use tourgrid_core::interaction::CellPos;
use tourgrid_core::{CellValue, DataGrid, GridKey, Rendered, WidthStore};
use tourgrid_engine::engine::extract_fields;

use super::clipboard::ClipboardProvider;
use crate::document::DocumentHost;

/// Grid pixels per terminal column.
pub const PX_PER_CHAR: u32 = 8;

/// Width change for one keyboard resize step.
const RESIZE_STEP: i32 = PX_PER_CHAR as i32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Edit,
}

/// What a held mouse button is doing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PointerDrag {
    #[default]
    None,
    Resize,
    Row,
    Column,
}

pub struct App<S: WidthStore> {
    pub grid: DataGrid<DocumentHost, S>,
    pub clipboard: Box<dyn ClipboardProvider>,
    /// First data row shown (0-based).
    pub viewport_row: usize,
    /// First visible column shown.
    pub viewport_col: usize,
    pub visible_rows: usize,
    pub visible_cols: usize,
    pub status_message: String,
    pub should_quit: bool,
    pub pointer: PointerDrag,
}

impl<S: WidthStore> App<S> {
    pub fn new(grid: DataGrid<DocumentHost, S>, clipboard: Box<dyn ClipboardProvider>) -> Self {
        App {
            grid,
            clipboard,
            viewport_row: 0,
            viewport_col: 0,
            visible_rows: 20,
            visible_cols: 1,
            status_message: String::new(),
            should_quit: false,
            pointer: PointerDrag::None,
        }
    }

    pub fn mode(&self) -> Mode {
        if self.grid.edit_cursor().is_editing() {
            Mode::Edit
        } else {
            Mode::Normal
        }
    }

    pub fn cursor(&self) -> CellPos {
        self.grid.selection()
    }

    /// Keep the selection inside the viewport.
    pub fn update_viewport(&mut self) {
        let CellPos { row, col } = self.cursor();
        let data_row = row.saturating_sub(1);
        if data_row < self.viewport_row {
            self.viewport_row = data_row;
        } else if data_row >= self.viewport_row + self.visible_rows.max(1) {
            self.viewport_row = data_row + 1 - self.visible_rows.max(1);
        }
        if col < self.viewport_col {
            self.viewport_col = col;
        } else if col >= self.viewport_col + self.visible_cols.max(1) {
            self.viewport_col = col + 1 - self.visible_cols.max(1);
        }
    }

    /// Take the host's latest event as the status message, if there is one.
    pub fn sync_status(&mut self) {
        if let Some(event) = self.grid.host_mut().last_event.take() {
            self.status_message = event;
        }
    }

    pub fn key(&mut self, key: GridKey) {
        self.grid.handle_key(key);
        self.sync_status();
        self.update_viewport();
    }

    /// Start editing the selected cell with `c` replacing its content.
    pub fn type_char(&mut self, c: char) {
        if self.mode() == Mode::Normal {
            if !self.grid.begin_edit() {
                self.status_message = "Cell is read-only".to_string();
                return;
            }
            self.grid.set_edit_buffer("");
        }
        self.grid.edit_input(c);
    }

    pub fn backspace(&mut self) {
        self.grid.edit_backspace();
    }

    pub fn clear_cell(&mut self) {
        let CellPos { row, col } = self.cursor();
        if self.grid.set_cell(row, col, "").is_none() {
            self.status_message = "Cell cannot be cleared".to_string();
        }
        self.sync_status();
    }

    pub fn copy(&mut self) {
        let Some(text) = self.grid.copy_selection() else {
            return;
        };
        if self.clipboard.set_text(text) {
            self.status_message = "Copied".to_string();
        } else {
            self.status_message = "Error: clipboard unavailable".to_string();
        }
    }

    pub fn paste(&mut self) {
        let Some(text) = self.clipboard.get_text() else {
            self.status_message = "Clipboard is empty".to_string();
            return;
        };
        if self.mode() == Mode::Edit {
            let line = text.lines().next().unwrap_or_default();
            for c in line.chars() {
                self.grid.edit_input(c);
            }
            return;
        }
        let changes = self.grid.paste(&text);
        self.sync_status();
        self.status_message = format!("Pasted {} cells", changes.len());
    }

    /// Step a select or bucket cell to its next (or previous) choice.
    pub fn cycle_choice(&mut self, forward: bool) {
        let CellPos { row, col } = self.cursor();
        let Some(Rendered::Choice { selected, options }) = self.grid.render(row, col) else {
            return;
        };
        let enabled: Vec<&str> = options
            .iter()
            .filter(|o| !o.disabled)
            .map(|o| o.value.as_str())
            .collect();
        if enabled.is_empty() {
            return;
        }
        let next = match enabled.iter().position(|v| *v == selected) {
            Some(i) if forward => (i + 1) % enabled.len(),
            Some(i) => (i + enabled.len() - 1) % enabled.len(),
            None => 0,
        };
        let value = enabled[next].to_string();
        if self.grid.set_cell(row, col, &value).is_none() {
            self.status_message = format!("Cannot choose {}", value);
        }
        self.sync_status();
    }

    fn current_column_key(&self) -> Option<String> {
        self.grid
            .visible_columns()
            .get(self.cursor().col)
            .map(|c| c.key.clone())
    }

    pub fn hide_current_column(&mut self) {
        let Some(key) = self.current_column_key() else {
            return;
        };
        if !self.grid.hide_column(&key) {
            self.status_message = format!("Column {} cannot be hidden", key);
        }
        self.sync_status();
        self.update_viewport();
    }

    pub fn show_all_columns(&mut self) {
        let hidden: Vec<String> = self.grid.state().hidden.iter().cloned().collect();
        if hidden.is_empty() {
            self.status_message = "No hidden columns".to_string();
            return;
        }
        for key in hidden {
            if self.grid.show_column(&key) {
                self.grid.host_mut().column_shown(&key);
            }
        }
        self.sync_status();
    }

    pub fn delete_current_column(&mut self) {
        let Some(key) = self.current_column_key() else {
            return;
        };
        if !self.grid.delete_column(&key) {
            self.status_message = format!("Column {} cannot be deleted", key);
        }
        self.sync_status();
        self.update_viewport();
    }

    /// Widen or narrow the selected column by one step, through the same
    /// resize path a mouse drag takes.
    pub fn resize_current_column(&mut self, grow: bool) {
        let Some(key) = self.current_column_key() else {
            return;
        };
        if !self.grid.begin_resize(&key, 0) {
            self.status_message = "Column resize is disabled".to_string();
            return;
        }
        let dx = if grow { RESIZE_STEP } else { -RESIZE_STEP };
        if let Some(width) = self.grid.end_resize(dx) {
            self.status_message = format!("{} width {}", key, width);
        }
    }

    /// Move the selected row up or down by one, as a drag and drop would.
    pub fn move_current_row(&mut self, down: bool) {
        let CellPos { row, col } = self.cursor();
        let target = if down { row + 1 } else { row.saturating_sub(1) };
        if !self.grid.begin_row_drag(row) {
            self.status_message = "Row drag is disabled".to_string();
            return;
        }
        if self.grid.drop_row(target) {
            self.grid.select(target, col);
        }
        self.sync_status();
        self.update_viewport();
    }

    /// Text for the formula bar.
    pub fn formula_bar_text(&self) -> String {
        let CellPos { row, col } = self.cursor();
        let columns = self.grid.visible_columns();
        let Some(column) = columns.get(col) else {
            return "(no columns)".to_string();
        };
        let name = format!("{} #{}", column.label, row);

        if let Some(active) = self.grid.edit_cursor().active() {
            return format!("{}: {}│", name, active.buffer);
        }

        let value = self
            .grid
            .rows()
            .get(row.saturating_sub(1))
            .and_then(|r| r.get(&column.key))
            .cloned()
            .unwrap_or_default();
        match value {
            CellValue::Empty => format!("{}: (empty)", name),
            v if v.is_formula() => {
                let formula = v.to_input_string();
                let refs = extract_fields(&formula);
                if refs.is_empty() {
                    format!("{}: {}", name, formula)
                } else {
                    format!("{}: {}   [{}]", name, formula, refs.join(", "))
                }
            }
            v => format!("{}: {}", name, v.to_input_string()),
        }
    }
}
