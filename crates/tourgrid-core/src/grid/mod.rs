//! The embeddable grid: state, derived cells, and the [`DataGrid`] facade.

mod eval;
mod ops;
mod state;

pub use eval::{DisplayValue, FormulaInputs, display_value};
pub use state::{CellClass, DEFAULT_COLUMN_WIDTH, GridState, Sheet, SheetCell, build_sheet};

use tourgrid_engine::engine::AddOn;

use crate::column::{ColumnDescriptor, RowRecord, validate_columns};
use crate::error::Result;
use crate::interaction::{CellChange, CellPos, DragState, EditCursor, ResizeState};
use crate::render::{ChromeState, RenderContext, Rendered, render_cell};
use crate::storage::{WidthStore, load_widths};

/// Everything the host supplies when embedding a grid.
#[derive(Clone, Debug)]
pub struct GridProps {
    /// Scopes persisted column widths.
    pub grid_id: String,
    pub columns: Vec<ColumnDescriptor>,
    pub rows: Vec<RowRecord>,
    pub hidden_columns: Vec<String>,
    pub add_ons: Vec<AddOn>,
    pub base_price: f64,
    /// Column keys in Tab order. Defaults to the visible editable columns.
    pub editable_fields: Option<Vec<String>>,
    pub enable_column_resize: bool,
    pub enable_row_drag: bool,
}

impl GridProps {
    pub fn new(grid_id: &str, columns: Vec<ColumnDescriptor>, rows: Vec<RowRecord>) -> Self {
        GridProps {
            grid_id: grid_id.to_string(),
            columns,
            rows,
            hidden_columns: Vec::new(),
            add_ons: Vec::new(),
            base_price: 0.0,
            editable_fields: None,
            enable_column_resize: true,
            enable_row_drag: true,
        }
    }

    pub fn with_hidden_columns(mut self, keys: &[&str]) -> Self {
        self.hidden_columns = keys.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn with_add_ons(mut self, add_ons: Vec<AddOn>) -> Self {
        self.add_ons = add_ons;
        self
    }

    pub fn with_base_price(mut self, base_price: f64) -> Self {
        self.base_price = base_price;
        self
    }

    pub fn with_editable_fields(mut self, keys: &[&str]) -> Self {
        self.editable_fields = Some(keys.iter().map(|k| k.to_string()).collect());
        self
    }

    pub fn with_column_resize(mut self, enabled: bool) -> Self {
        self.enable_column_resize = enabled;
        self
    }

    pub fn with_row_drag(mut self, enabled: bool) -> Self {
        self.enable_row_drag = enabled;
        self
    }
}

/// Host-page callbacks. All default to doing nothing; the grid does not
/// wait on them or roll back if the host fails to persist.
pub trait GridHost {
    /// The full row array after an edit, paste, or row move.
    fn on_data_update(&mut self, _rows: &[RowRecord]) {}
    /// The individual edits that were applied.
    fn on_cells_changed(&mut self, _changes: &[CellChange]) {}
    fn on_column_hide(&mut self, _key: &str) {}
    fn on_column_delete(&mut self, _key: &str) {}
    /// Column keys in their new order after a column drop.
    fn on_columns_reordered(&mut self, _keys: &[String]) {}
}

impl GridHost for () {}

/// An editable data grid bound to a host and a width store.
pub struct DataGrid<H: GridHost, S: WidthStore> {
    pub(crate) state: GridState,
    pub(crate) grid_id: String,
    pub(crate) editable_fields: Option<Vec<String>>,
    pub(crate) enable_column_resize: bool,
    pub(crate) enable_row_drag: bool,
    pub(crate) host: H,
    pub(crate) store: S,
    pub(crate) drag: DragState,
    pub(crate) resize: ResizeState,
    pub(crate) cursor: EditCursor,
    pub(crate) selection: CellPos,
    pub(crate) hovered_column: Option<String>,
}

impl<H: GridHost, S: WidthStore> DataGrid<H, S> {
    /// Build a grid from host props. Persisted widths are loaded from `store`;
    /// fails only if column keys are not unique.
    pub fn new(props: GridProps, host: H, store: S) -> Result<Self> {
        validate_columns(&props.columns)?;
        let widths = load_widths(&store, &props.grid_id);

        let state = GridState {
            columns: props.columns,
            rows: props.rows,
            hidden: props.hidden_columns.into_iter().collect(),
            widths,
            inputs: FormulaInputs {
                add_ons: props.add_ons,
                base_price: props.base_price,
            },
        };

        Ok(DataGrid {
            state,
            grid_id: props.grid_id,
            editable_fields: props.editable_fields,
            enable_column_resize: props.enable_column_resize,
            enable_row_drag: props.enable_row_drag,
            host,
            store,
            drag: DragState::Idle,
            resize: ResizeState::Idle,
            cursor: EditCursor::default(),
            selection: CellPos::new(1, 0),
            hovered_column: None,
        })
    }

    pub fn grid_id(&self) -> &str {
        &self.grid_id
    }

    pub fn state(&self) -> &GridState {
        &self.state
    }

    pub fn rows(&self) -> &[RowRecord] {
        &self.state.rows
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.state.columns
    }

    pub fn visible_columns(&self) -> Vec<&ColumnDescriptor> {
        self.state.visible_columns()
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn selection(&self) -> CellPos {
        self.selection
    }

    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    pub fn resize_state(&self) -> &ResizeState {
        &self.resize
    }

    pub fn edit_cursor(&self) -> &EditCursor {
        &self.cursor
    }

    pub fn column_resize_enabled(&self) -> bool {
        self.enable_column_resize
    }

    pub fn row_drag_enabled(&self) -> bool {
        self.enable_row_drag
    }

    /// Width of a column, following a resize in progress.
    pub fn column_width(&self, key: &str) -> u32 {
        match self.resize.active() {
            Some((column, width)) if column == key => width,
            _ => self.state.column_width(key),
        }
    }

    /// Replace the rows, e.g. after the host reloads them.
    pub fn set_rows(&mut self, rows: Vec<RowRecord>) {
        self.state.rows = rows;
        self.cursor.cancel();
        self.clamp_selection();
    }

    pub fn set_columns(&mut self, columns: Vec<ColumnDescriptor>) -> Result<()> {
        validate_columns(&columns)?;
        self.state.columns = columns;
        self.cursor.cancel();
        self.clamp_selection();
        Ok(())
    }

    pub fn set_hovered_column(&mut self, key: Option<&str>) {
        self.hovered_column = key.map(str::to_string);
    }

    pub fn chrome(&self) -> ChromeState {
        ChromeState {
            hovered_column: self.hovered_column.clone(),
            enable_column_resize: self.enable_column_resize,
        }
    }

    /// The derived matrix, rebuilt on every call.
    pub fn sheet(&self) -> Sheet {
        let mut widths = self.state.widths.clone();
        if let Some((column, width)) = self.resize.active() {
            widths.insert(column.to_string(), width);
        }
        build_sheet(
            &self.state.visible_columns(),
            &self.state.rows,
            &widths,
            self.drag.dragged_row(),
            &self.state.inputs,
        )
    }

    /// Render every cell of the current sheet.
    pub fn render_sheet(&self) -> Vec<Vec<Rendered>> {
        let sheet = self.sheet();
        let columns = self.state.visible_columns();
        let chrome = self.chrome();
        let ctx = RenderContext {
            columns: &columns,
            rows: &self.state.rows,
            chrome: &chrome,
        };
        sheet
            .iter()
            .enumerate()
            .map(|(r, cells)| {
                cells
                    .iter()
                    .enumerate()
                    .map(|(c, cell)| render_cell(cell, r, c, &ctx))
                    .collect()
            })
            .collect()
    }

    /// Render one cell; `None` outside the sheet.
    pub fn render(&self, row: usize, col: usize) -> Option<Rendered> {
        let sheet = self.sheet();
        let cell = sheet.get(row)?.get(col)?;
        let columns = self.state.visible_columns();
        let chrome = self.chrome();
        let ctx = RenderContext {
            columns: &columns,
            rows: &self.state.rows,
            chrome: &chrome,
        };
        Some(render_cell(cell, row, col, &ctx))
    }

    /// Visible column indices in Tab order.
    pub fn tab_order(&self) -> Vec<usize> {
        let visible = self.state.visible_columns();
        match &self.editable_fields {
            Some(keys) => keys
                .iter()
                .filter_map(|key| visible.iter().position(|c| &c.key == key))
                .collect(),
            None => visible
                .iter()
                .enumerate()
                .filter(|(_, c)| !c.is_read_only())
                .map(|(i, _)| i)
                .collect(),
        }
    }

    pub(crate) fn clamp_selection(&mut self) {
        let cols = self.state.visible_columns().len();
        if let Some(pos) = self.selection.clamped(self.state.rows.len(), cols) {
            self.selection = pos;
        }
    }
}
