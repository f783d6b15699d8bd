//! Grid state and the derived cell matrix.

use bitflags::bitflags;
use std::collections::BTreeSet;
use tourgrid_engine::engine::CellValue;

use super::eval::{DisplayValue, FormulaInputs, display_value};
use crate::column::{ColumnDescriptor, RowRecord};
use crate::storage::ColumnWidths;

/// Width of a column with no override and no descriptor width.
pub const DEFAULT_COLUMN_WIDTH: u32 = 100;

bitflags! {
    /// Presentation classes of a derived cell.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct CellClass: u8 {
        const HEADER = 1;
        const READ_ONLY = 1 << 1;
        const FORMULA = 1 << 2;
        const DRAGGING = 1 << 3;
        const ERROR = 1 << 4;
    }
}

/// One cell of the derived matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct SheetCell {
    /// Stored content (the label for header cells).
    pub value: CellValue,
    pub display: DisplayValue,
    pub read_only: bool,
    pub class: CellClass,
    pub column_key: String,
    /// Data row index; `None` for the header.
    pub row_index: Option<usize>,
    pub width: u32,
}

/// Sheet row 0 is the header; sheet row `n` is data row `n - 1`.
pub type Sheet = Vec<Vec<SheetCell>>;

/// Build the matrix for `columns` over `rows`. Recomputed on every call.
pub fn build_sheet(
    columns: &[&ColumnDescriptor],
    rows: &[RowRecord],
    widths: &ColumnWidths,
    dragging_row: Option<usize>,
    inputs: &FormulaInputs,
) -> Sheet {
    let mut sheet = Vec::with_capacity(rows.len() + 1);

    sheet.push(
        columns
            .iter()
            .map(|column| {
                let label = CellValue::text(column.label.as_str());
                SheetCell {
                    display: DisplayValue::Value(label.clone()),
                    value: label,
                    read_only: true,
                    class: CellClass::HEADER | CellClass::READ_ONLY,
                    column_key: column.key.clone(),
                    row_index: None,
                    width: effective_width(column, widths),
                }
            })
            .collect(),
    );

    for (index, row) in rows.iter().enumerate() {
        let dragging = dragging_row == Some(index + 1);
        sheet.push(
            columns
                .iter()
                .map(|column| {
                    let value = row.get(&column.key).cloned().unwrap_or_default();
                    let display = display_value(&value, row, inputs);
                    let read_only = column.is_read_only();

                    let mut class = CellClass::empty();
                    class.set(CellClass::READ_ONLY, read_only);
                    class.set(CellClass::FORMULA, value.is_formula());
                    class.set(CellClass::ERROR, display.is_error());
                    class.set(CellClass::DRAGGING, dragging);

                    SheetCell {
                        value,
                        display,
                        read_only,
                        class,
                        column_key: column.key.clone(),
                        row_index: Some(index),
                        width: effective_width(column, widths),
                    }
                })
                .collect(),
        );
    }
    sheet
}

fn effective_width(column: &ColumnDescriptor, widths: &ColumnWidths) -> u32 {
    widths
        .get(&column.key)
        .copied()
        .or(column.width)
        .unwrap_or(DEFAULT_COLUMN_WIDTH)
}

/// Columns, rows, and layout of one grid instance.
#[derive(Clone, Debug, Default)]
pub struct GridState {
    pub columns: Vec<ColumnDescriptor>,
    pub rows: Vec<RowRecord>,
    pub hidden: BTreeSet<String>,
    pub widths: ColumnWidths,
    pub inputs: FormulaInputs,
}

impl GridState {
    /// Columns not hidden, in column order.
    pub fn visible_columns(&self) -> Vec<&ColumnDescriptor> {
        self.columns
            .iter()
            .filter(|c| !self.hidden.contains(&c.key))
            .collect()
    }

    pub fn column(&self, key: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.key == key)
    }

    /// Persisted override, else descriptor width, else the default.
    pub fn column_width(&self, key: &str) -> u32 {
        match self.column(key) {
            Some(column) => effective_width(column, &self.widths),
            None => self
                .widths
                .get(key)
                .copied()
                .unwrap_or(DEFAULT_COLUMN_WIDTH),
        }
    }

    pub fn sheet(&self, dragging_row: Option<usize>) -> Sheet {
        build_sheet(
            &self.visible_columns(),
            &self.rows,
            &self.widths,
            dragging_row,
            &self.inputs,
        )
    }

    /// Data rows plus the header.
    pub fn sheet_rows(&self) -> usize {
        self.rows.len() + 1
    }
}
