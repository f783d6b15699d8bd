//! Cell renderer: maps a derived cell to a description of what to draw.
//!
//! The output is UI-agnostic; front ends turn a [`Rendered`] into widgets.

use crate::column::{ColumnDescriptor, ColumnKind, RowRecord, SelectOption};
use crate::grid::{DisplayValue, SheetCell};

/// Shown instead of a formula that failed to evaluate.
pub const ERROR_GLYPH: &str = "ERR";

/// Chrome that depends on pointer state and grid options.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChromeState {
    pub hovered_column: Option<String>,
    pub enable_column_resize: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HeaderAffordances {
    pub hide: bool,
    pub delete: bool,
    pub resize: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Rendered {
    Header {
        label: String,
        affordances: HeaderAffordances,
    },
    Error {
        glyph: &'static str,
    },
    Choice {
        selected: String,
        options: Vec<SelectOption>,
    },
    Text(String),
    /// Empty cell, drawn muted.
    Placeholder,
}

/// What the renderer can see besides the cell itself.
pub struct RenderContext<'a> {
    /// Visible columns, indexed like sheet columns.
    pub columns: &'a [&'a ColumnDescriptor],
    pub rows: &'a [RowRecord],
    pub chrome: &'a ChromeState,
}

pub fn render_cell(cell: &SheetCell, row: usize, col: usize, ctx: &RenderContext) -> Rendered {
    let column = ctx.columns.get(col).copied();

    if row == 0 || cell.row_index.is_none() {
        let hovered = ctx.chrome.hovered_column.as_deref() == Some(cell.column_key.as_str());
        let affordances = match column {
            Some(column) if hovered => HeaderAffordances {
                hide: column.can_hide(),
                delete: column.can_delete(),
                resize: ctx.chrome.enable_column_resize,
            },
            _ => HeaderAffordances::default(),
        };
        return Rendered::Header {
            label: cell.value.to_string(),
            affordances,
        };
    }

    if let DisplayValue::Error(_) = cell.display {
        return Rendered::Error {
            glyph: ERROR_GLYPH,
        };
    }

    let selected = cell.value.to_input_string();
    match column.map(|c| &c.kind) {
        Some(ColumnKind::Select { options }) => {
            return Rendered::Choice {
                selected,
                options: options.clone(),
            };
        }
        Some(ColumnKind::CapacityBucket(buckets)) => {
            if let Some(index) = cell.row_index.filter(|i| *i < ctx.rows.len()) {
                return Rendered::Choice {
                    options: buckets.choices(&cell.column_key, ctx.rows, index),
                    selected,
                };
            }
        }
        _ => {}
    }

    let text = cell.display.text();
    if text.is_empty() {
        Rendered::Placeholder
    } else {
        Rendered::Text(text)
    }
}
