//! Cell editing: the single-cell edit cursor and applying edits to rows.

use serde::{Deserialize, Serialize};
use tourgrid_engine::engine::CellValue;

use crate::column::{ColumnDescriptor, RowRecord};
use crate::error::{GridError, Result};

/// Raw input for one cell, in sheet coordinates (row 0 is the header,
/// `col` indexes the visible columns).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellEdit {
    pub row: usize,
    pub col: usize,
    pub value: String,
}

impl CellEdit {
    pub fn new(row: usize, col: usize, value: &str) -> Self {
        CellEdit {
            row,
            col,
            value: value.to_string(),
        }
    }
}

/// An edit that was applied: data row index, column key, stored value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellChange {
    pub row: usize,
    pub column: String,
    pub value: CellValue,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveEdit {
    pub row: usize,
    pub col: usize,
    pub buffer: String,
}

/// At most one cell is being edited.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EditCursor {
    editing: Option<ActiveEdit>,
}

impl EditCursor {
    pub fn active(&self) -> Option<&ActiveEdit> {
        self.editing.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// Start editing a cell. An edit already in progress elsewhere is ended
    /// and returned so the caller can commit it.
    pub fn begin(&mut self, row: usize, col: usize, initial: String) -> Option<CellEdit> {
        if let Some(active) = &self.editing {
            if active.row == row && active.col == col {
                return None;
            }
        }
        let previous = self.commit();
        self.editing = Some(ActiveEdit {
            row,
            col,
            buffer: initial,
        });
        previous
    }

    pub fn push(&mut self, c: char) {
        if let Some(active) = &mut self.editing {
            active.buffer.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(active) = &mut self.editing {
            active.buffer.pop();
        }
    }

    pub fn set_buffer(&mut self, text: &str) {
        if let Some(active) = &mut self.editing {
            active.buffer = text.to_string();
        }
    }

    /// End the edit, returning it for commit.
    pub fn commit(&mut self) -> Option<CellEdit> {
        self.editing.take().map(|active| CellEdit {
            row: active.row,
            col: active.col,
            value: active.buffer,
        })
    }

    /// End the edit, discarding the buffer.
    pub fn cancel(&mut self) {
        self.editing = None;
    }
}

/// Apply one edit to `rows`. `columns` are the visible columns.
pub fn apply_edit(
    columns: &[&ColumnDescriptor],
    rows: &mut [RowRecord],
    edit: &CellEdit,
) -> Result<CellChange> {
    if edit.row == 0 {
        return Err(GridError::HeaderRow);
    }
    let index = edit.row - 1;
    let len = rows.len();
    if index >= len {
        return Err(GridError::RowOutOfBounds { index, len });
    }
    let column = columns
        .get(edit.col)
        .ok_or_else(|| GridError::UnknownColumn(format!("#{}", edit.col)))?;
    if column.is_read_only() {
        return Err(GridError::ReadOnlyColumn(column.key.clone()));
    }
    let value = CellValue::from_input(&edit.value);
    if let Some(buckets) = column.bucket_column() {
        let wanted = value.to_input_string();
        if !buckets.can_assign(&column.key, &wanted, rows, index) {
            return Err(GridError::BucketFull(wanted));
        }
    }

    rows[index].insert(column.key.clone(), value.clone());
    Ok(CellChange {
        row: index,
        column: column.key.clone(),
        value,
    })
}

/// Apply edits in order, skipping the ones that cannot be applied.
pub fn apply_edits(
    columns: &[&ColumnDescriptor],
    rows: &mut [RowRecord],
    edits: &[CellEdit],
) -> Vec<CellChange> {
    edits
        .iter()
        .filter_map(|edit| match apply_edit(columns, rows, edit) {
            Ok(change) => Some(change),
            Err(e) => {
                log::debug!("skipping edit at ({}, {}): {}", edit.row, edit.col, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bucket::{Bucket, BucketColumn};

    fn columns() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::text("name", "Name"),
            ColumnDescriptor::text("total", "Total").with_read_only(),
            ColumnDescriptor::bucket(
                "room",
                "Room",
                BucketColumn::new(vec![Bucket::new("101", 1)]),
            ),
        ]
    }

    #[test]
    fn test_begin_commits_previous_edit() {
        let mut cursor = EditCursor::default();
        assert_eq!(cursor.begin(1, 0, "Ada".to_string()), None);
        cursor.push('!');
        let previous = cursor.begin(2, 0, String::new());
        assert_eq!(previous, Some(CellEdit::new(1, 0, "Ada!")));
        assert_eq!(cursor.active().map(|a| a.row), Some(2));
    }

    #[test]
    fn test_begin_same_cell_keeps_buffer() {
        let mut cursor = EditCursor::default();
        cursor.begin(1, 0, "x".to_string());
        assert_eq!(cursor.begin(1, 0, String::new()), None);
        assert_eq!(cursor.active().map(|a| a.buffer.as_str()), Some("x"));
    }

    #[test]
    fn test_cancel_discards() {
        let mut cursor = EditCursor::default();
        cursor.begin(1, 0, "x".to_string());
        cursor.cancel();
        assert_eq!(cursor.commit(), None);
    }

    #[test]
    fn test_apply_skips_header_read_only_and_full_buckets() {
        let columns = columns();
        let visible: Vec<&ColumnDescriptor> = columns.iter().collect();
        let mut rows = vec![RowRecord::new(), RowRecord::new()];

        let changes = apply_edits(
            &visible,
            &mut rows,
            &[
                CellEdit::new(0, 0, "header"),
                CellEdit::new(1, 0, "Ada"),
                CellEdit::new(1, 1, "999"),
                CellEdit::new(1, 2, "101"),
                CellEdit::new(2, 2, "101"),
                CellEdit::new(3, 0, "missing row"),
                CellEdit::new(1, 7, "missing column"),
            ],
        );

        assert_eq!(
            changes,
            vec![
                CellChange {
                    row: 0,
                    column: "name".to_string(),
                    value: CellValue::text("Ada"),
                },
                CellChange {
                    row: 0,
                    column: "room".to_string(),
                    value: CellValue::text("101"),
                },
            ]
        );
        assert!(!rows[0].contains_key("total"));
        assert!(!rows[1].contains_key("room"));
    }

    #[test]
    fn test_blank_input_clears() {
        let columns = columns();
        let visible: Vec<&ColumnDescriptor> = columns.iter().collect();
        let mut rows = vec![RowRecord::new()];
        let change = apply_edit(&visible, &mut rows, &CellEdit::new(1, 0, "  ")).unwrap();
        assert_eq!(change.value, CellValue::Empty);
    }
}
