//! Keyboard navigation between cells.
//!
//! Positions are sheet coordinates: data rows are `1..=row_count`, columns
//! index the visible columns.

/// Keys the grid reacts to, independent of any terminal or windowing crate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GridKey {
    Up,
    Down,
    Left,
    Right,
    Tab,
    BackTab,
    Enter,
    Escape,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

impl CellPos {
    pub fn new(row: usize, col: usize) -> Self {
        CellPos { row, col }
    }

    /// Clamp into the data area. Returns `None` if there is no data cell.
    pub fn clamped(self, row_count: usize, col_count: usize) -> Option<CellPos> {
        if row_count == 0 || col_count == 0 {
            return None;
        }
        Some(CellPos {
            row: self.row.clamp(1, row_count),
            col: self.col.min(col_count - 1),
        })
    }
}

/// Arrow-key move by one cell, stopping at the data area's edges.
pub fn arrow(pos: CellPos, key: GridKey, row_count: usize, col_count: usize) -> CellPos {
    let Some(pos) = pos.clamped(row_count, col_count) else {
        return pos;
    };
    match key {
        GridKey::Up if pos.row > 1 => CellPos::new(pos.row - 1, pos.col),
        GridKey::Down if pos.row < row_count => CellPos::new(pos.row + 1, pos.col),
        GridKey::Left if pos.col > 0 => CellPos::new(pos.row, pos.col - 1),
        GridKey::Right if pos.col + 1 < col_count => CellPos::new(pos.row, pos.col + 1),
        _ => pos,
    }
}

/// Tab / Shift+Tab through `order` (visible column indices in editable-fields
/// order). Crosses to the next or previous row at the ends and stops at the
/// first and last cell of the sheet.
pub fn tab(pos: CellPos, forward: bool, order: &[usize], row_count: usize) -> CellPos {
    let (Some(&first), Some(&last)) = (order.first(), order.last()) else {
        return pos;
    };
    if row_count == 0 {
        return pos;
    }
    let row = pos.row.clamp(1, row_count);

    match order.iter().position(|&c| c == pos.col) {
        Some(i) if forward => match order.get(i + 1) {
            Some(&next) => CellPos::new(row, next),
            None if row < row_count => CellPos::new(row + 1, first),
            None => CellPos::new(row, last),
        },
        Some(i) => match i.checked_sub(1).and_then(|p| order.get(p)) {
            Some(&prev) => CellPos::new(row, prev),
            None if row > 1 => CellPos::new(row - 1, last),
            None => CellPos::new(row, first),
        },
        // Not on an editable field: jump to the row's first or last one.
        None if forward => CellPos::new(row, first),
        None => CellPos::new(row, last),
    }
}
