//! Clipboard paste parsing.

use super::edit::CellEdit;

/// Split clipboard text into rows (on `\r\n`, `\n`, or `\r`) and each row
/// into cells (on tab). Ragged rows are kept as they are.
///
/// Unlike a plain split, a single trailing empty line is dropped, so text
/// ending in a line break does not paste an extra blank row.
pub fn parse_paste(text: &str) -> Vec<Vec<String>> {
    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines: Vec<&str> = normalized.split('\n').collect();
    if lines.last() == Some(&"") {
        lines.pop();
    }
    lines
        .into_iter()
        .map(|line| line.split('\t').map(str::to_string).collect())
        .collect()
}

/// Lay a parsed matrix out from `anchor` (sheet row, visible column).
/// Cells falling outside `sheet_rows` x `cols` are dropped.
pub fn paste_edits(
    matrix: &[Vec<String>],
    anchor: (usize, usize),
    sheet_rows: usize,
    cols: usize,
) -> Vec<CellEdit> {
    let (anchor_row, anchor_col) = anchor;
    let mut edits = Vec::new();
    for (dr, cells) in matrix.iter().enumerate() {
        let row = anchor_row + dr;
        if row >= sheet_rows {
            break;
        }
        for (dc, value) in cells.iter().enumerate() {
            let col = anchor_col + dc;
            if col >= cols {
                break;
            }
            edits.push(CellEdit::new(row, col, value));
        }
    }
    edits
}
