//! Markdown export of the evaluated sheet

use std::io::Write;
use std::path::Path;
use tourgrid_core::{DataGrid, GridHost, WidthStore};

/// Write the visible columns and evaluated rows as a markdown table
pub fn write_markdown<H: GridHost, S: WidthStore>(
    path: &Path,
    grid: &DataGrid<H, S>,
) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    render_markdown(&mut file, grid)
}

pub fn render_markdown<W: Write, H: GridHost, S: WidthStore>(
    w: &mut W,
    grid: &DataGrid<H, S>,
) -> std::io::Result<()> {
    let sheet = grid.sheet();
    writeln!(w, "# {}", escape_markdown(grid.grid_id()))?;
    writeln!(w)?;

    let Some((header, rows)) = sheet.split_first().filter(|(h, _)| !h.is_empty()) else {
        writeln!(w, "*No columns*")?;
        return Ok(());
    };

    write!(w, "| # |")?;
    for cell in header {
        write!(w, " {} |", escape_markdown(&cell.display.text()))?;
    }
    writeln!(w)?;

    write!(w, "|---|")?;
    for _ in header {
        write!(w, "---|")?;
    }
    writeln!(w)?;

    for (i, row) in rows.iter().enumerate() {
        write!(w, "| {} |", i + 1)?;
        for cell in row {
            write!(w, " {} |", escape_markdown(&cell.display.text()))?;
        }
        writeln!(w)?;
    }
    Ok(())
}

/// Escape special markdown characters in cell content
fn escape_markdown(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ").replace('\r', "")
}
