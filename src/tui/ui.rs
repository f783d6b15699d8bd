//! UI rendering

use super::app::{App, Mode, PX_PER_CHAR};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};
use tourgrid_core::interaction::CellPos;
use tourgrid_core::render::HeaderAffordances;
use tourgrid_core::{Rendered, WidthStore};

pub(crate) const FORMULA_BAR_HEIGHT: u16 = 3;
pub(crate) const GRID_MIN_HEIGHT: u16 = 5;
pub(crate) const STATUS_BAR_HEIGHT: u16 = 1;
pub(crate) const ROW_HEADER_WIDTH: u16 = 4;
pub(crate) const GRID_COLUMN_SPACING: u16 = 1;

const PLACEHOLDER: &str = "·";

pub(crate) fn split_main_chunks(area: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(FORMULA_BAR_HEIGHT),
            Constraint::Min(GRID_MIN_HEIGHT),
            Constraint::Length(STATUS_BAR_HEIGHT),
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

/// Terminal columns used by a column of `px` grid width.
pub(crate) fn char_width(px: u32) -> u16 {
    (px / PX_PER_CHAR).clamp(1, u32::from(u16::MAX)) as u16
}

/// Where a visible column is drawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ColumnSpan {
    pub col: usize,
    pub x: u16,
    pub width: u16,
}

/// Screen spans of the columns that fit in `grid_area`, from the viewport on.
pub(crate) fn column_spans<S: WidthStore>(app: &App<S>, grid_area: Rect) -> Vec<ColumnSpan> {
    let inner_x = grid_area.x.saturating_add(1);
    let inner_right = grid_area
        .x
        .saturating_add(grid_area.width)
        .saturating_sub(1);
    let mut x = inner_x
        .saturating_add(ROW_HEADER_WIDTH)
        .saturating_add(GRID_COLUMN_SPACING);

    let mut spans = Vec::new();
    for (col, column) in app
        .grid
        .visible_columns()
        .iter()
        .enumerate()
        .skip(app.viewport_col)
    {
        if x >= inner_right {
            break;
        }
        let width = char_width(app.grid.column_width(&column.key)).min(inner_right - x);
        spans.push(ColumnSpan { col, x, width });
        x = x
            .saturating_add(width)
            .saturating_add(GRID_COLUMN_SPACING);
    }
    spans
}

/// What the mouse is over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum GridHit {
    /// A header cell; `handle` is its resize handle on the right edge.
    Header { col: usize, handle: bool },
    /// The row-number gutter of a sheet row, used to drag rows.
    RowHandle(usize),
    Cell(CellPos),
}

pub(crate) fn hit_test<S: WidthStore>(
    app: &App<S>,
    grid_area: Rect,
    mouse_col: u16,
    mouse_row: u16,
) -> Option<GridHit> {
    if grid_area.width < 3 || grid_area.height < 3 {
        return None;
    }
    let inner_x = grid_area.x.saturating_add(1);
    let inner_y = grid_area.y.saturating_add(1);
    let inner_right = grid_area.x + grid_area.width - 1;
    let inner_bottom = grid_area.y + grid_area.height - 1;
    if mouse_col < inner_x
        || mouse_col >= inner_right
        || mouse_row < inner_y
        || mouse_row >= inner_bottom
    {
        return None;
    }

    let sheet_row = if mouse_row == inner_y {
        0
    } else {
        let row = app.viewport_row + usize::from(mouse_row - inner_y - 1) + 1;
        if row > app.grid.rows().len() {
            return None;
        }
        row
    };

    if mouse_col < inner_x + ROW_HEADER_WIDTH {
        return (sheet_row > 0).then_some(GridHit::RowHandle(sheet_row));
    }

    for span in column_spans(app, grid_area) {
        let end = span.x + span.width;
        let on_cell = mouse_col >= span.x && mouse_col < end;
        let on_gap = mouse_col == end;
        if !(on_cell || on_gap) {
            continue;
        }
        return match sheet_row {
            0 => Some(GridHit::Header {
                col: span.col,
                handle: on_gap || mouse_col + 1 == end,
            }),
            _ if on_cell => Some(GridHit::Cell(CellPos::new(sheet_row, span.col))),
            _ => None,
        };
    }
    None
}

/// Draw the application UI
pub fn draw<S: WidthStore>(f: &mut Frame, app: &mut App<S>) {
    let [formula_area, grid_area, status_area] = split_main_chunks(f.area());

    // Header row and borders take three lines.
    app.visible_rows = usize::from(grid_area.height.saturating_sub(3)).max(1);
    app.visible_cols = column_spans(app, grid_area).len().max(1);
    app.update_viewport();

    draw_formula_bar(f, app, formula_area);
    draw_grid(f, app, grid_area);
    draw_status_bar(f, app, status_area);
}

fn draw_formula_bar<S: WidthStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let (title, color) = match app.mode() {
        Mode::Edit => (" Edit ", Color::Yellow),
        Mode::Normal => (" Cell ", Color::White),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .border_style(Style::default().fg(color));
    f.render_widget(Paragraph::new(app.formula_bar_text()).block(block), area);
}

fn header_text(label: &str, affordances: HeaderAffordances) -> String {
    let mut text = label.to_string();
    if affordances.hide {
        text.push_str(" [h]");
    }
    if affordances.delete {
        text.push_str(" [x]");
    }
    if affordances.resize {
        text.push_str(" ↔");
    }
    text
}

fn cell_text(rendered: &Rendered) -> (String, Style) {
    match rendered {
        Rendered::Header { label, affordances } => (
            header_text(label, *affordances),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Rendered::Error { glyph } => (glyph.to_string(), Style::default().fg(Color::Red)),
        Rendered::Choice { selected, options } => {
            let label = options
                .iter()
                .find(|o| o.value == *selected)
                .map(|o| o.label.as_str())
                .unwrap_or(selected.as_str());
            (format!("{} ▾", label), Style::default())
        }
        Rendered::Text(text) => (text.clone(), Style::default()),
        Rendered::Placeholder => (
            PLACEHOLDER.to_string(),
            Style::default().fg(Color::DarkGray),
        ),
    }
}

fn draw_grid<S: WidthStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let rendered = app.grid.render_sheet();
    let spans = column_spans(app, area);
    let cursor = app.cursor();
    let columns = app.grid.visible_columns();
    let dragged_row = app.grid.drag_state().dragged_row();
    let dragged_column = app.grid.drag_state().dragged_column();

    let mut header_cells = vec![Cell::from(" ")];
    if let Some(header) = rendered.first() {
        for span in &spans {
            let Some(cell) = header.get(span.col) else {
                continue;
            };
            let (text, mut style) = cell_text(cell);
            let key = columns.get(span.col).map(|c| c.key.as_str());
            if dragged_column.is_some() && key == dragged_column {
                style = style.fg(Color::Magenta);
            } else if span.col == cursor.col {
                style = style.fg(Color::Black).bg(Color::White);
            } else {
                style = style.fg(Color::Gray);
            }
            header_cells.push(Cell::from(text).style(style));
        }
    }
    let header = Row::new(header_cells).height(1);

    let mut rows = Vec::new();
    let first = app.viewport_row + 1;
    let last = (app.viewport_row + app.visible_rows).min(app.grid.rows().len());
    for sheet_row in first..=last {
        let Some(cells) = rendered.get(sheet_row) else {
            break;
        };
        let gutter_style = if dragged_row == Some(sheet_row) {
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD)
        } else if sheet_row == cursor.row {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let mut row_cells = vec![Cell::from(format!("{}", sheet_row)).style(gutter_style)];

        for span in &spans {
            let Some(cell) = cells.get(span.col) else {
                continue;
            };
            let (text, mut style) = cell_text(cell);
            let read_only = columns.get(span.col).is_some_and(|c| c.is_read_only());
            if sheet_row == cursor.row && span.col == cursor.col {
                style = style
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD);
            } else if dragged_row == Some(sheet_row) {
                style = style.bg(Color::DarkGray);
            } else if read_only && !matches!(cell, Rendered::Error { .. }) {
                style = style.fg(Color::Gray);
            }
            row_cells.push(Cell::from(text).style(style));
        }
        rows.push(Row::new(row_cells));
    }

    let mut widths = vec![Constraint::Length(ROW_HEADER_WIDTH)];
    widths.extend(spans.iter().map(|s| Constraint::Length(s.width)));

    let title = format!(" {} ", app.grid.grid_id());
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .column_spacing(GRID_COLUMN_SPACING);
    f.render_widget(table, area);
}

fn status_hint(mode: Mode) -> &'static str {
    match mode {
        Mode::Edit => "Enter/Tab:commit  Esc:cancel  arrows:commit+move",
        Mode::Normal => {
            "Enter:edit  Tab:next  Space:choice  y:copy  p:paste  H:hide  U:unhide  D:delete col  </>:width  K/J:move row  q:quit"
        }
    }
}

fn draw_status_bar<S: WidthStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let file_info = app
        .grid
        .host()
        .path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "[unsaved]".to_string());

    let status = if app.status_message.is_empty() {
        format!("{}  |  {}", file_info, status_hint(app.mode()))
    } else {
        app.status_message.clone()
    };

    let style = if app.status_message.starts_with("Error") {
        Style::default().fg(Color::Red)
    } else if !app.status_message.is_empty() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let paragraph = Paragraph::new(Line::from(vec![Span::styled(status, style)]));
    f.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::document::{DocumentHost, GridDocument};
    use crate::tui::clipboard::MemoryClipboard;
    use tourgrid_core::{DataGrid, MemoryWidthStore};

    fn app() -> App<MemoryWidthStore> {
        let doc: GridDocument = serde_json::from_str(
            r#"{
                "grid_id": "t",
                "columns": [
                    {"key": "a", "label": "A", "type": "text"},
                    {"key": "b", "label": "B", "type": "text", "width": 40}
                ],
                "rows": [{"a": "1"}, {"a": "2"}]
            }"#,
        )
        .unwrap();
        let props = doc.props(&Settings::default());
        let grid = DataGrid::new(props, DocumentHost::new(doc, None), MemoryWidthStore::new())
            .unwrap();
        App::new(grid, Box::new(MemoryClipboard::default()))
    }

    #[test]
    fn test_column_spans() {
        let app = app();
        let area = Rect::new(0, 0, 80, 10);
        // Border, gutter, and spacing come first.
        assert_eq!(
            column_spans(&app, area),
            vec![
                ColumnSpan { col: 0, x: 6, width: 12 },
                ColumnSpan { col: 1, x: 19, width: 5 },
            ]
        );
    }

    #[test]
    fn test_hit_test() {
        let app = app();
        let area = Rect::new(0, 0, 80, 10);
        assert_eq!(
            hit_test(&app, area, 7, 1),
            Some(GridHit::Header { col: 0, handle: false })
        );
        assert_eq!(
            hit_test(&app, area, 18, 1),
            Some(GridHit::Header { col: 0, handle: true })
        );
        assert_eq!(
            hit_test(&app, area, 8, 3),
            Some(GridHit::Cell(CellPos::new(2, 0)))
        );
        assert_eq!(hit_test(&app, area, 2, 2), Some(GridHit::RowHandle(1)));
        assert_eq!(hit_test(&app, area, 2, 1), None);
        assert_eq!(hit_test(&app, area, 8, 5), None);
    }
}
