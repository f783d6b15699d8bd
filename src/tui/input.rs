use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use ratatui::prelude::*;
use std::io;
use tourgrid_core::{GridKey, WidthStore};

use super::app::{App, Mode, PX_PER_CHAR, PointerDrag};
use super::ui::{self, GridHit};

/// Mouse x in grid pixels.
fn px(column: u16) -> i32 {
    i32::from(column) * PX_PER_CHAR as i32
}

fn column_key<S: WidthStore>(app: &App<S>, col: usize) -> Option<String> {
    app.grid
        .visible_columns()
        .get(col)
        .map(|c| c.key.clone())
}

fn grid_key(key: KeyEvent) -> Option<GridKey> {
    match key.code {
        KeyCode::Up => Some(GridKey::Up),
        KeyCode::Down => Some(GridKey::Down),
        KeyCode::Left => Some(GridKey::Left),
        KeyCode::Right => Some(GridKey::Right),
        KeyCode::Tab if key.modifiers.contains(KeyModifiers::SHIFT) => Some(GridKey::BackTab),
        KeyCode::Tab => Some(GridKey::Tab),
        KeyCode::BackTab => Some(GridKey::BackTab),
        KeyCode::Enter => Some(GridKey::Enter),
        KeyCode::Esc => Some(GridKey::Escape),
        _ => None,
    }
}

pub(crate) fn handle_key_event<S: WidthStore>(app: &mut App<S>, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }
    if ctrl && key.code == KeyCode::Char('v') {
        app.paste();
        return;
    }

    app.status_message.clear();
    if let Some(grid_key) = grid_key(key) {
        app.key(grid_key);
        return;
    }

    match app.mode() {
        Mode::Edit => match key.code {
            KeyCode::Backspace => app.backspace(),
            KeyCode::Char(c) if !ctrl => app.type_char(c),
            _ => {}
        },
        Mode::Normal => match key.code {
            KeyCode::Char('q') => app.should_quit = true,
            KeyCode::Char('y') => app.copy(),
            KeyCode::Char('p') => app.paste(),
            KeyCode::Char(' ') => app.cycle_choice(true),
            KeyCode::Char('H') => app.hide_current_column(),
            KeyCode::Char('U') => app.show_all_columns(),
            KeyCode::Char('D') => app.delete_current_column(),
            KeyCode::Char('>') => app.resize_current_column(true),
            KeyCode::Char('<') => app.resize_current_column(false),
            KeyCode::Char('K') => app.move_current_row(false),
            KeyCode::Char('J') => app.move_current_row(true),
            KeyCode::Delete | KeyCode::Backspace => app.clear_cell(),
            KeyCode::Char(c) if !ctrl => app.type_char(c),
            _ => {}
        },
    }
}

pub(crate) fn handle_mouse_event<S: WidthStore>(
    app: &mut App<S>,
    terminal_area: Rect,
    mouse: MouseEvent,
) {
    let [_formula_area, grid_area, _status_area] = ui::split_main_chunks(terminal_area);
    let hit = ui::hit_test(app, grid_area, mouse.column, mouse.row);
    match mouse.kind {
        MouseEventKind::Moved => {
            let hovered = match hit {
                Some(GridHit::Header { col, .. }) => column_key(app, col),
                _ => None,
            };
            app.grid.set_hovered_column(hovered.as_deref());
        }
        MouseEventKind::Down(MouseButton::Left) => {
            app.status_message.clear();
            match hit {
                Some(GridHit::Header { col, handle: true }) => {
                    if let Some(key) = column_key(app, col) {
                        if app.grid.begin_resize(&key, px(mouse.column)) {
                            app.pointer = PointerDrag::Resize;
                        }
                    }
                }
                Some(GridHit::Header { col, handle: false }) => {
                    if let Some(key) = column_key(app, col) {
                        if app.grid.begin_column_drag(&key) {
                            app.pointer = PointerDrag::Column;
                        }
                    }
                }
                Some(GridHit::RowHandle(row)) => {
                    if app.grid.begin_row_drag(row) {
                        app.pointer = PointerDrag::Row;
                    }
                }
                Some(GridHit::Cell(pos)) => {
                    // Clicking away is a blur: it commits the edit.
                    app.grid.commit_edit();
                    app.grid.select(pos.row, pos.col);
                    app.sync_status();
                }
                None => {}
            }
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            if app.pointer == PointerDrag::Resize {
                app.grid.track_resize(px(mouse.column));
            }
        }
        MouseEventKind::Up(MouseButton::Left) => {
            match std::mem::take(&mut app.pointer) {
                PointerDrag::Resize => {
                    if let Some(width) = app.grid.end_resize(px(mouse.column)) {
                        app.status_message = format!("width {}", width);
                    }
                }
                PointerDrag::Row => {
                    let target = match hit {
                        Some(GridHit::RowHandle(row)) => Some(row),
                        Some(GridHit::Cell(pos)) => Some(pos.row),
                        _ => None,
                    };
                    match target {
                        Some(row) if app.grid.drop_row(row) => {
                            let col = app.cursor().col;
                            app.grid.select(row, col);
                        }
                        Some(_) => {}
                        None => app.grid.end_drag(),
                    }
                }
                PointerDrag::Column => {
                    let target = match hit {
                        Some(GridHit::Header { col, .. }) => column_key(app, col),
                        Some(GridHit::Cell(pos)) => column_key(app, pos.col),
                        _ => None,
                    };
                    match target {
                        Some(key) => {
                            app.grid.drop_column(&key);
                        }
                        None => app.grid.end_drag(),
                    }
                }
                PointerDrag::None => {}
            }
            app.sync_status();
        }
        _ => {}
    }
}

pub fn run_app<B: Backend, S: WidthStore>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        match event::read()? {
            Event::Key(key) => {
                // Only process key press events (Windows reports Press + Release)
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                handle_key_event(app, key);
            }
            Event::Mouse(mouse) => {
                let size = terminal.size()?;
                handle_mouse_event(app, Rect::new(0, 0, size.width, size.height), mouse);
            }
            _ => {}
        }

        if app.should_quit {
            // Leaving is a blur too.
            app.grid.commit_edit();
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::document::{DocumentHost, GridDocument};
    use crate::tui::clipboard::MemoryClipboard;
    use crossterm::event::KeyEventState;
    use tourgrid_core::{CellValue, DataGrid, MemoryWidthStore};

    fn app() -> App<MemoryWidthStore> {
        let doc: GridDocument = serde_json::from_str(
            r#"{
                "grid_id": "t",
                "columns": [
                    {"key": "a", "label": "A", "type": "text"},
                    {"key": "b", "label": "B", "type": "text"}
                ],
                "rows": [{"a": "1"}, {"a": "2"}, {"a": "3"}]
            }"#,
        )
        .unwrap();
        let props = doc.props(&Settings::default());
        let grid = DataGrid::new(props, DocumentHost::new(doc, None), MemoryWidthStore::new())
            .unwrap();
        App::new(grid, Box::new(MemoryClipboard::default()))
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    // 80x20 terminal: the grid block starts at y=3, its header on y=4.
    const AREA: Rect = Rect {
        x: 0,
        y: 0,
        width: 80,
        height: 20,
    };

    #[test]
    fn test_type_and_commit_with_tab() {
        let mut app = app();
        handle_key_event(&mut app, press(KeyCode::Char('9')));
        handle_key_event(&mut app, press(KeyCode::Tab));
        assert_eq!(app.grid.rows()[0]["a"], CellValue::text("9"));
        assert_eq!(app.cursor().col, 1);
    }

    #[test]
    fn test_escape_discards_typing() {
        let mut app = app();
        handle_key_event(&mut app, press(KeyCode::Char('9')));
        handle_key_event(&mut app, press(KeyCode::Esc));
        assert_eq!(app.grid.rows()[0]["a"], CellValue::text("1"));
    }

    #[test]
    fn test_q_only_quits_outside_edit() {
        let mut app = app();
        handle_key_event(&mut app, press(KeyCode::Enter));
        handle_key_event(&mut app, press(KeyCode::Char('q')));
        assert!(!app.should_quit);
        handle_key_event(&mut app, press(KeyCode::Esc));
        handle_key_event(&mut app, press(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_mouse_resize() {
        let mut app = app();
        // Column "a" spans x 6..18; its handle is the gap at x=18.
        handle_mouse_event(&mut app, AREA, mouse(MouseEventKind::Down(MouseButton::Left), 18, 4));
        assert_eq!(app.pointer, PointerDrag::Resize);
        handle_mouse_event(&mut app, AREA, mouse(MouseEventKind::Drag(MouseButton::Left), 20, 4));
        assert_eq!(app.grid.column_width("a"), 116);
        handle_mouse_event(&mut app, AREA, mouse(MouseEventKind::Up(MouseButton::Left), 23, 4));
        assert_eq!(app.grid.column_width("a"), 140);
        assert_eq!(app.pointer, PointerDrag::None);
    }

    #[test]
    fn test_mouse_row_drag() {
        let mut app = app();
        handle_mouse_event(&mut app, AREA, mouse(MouseEventKind::Down(MouseButton::Left), 2, 5));
        assert_eq!(app.pointer, PointerDrag::Row);
        handle_mouse_event(&mut app, AREA, mouse(MouseEventKind::Up(MouseButton::Left), 2, 7));
        let order: Vec<String> = app.grid.rows().iter().map(|r| r["a"].to_string()).collect();
        assert_eq!(order, vec!["2", "3", "1"]);
        assert_eq!(app.cursor().row, 3);
    }

    #[test]
    fn test_mouse_column_drag() {
        let mut app = app();
        handle_mouse_event(&mut app, AREA, mouse(MouseEventKind::Down(MouseButton::Left), 8, 4));
        assert_eq!(app.pointer, PointerDrag::Column);
        handle_mouse_event(&mut app, AREA, mouse(MouseEventKind::Up(MouseButton::Left), 21, 4));
        let keys: Vec<&str> = app.grid.columns().iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }

    #[test]
    fn test_hover_sets_header_chrome() {
        let mut app = app();
        handle_mouse_event(&mut app, AREA, mouse(MouseEventKind::Moved, 8, 4));
        assert_eq!(app.grid.chrome().hovered_column.as_deref(), Some("a"));
        handle_mouse_event(&mut app, AREA, mouse(MouseEventKind::Moved, 8, 6));
        assert_eq!(app.grid.chrome().hovered_column, None);
    }
}
