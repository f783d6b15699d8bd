//! Terminal front end: ratatui drawing, crossterm keyboard and mouse input.

mod app;
pub mod clipboard;
mod input;
mod ui;

pub use app::App;

use crossterm::{
    ExecutableCommand,
    event::{DisableMouseCapture, EnableMouseCapture},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{self, stdout};
use tourgrid_core::WidthStore;

/// Take over the terminal and run the app until the user quits.
pub fn run<S: WidthStore>(app: &mut App<S>) -> io::Result<()> {
    terminal::enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;

    struct Cleanup;
    impl Drop for Cleanup {
        fn drop(&mut self) {
            let _ = stdout().execute(DisableMouseCapture);
            let _ = stdout().execute(LeaveAlternateScreen);
            let _ = terminal::disable_raw_mode();
        }
    }
    let _cleanup = Cleanup;

    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    input::run_app(&mut terminal, app)
}
