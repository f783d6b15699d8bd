//! Interaction state machines and pure handlers.
//!
//! Nothing here talks to the host; the [`DataGrid`](crate::DataGrid) facade
//! drives these and reports the results.

pub mod drag;
pub mod edit;
pub mod nav;
pub mod paste;
pub mod resize;

pub use drag::{DragState, move_item};
pub use edit::{ActiveEdit, CellChange, CellEdit, EditCursor, apply_edit, apply_edits};
pub use nav::{CellPos, GridKey, arrow, tab};
pub use paste::{parse_paste, paste_edits};
pub use resize::{MIN_COLUMN_WIDTH, ResizeState, resized_width};
