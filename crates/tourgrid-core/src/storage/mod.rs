//! Persisted grid layout.

mod widths;

pub use widths::{
    ColumnWidths, FileWidthStore, MemoryWidthStore, WIDTH_KEY_PREFIX, WidthStore, load_widths,
    save_widths, width_key,
};
