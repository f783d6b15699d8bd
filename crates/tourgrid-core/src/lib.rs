//! tourgrid-core - UI-agnostic editable data grid.
//!
//! Column descriptors and rows go in; a derived cell matrix with evaluated
//! formulas, rendering descriptions, and host callbacks come out.

pub mod bucket;
pub mod column;
pub mod error;
pub mod grid;
pub mod interaction;
pub mod render;
pub mod storage;

pub use bucket::{Bucket, BucketColumn, BucketUsage};
pub use column::{ColumnDescriptor, ColumnKind, ColumnProtection, RowRecord, SelectOption};
pub use error::{GridError, Result};
pub use grid::{
    CellClass, DEFAULT_COLUMN_WIDTH, DataGrid, DisplayValue, GridHost, GridProps, SheetCell,
};
pub use interaction::{CellChange, CellEdit, CellPos, DragState, GridKey, MIN_COLUMN_WIDTH};
pub use render::{ChromeState, ERROR_GLYPH, Rendered};
pub use storage::{FileWidthStore, MemoryWidthStore, WidthStore};

pub use tourgrid_engine::engine::{AddOn, CellValue};
