//! Formula engine API.
//!
//! This module provides the row-context formula evaluator:
//!
//! - [`CellValue`] - Scalar values stored in row fields
//! - [`RowContext`], [`AddOn`] - Variables a formula can reference
//! - [`preprocess_formula`] - Transform formulas for Rhai evaluation
//! - [`extract_fields`] - List the fields a formula reads
//! - [`evaluate`], [`FormulaEngine`] - Evaluate a formula to an [`Evaluation`]
//! - [`format_number`] - Format numbers for display

mod context;
mod eval;
mod format;
mod preprocess;
mod value;

pub use context::{ADD_ONS_TOTAL_FIELD, AddOn, BASE_PRICE_FIELD, RowContext};
pub use eval::{Evaluation, FormulaEngine, create_engine, evaluate};
pub use format::{ERROR_SENTINEL, format_number};
pub use preprocess::{FIELD_FN, ROW_BINDING, extract_fields, preprocess_formula};
pub use value::CellValue;

pub use crate::builtins::builtin_help;
pub use crate::error::FormulaError;
