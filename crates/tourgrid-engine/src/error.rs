//! Error types for formula evaluation.

use thiserror::Error;

/// Why a formula could not produce a value.
///
/// These never escape [`evaluate`](crate::engine::evaluate) as an `Err`; they
/// are carried inside [`Evaluation::Error`](crate::engine::Evaluation::Error).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    #[error("Not a formula (missing leading '=')")]
    NotAFormula,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Circular reference through field: {0}")]
    CircularReference(String),

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Division by zero")]
    DivideByZero,

    #[error("Arithmetic error: {0}")]
    Arithmetic(String),

    #[error("Formula too complex")]
    TooComplex,

    #[error("Evaluation error: {0}")]
    Runtime(String),
}

pub type Result<T> = std::result::Result<T, FormulaError>;
