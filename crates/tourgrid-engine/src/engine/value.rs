//! Scalar cell values.
//!
//! Row records store one [`CellValue`] per column key. A text value that
//! starts with `=` is a formula; everything else is displayed verbatim.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::format::format_number;

/// The content stored in a single row field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn text(text: impl Into<String>) -> CellValue {
        CellValue::Text(text.into())
    }

    /// Parse editor input into a value.
    /// - Empty string or whitespace -> Empty
    /// - Anything else is kept as text, formulas included
    pub fn from_input(input: &str) -> CellValue {
        if input.trim().is_empty() {
            CellValue::Empty
        } else {
            CellValue::Text(input.to_string())
        }
    }

    /// The formula source (including the leading `=`) if this is a formula.
    pub fn as_formula(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) if s.starts_with('=') => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_formula(&self) -> bool {
        self.as_formula().is_some()
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Truthiness used for flag fields (e.g. capacity exemptions).
    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Empty => false,
            CellValue::Bool(b) => *b,
            CellValue::Number(n) => *n != 0.0,
            CellValue::Text(s) => {
                let s = s.trim();
                !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false"))
            }
        }
    }

    /// String shown in an editor for this value.
    pub fn to_input_string(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
            CellValue::Number(n) => write!(f, "{}", format_number(*n)),
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}
