//! Formula enrichment of derived cells.

use serde::{Deserialize, Serialize};
use tourgrid_engine::engine::{AddOn, CellValue, Evaluation, FormulaError, RowContext, evaluate};

use crate::column::RowRecord;

/// What a cell shows.
#[derive(Clone, Debug, PartialEq)]
pub enum DisplayValue {
    /// The stored value, shown as is.
    Value(CellValue),
    /// Result of the cell's formula.
    Computed(CellValue),
    Error(FormulaError),
}

impl DisplayValue {
    pub fn is_error(&self) -> bool {
        matches!(self, DisplayValue::Error(_))
    }

    pub fn text(&self) -> String {
        match self {
            DisplayValue::Value(v) | DisplayValue::Computed(v) => v.to_string(),
            DisplayValue::Error(e) => Evaluation::Error(e.clone()).display(),
        }
    }
}

/// Page-level values every formula can read.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FormulaInputs {
    #[serde(default)]
    pub add_ons: Vec<AddOn>,
    #[serde(default)]
    pub base_price: f64,
}

impl FormulaInputs {
    pub fn context(&self, row: &RowRecord) -> RowContext {
        RowContext::for_row(row, &self.add_ons, self.base_price)
    }
}

pub fn display_value(value: &CellValue, row: &RowRecord, inputs: &FormulaInputs) -> DisplayValue {
    let Some(formula) = value.as_formula() else {
        return DisplayValue::Value(value.clone());
    };
    match evaluate(formula, &inputs.context(row)) {
        Evaluation::Number(n) => DisplayValue::Computed(CellValue::Number(n)),
        Evaluation::Text(s) => DisplayValue::Computed(CellValue::Text(s)),
        Evaluation::Error(e) => DisplayValue::Error(e),
    }
}
