//! Per-row variable context for formula evaluation.
//!
//! A formula sees the fields of its own row plus values supplied by the
//! embedding page: the tour's add-ons (each by key, and their total) and the
//! base price.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::value::CellValue;

/// Name of the base price variable.
pub const BASE_PRICE_FIELD: &str = "base_price";
/// Name of the add-on total variable.
pub const ADD_ONS_TOTAL_FIELD: &str = "add_ons_total";

/// A priced line item attached to the tour (insurance, single supplement, ...).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AddOn {
    /// Identifier usable in formulas.
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: f64,
}

impl AddOn {
    pub fn new(key: &str, price: f64) -> AddOn {
        AddOn {
            key: key.to_string(),
            name: key.to_string(),
            price,
        }
    }
}

/// Variables visible to a formula.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RowContext {
    values: BTreeMap<String, CellValue>,
}

impl RowContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the context for one row. Later sources shadow earlier ones:
    /// add-ons, then `add_ons_total`, then `base_price`, then row fields.
    pub fn for_row(row: &BTreeMap<String, CellValue>, add_ons: &[AddOn], base_price: f64) -> Self {
        let mut ctx = RowContext::new();
        for add_on in add_ons {
            ctx.insert(&add_on.key, CellValue::Number(add_on.price));
        }
        let total: f64 = add_ons.iter().map(|a| a.price).sum();
        ctx.insert(ADD_ONS_TOTAL_FIELD, CellValue::Number(total));
        ctx.insert(BASE_PRICE_FIELD, CellValue::Number(base_price));
        for (key, value) in row {
            ctx.insert(key, value.clone());
        }
        ctx
    }

    /// Builder-style insert, handy in tests and hosts.
    pub fn with(mut self, key: &str, value: impl Into<CellValue>) -> Self {
        self.insert(key, value.into());
        self
    }

    pub fn insert(&mut self, key: &str, value: CellValue) {
        self.values.insert(key.to_string(), value);
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &CellValue)> {
        self.values.iter()
    }
}
