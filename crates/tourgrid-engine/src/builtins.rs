//! Built-in formula functions (Rust) and their metadata.
//!
//! Conventions:
//! - Formula-facing built-in names are ALL CAPS (e.g. `SUM`, `ROUND`).
//! - Aggregates accept any number of arguments; preprocessing packs them into
//!   one array, which is flattened here.
//! - If you add a new aggregate, update `AGGREGATE_BUILTINS` and register its
//!   implementation in `register_builtins`.
//! - Builtins must stay pure: no clock, no randomness, no I/O.

use rhai::{Array, Dynamic, Engine, EvalAltResult, Map, Position};

use crate::engine::FIELD_FN;

pub struct Builtin {
    pub name: &'static str,
    pub description: &'static str,
}

pub const AGGREGATE_BUILTINS: &[Builtin] = &[
    Builtin {
        name: "SUM",
        description: "Sum of the numeric arguments",
    },
    Builtin {
        name: "AVG",
        description: "Average of the numeric arguments",
    },
    Builtin {
        name: "MIN",
        description: "Smallest numeric argument",
    },
    Builtin {
        name: "MAX",
        description: "Largest numeric argument",
    },
    Builtin {
        name: "COUNT",
        description: "Number of non-empty arguments",
    },
];

pub const SCALAR_BUILTINS: &[Builtin] = &[
    Builtin {
        name: "ROUND",
        description: "Round to a number of decimal places",
    },
    Builtin {
        name: "ABS",
        description: "Absolute value",
    },
    Builtin {
        name: "FIELD",
        description: "Value of a row field by key, e.g. FIELD(\"unit price\")",
    },
];

pub fn is_aggregate(name: &str) -> bool {
    AGGREGATE_BUILTINS.iter().any(|b| b.name == name)
}

fn invalid_arg(message: &str) -> Box<EvalAltResult> {
    EvalAltResult::ErrorRuntime(message.into(), Position::NONE).into()
}

fn mismatch(expected: &str, actual: &Dynamic) -> Box<EvalAltResult> {
    EvalAltResult::ErrorMismatchDataType(
        expected.to_string(),
        actual.type_name().to_string(),
        Position::NONE,
    )
    .into()
}

/// Numeric view of a formula value: numbers and numeric strings.
pub(crate) fn dynamic_to_number(value: &Dynamic) -> Option<f64> {
    if let Ok(n) = value.as_float() {
        return Some(n);
    }
    if let Ok(n) = value.as_int() {
        return Some(n as f64);
    }
    if let Ok(b) = value.as_bool() {
        return Some(if b { 1.0 } else { 0.0 });
    }
    if value.is_string() {
        return value.clone().into_string().ok()?.trim().parse::<f64>().ok();
    }
    None
}

/// Flatten nested arrays into a list of leaf values.
fn flatten(args: Array, out: &mut Vec<Dynamic>) {
    for arg in args {
        if arg.is_array() {
            flatten(arg.cast::<Array>(), out);
        } else {
            out.push(arg);
        }
    }
}

/// Leaf values as numbers. Empty strings and units are skipped; anything else
/// that is not numeric is a type error.
fn numeric_args(args: Array) -> Result<Vec<f64>, Box<EvalAltResult>> {
    let mut leaves = Vec::new();
    flatten(args, &mut leaves);

    let mut numbers = Vec::with_capacity(leaves.len());
    for leaf in leaves {
        if leaf.is_unit() {
            continue;
        }
        if leaf.is_string() && leaf.clone().into_string().is_ok_and(|s| s.trim().is_empty()) {
            continue;
        }
        match dynamic_to_number(&leaf) {
            Some(n) => numbers.push(n),
            None => return Err(mismatch("number", &leaf)),
        }
    }
    Ok(numbers)
}

/// Convert a stored row value into the value a formula sees.
/// Numeric text becomes a float, empty becomes zero.
pub(crate) fn field_value(value: &Dynamic) -> Dynamic {
    if value.is_unit() {
        return Dynamic::from_float(0.0);
    }
    if value.is_string() {
        if let Ok(s) = value.clone().into_string() {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Dynamic::from_float(0.0);
            }
            if let Ok(n) = trimmed.parse::<f64>() {
                return Dynamic::from_float(n);
            }
        }
    }
    value.clone()
}

/// Register all built-in functions into the Rhai engine.
pub fn register_builtins(engine: &mut Engine) {
    // FIELD(row, key): value of a row field; unknown keys are unresolved references.
    engine.register_fn(
        FIELD_FN,
        |row: Map, key: &str| -> Result<Dynamic, Box<EvalAltResult>> {
            match row.get(key) {
                Some(value) => Ok(field_value(value)),
                None => Err(EvalAltResult::ErrorVariableNotFound(key.to_string(), Position::NONE)
                    .into()),
            }
        },
    );

    // Integer `/` divides exactly, as prices expect: 10 / 4 is 2.5.
    engine.register_fn("/", |a: i64, b: i64| -> Result<f64, Box<EvalAltResult>> {
        if b == 0 {
            return Err(
                EvalAltResult::ErrorArithmetic("Division by zero".to_string(), Position::NONE)
                    .into(),
            );
        }
        Ok(a as f64 / b as f64)
    });

    engine.register_fn("SUM", |args: Array| -> Result<f64, Box<EvalAltResult>> {
        Ok(numeric_args(args)?.iter().sum())
    });

    engine.register_fn("AVG", |args: Array| -> Result<f64, Box<EvalAltResult>> {
        let nums = numeric_args(args)?;
        if nums.is_empty() {
            return Err(invalid_arg("AVG of no values"));
        }
        Ok(nums.iter().sum::<f64>() / nums.len() as f64)
    });

    engine.register_fn("MIN", |args: Array| -> Result<f64, Box<EvalAltResult>> {
        numeric_args(args)?
            .into_iter()
            .reduce(f64::min)
            .ok_or_else(|| invalid_arg("MIN of no values"))
    });

    engine.register_fn("MAX", |args: Array| -> Result<f64, Box<EvalAltResult>> {
        numeric_args(args)?
            .into_iter()
            .reduce(f64::max)
            .ok_or_else(|| invalid_arg("MAX of no values"))
    });

    engine.register_fn("COUNT", |args: Array| -> i64 {
        let mut leaves = Vec::new();
        flatten(args, &mut leaves);
        leaves
            .iter()
            .filter(|v| {
                !(v.is_unit()
                    || (v.is_string() && (*v).clone().into_string().is_ok_and(|s| s.is_empty())))
            })
            .count() as i64
    });

    engine.register_fn("ROUND", |x: Dynamic, places: i64| -> Result<f64, Box<EvalAltResult>> {
        const MAX_DECIMALS: i64 = 12;
        let n = dynamic_to_number(&x).ok_or_else(|| mismatch("number", &x))?;
        if !(0..=MAX_DECIMALS).contains(&places) {
            return Err(invalid_arg(&format!("places must be 0..={}", MAX_DECIMALS)));
        }
        let factor = 10f64.powi(places as i32);
        Ok((n * factor).round() / factor)
    });

    engine.register_fn("ROUND", |x: Dynamic| -> Result<f64, Box<EvalAltResult>> {
        let n = dynamic_to_number(&x).ok_or_else(|| mismatch("number", &x))?;
        Ok(n.round())
    });

    engine.register_fn("ABS", |x: Dynamic| -> Result<f64, Box<EvalAltResult>> {
        let n = dynamic_to_number(&x).ok_or_else(|| mismatch("number", &x))?;
        Ok(n.abs())
    });
}

/// Human-readable list of builtins, for help screens.
pub fn builtin_help() -> Vec<(&'static str, &'static str)> {
    AGGREGATE_BUILTINS
        .iter()
        .chain(SCALAR_BUILTINS.iter())
        .map(|b| (b.name, b.description))
        .collect()
}
