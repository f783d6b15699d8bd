//! Rhai engine creation and formula evaluation.
//!
//! Creates the Rhai engine with the formula builtins registered and evaluates
//! `=` formulas against a [`RowContext`]. Evaluation is pure: the engine is
//! immutable once built, and every failure is folded into
//! [`Evaluation::Error`].

use rhai::{Dynamic, Engine, EvalAltResult, Map, Scope};
use std::sync::OnceLock;

use super::context::RowContext;
use super::format::{ERROR_SENTINEL, format_number};
use super::preprocess::{ROW_BINDING, extract_fields, preprocess_formula};
use super::value::CellValue;
use crate::builtins::register_builtins;
use crate::error::{FormulaError, Result};

const MAX_OPERATIONS: u64 = 50_000;
const MAX_EXPR_DEPTH: usize = 64;
const MAX_STRING_SIZE: usize = 10_000;
const MAX_ARRAY_SIZE: usize = 10_000;
/// How deep formula fields may reference other formula fields.
const MAX_FIELD_NESTING: usize = 16;

/// Result of evaluating a formula.
#[derive(Clone, Debug, PartialEq)]
pub enum Evaluation {
    Number(f64),
    Text(String),
    Error(FormulaError),
}

impl Evaluation {
    pub fn is_error(&self) -> bool {
        matches!(self, Evaluation::Error(_))
    }

    /// Display string; errors show the sentinel.
    pub fn display(&self) -> String {
        match self {
            Evaluation::Number(n) => format_number(*n),
            Evaluation::Text(s) => s.clone(),
            Evaluation::Error(_) => ERROR_SENTINEL.to_string(),
        }
    }
}

/// Create a Rhai engine with builtins registered and side effects disabled.
pub fn create_engine() -> Engine {
    let mut engine = Engine::new();
    // Registered operators (integer `/`) only apply with fast operators off.
    engine.set_fast_operators(false);
    register_builtins(&mut engine);
    engine.on_print(|_| {});
    engine.on_debug(|_, _, _| {});
    engine.set_max_operations(MAX_OPERATIONS);
    engine.set_max_expr_depths(MAX_EXPR_DEPTH, MAX_EXPR_DEPTH / 2);
    engine.set_max_string_size(MAX_STRING_SIZE);
    engine.set_max_array_size(MAX_ARRAY_SIZE);
    engine
}

/// Immutable formula evaluator. Cheap to share; holds no per-call state.
pub struct FormulaEngine {
    engine: Engine,
}

impl FormulaEngine {
    pub fn new() -> Self {
        FormulaEngine {
            engine: create_engine(),
        }
    }

    /// Evaluate a formula (with its leading `=`) against a row context.
    pub fn evaluate(&self, formula: &str, ctx: &RowContext) -> Evaluation {
        let mut stack = Vec::new();
        match self.evaluate_nested(formula, ctx, &mut stack) {
            Ok(value) => value,
            Err(err) => {
                log::trace!("formula {:?} failed: {}", formula, err);
                Evaluation::Error(err)
            }
        }
    }

    fn evaluate_nested(
        &self,
        formula: &str,
        ctx: &RowContext,
        stack: &mut Vec<String>,
    ) -> Result<Evaluation> {
        let body = formula
            .trim_start()
            .strip_prefix('=')
            .ok_or(FormulaError::NotAFormula)?;
        if body.trim().is_empty() {
            return Err(FormulaError::Parse("empty formula".to_string()));
        }

        let processed = preprocess_formula(body);
        let ast = self
            .engine
            .compile_expression(&processed)
            .map_err(|e| FormulaError::Parse(e.to_string()))?;

        let row = self.bind_row(body, ctx, stack)?;
        let mut scope = Scope::new();
        scope.push_constant(ROW_BINDING, row);

        let value = self
            .engine
            .eval_ast_with_scope::<Dynamic>(&mut scope, &ast)
            .map_err(|e| map_eval_error(*e))?;
        dynamic_to_evaluation(value)
    }

    /// Build the row map for one formula. Fields the formula reads that hold
    /// formulas themselves are evaluated first.
    fn bind_row(&self, body: &str, ctx: &RowContext, stack: &mut Vec<String>) -> Result<Map> {
        let referenced = extract_fields(body);
        let mut row = Map::new();

        for (key, value) in ctx.iter() {
            let bound = match value.as_formula() {
                Some(inner) if referenced.iter().any(|r| r == key) => {
                    if stack.iter().any(|k| k == key) {
                        return Err(FormulaError::CircularReference(key.clone()));
                    }
                    if stack.len() >= MAX_FIELD_NESTING {
                        return Err(FormulaError::TooComplex);
                    }
                    stack.push(key.clone());
                    let nested = self.evaluate_nested(inner, ctx, stack);
                    stack.pop();
                    match nested? {
                        Evaluation::Number(n) => Dynamic::from_float(n),
                        Evaluation::Text(s) => Dynamic::from(s),
                        Evaluation::Error(e) => return Err(e),
                    }
                }
                _ => cell_to_dynamic(value),
            };
            row.insert(key.as_str().into(), bound);
        }
        Ok(row)
    }
}

impl Default for FormulaEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Evaluate a formula with the shared engine.
pub fn evaluate(formula: &str, ctx: &RowContext) -> Evaluation {
    static ENGINE: OnceLock<FormulaEngine> = OnceLock::new();
    ENGINE.get_or_init(FormulaEngine::new).evaluate(formula, ctx)
}

fn cell_to_dynamic(value: &CellValue) -> Dynamic {
    match value {
        CellValue::Empty => Dynamic::UNIT,
        CellValue::Bool(b) => Dynamic::from(*b),
        CellValue::Number(n) => Dynamic::from_float(*n),
        CellValue::Text(s) => Dynamic::from(s.clone()),
    }
}

fn dynamic_to_evaluation(value: Dynamic) -> Result<Evaluation> {
    if let Ok(n) = value.as_float() {
        if n.is_nan() {
            return Err(FormulaError::Arithmetic("result is not a number".to_string()));
        }
        if n.is_infinite() {
            return Err(FormulaError::DivideByZero);
        }
        return Ok(Evaluation::Number(n));
    }
    if let Ok(n) = value.as_int() {
        return Ok(Evaluation::Number(n as f64));
    }
    if let Ok(b) = value.as_bool() {
        return Ok(Evaluation::Text(if b { "TRUE" } else { "FALSE" }.to_string()));
    }
    if value.is_unit() {
        return Ok(Evaluation::Text(String::new()));
    }
    if let Ok(c) = value.as_char() {
        return Ok(Evaluation::Text(c.to_string()));
    }
    if value.is_string() {
        let s = value
            .into_string()
            .map_err(|t| FormulaError::TypeMismatch(t.to_string()))?;
        return Ok(Evaluation::Text(s));
    }
    Err(FormulaError::TypeMismatch(format!(
        "{} is not a cell value",
        value.type_name()
    )))
}

fn map_eval_error(err: EvalAltResult) -> FormulaError {
    match err {
        EvalAltResult::ErrorInFunctionCall(_, _, inner, _) => map_eval_error(*inner),
        EvalAltResult::ErrorVariableNotFound(name, _) => FormulaError::UnknownField(name),
        EvalAltResult::ErrorFunctionNotFound(signature, _) => {
            let name = signature
                .split(|c: char| c == ' ' || c == '(')
                .next()
                .unwrap_or_default()
                .to_string();
            let is_named = name
                .chars()
                .next()
                .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
            let is_builtin = crate::builtins::builtin_help()
                .iter()
                .any(|(builtin, _)| *builtin == name);
            if is_named && !is_builtin {
                FormulaError::UnknownFunction(name)
            } else {
                FormulaError::TypeMismatch(signature)
            }
        }
        EvalAltResult::ErrorMismatchDataType(expected, actual, _) => {
            FormulaError::TypeMismatch(format!("expected {}, got {}", expected, actual))
        }
        EvalAltResult::ErrorArithmetic(message, _) => {
            if message.to_ascii_lowercase().contains("zero") {
                FormulaError::DivideByZero
            } else {
                FormulaError::Arithmetic(message)
            }
        }
        EvalAltResult::ErrorTooManyOperations(..)
        | EvalAltResult::ErrorStackOverflow(..)
        | EvalAltResult::ErrorDataTooLarge(..) => FormulaError::TooComplex,
        EvalAltResult::ErrorParsing(parse, _) => FormulaError::Parse(parse.to_string()),
        EvalAltResult::ErrorRuntime(value, _) => FormulaError::Runtime(value.to_string()),
        other => FormulaError::Runtime(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> RowContext {
        RowContext::new()
            .with("price", "100")
            .with("qty", "3")
            .with("name", "Alice")
    }

    #[test]
    fn test_price_times_qty() {
        assert_eq!(evaluate("=price*qty", &ctx()), Evaluation::Number(300.0));
    }

    #[test]
    fn test_not_a_formula() {
        assert_eq!(
            evaluate("price*qty", &ctx()),
            Evaluation::Error(FormulaError::NotAFormula)
        );
    }

    #[test]
    fn test_unknown_field() {
        assert_eq!(
            evaluate("=price * missing", &ctx()),
            Evaluation::Error(FormulaError::UnknownField("missing".to_string()))
        );
    }

    #[test]
    fn test_type_mismatch() {
        assert!(matches!(
            evaluate("=name * 2", &ctx()),
            Evaluation::Error(FormulaError::TypeMismatch(_))
        ));
    }

    #[test]
    fn test_integer_division_by_zero() {
        assert_eq!(
            evaluate("=1/0", &ctx()),
            Evaluation::Error(FormulaError::DivideByZero)
        );
        assert_eq!(
            evaluate("=price/0", &ctx()),
            Evaluation::Error(FormulaError::DivideByZero)
        );
    }

    #[test]
    fn test_integer_literals_divide_exactly() {
        assert_eq!(evaluate("=10/4", &ctx()), Evaluation::Number(2.5));
        let ctx = ctx().with("price", "90");
        match evaluate("=1/3*price", &ctx) {
            Evaluation::Number(n) => assert!((n - 30.0).abs() < 1e-9),
            other => panic!("expected a number, got {:?}", other),
        }
        assert_eq!(evaluate("=-7/2", &ctx), Evaluation::Number(-3.5));
    }

    #[test]
    fn test_nested_formula_fields() {
        let ctx = ctx().with("total", "=price*qty");
        assert_eq!(evaluate("=total + 5", &ctx), Evaluation::Number(305.0));
    }

    #[test]
    fn test_self_reference_is_circular() {
        let ctx = ctx().with("total", "=total+1");
        assert_eq!(
            evaluate("=total+1", &ctx),
            Evaluation::Error(FormulaError::CircularReference("total".to_string()))
        );
    }

    #[test]
    fn test_statements_are_rejected() {
        assert!(matches!(
            evaluate("=let x = 1", &ctx()),
            Evaluation::Error(FormulaError::Parse(_))
        ));
    }

    #[test]
    fn test_display() {
        assert_eq!(Evaluation::Number(300.0).display(), "300");
        assert_eq!(
            Evaluation::Error(FormulaError::DivideByZero).display(),
            ERROR_SENTINEL
        );
    }
}
