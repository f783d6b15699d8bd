//! tourgrid_engine - Row-context formula engine + Rhai integration.

pub(crate) mod builtins;
pub mod engine;
pub mod error;
