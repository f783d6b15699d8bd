//! Formula preprocessing.
//!
//! Before formulas can be evaluated by Rhai, field names like `price` must be
//! transformed into lookups against the row map. This module handles:
//!
//! - **Field references**: `price` → `FIELD(ROW, "price")`, and the explicit
//!   form `FIELD("unit price")` → `FIELD(ROW, "unit price")`
//! - **Aggregates**: `SUM(a, b, c)` → `SUM([a, b, c])` so builtins take one array
//! - **Dependency listing**: which fields a formula reads

use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::builtins::is_aggregate;

/// Name of the constant holding the row map during evaluation.
pub const ROW_BINDING: &str = "ROW";

/// Name of the field lookup builtin.
pub const FIELD_FN: &str = "FIELD";

/// Words that are part of the expression language, never field names.
const KEYWORDS: &[&str] = &[
    "true", "false", "if", "else", "in", "switch", "this", "let", "const", "fn", "return",
    "throw", "try", "catch", "while", "loop", "for", "do", "until", "break", "continue",
    "import", "export", "as", "global", "private",
];

fn ident_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b([A-Za-z_][A-Za-z0-9_]*)\b(\s*\()?").expect("identifier regex must compile")
    })
}

fn explicit_field_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"\bFIELD\s*\(\s*"((?:[^"\\]|\\.)*)"\s*\)"#)
            .expect("explicit field regex must compile")
    })
}

/// Transform a formula body (without the leading `=`) into a Rhai expression.
pub fn preprocess_formula(formula: &str) -> String {
    let with_fields = map_outside_strings(formula, |seg| {
        rewrite_identifiers(seg, |name| {
            format!("{}({}, \"{}\")", FIELD_FN, ROW_BINDING, name)
        })
    });
    wrap_aggregate_args(&with_fields)
}

/// List field names a formula body reads, in order of appearance.
/// Duplicates are kept, as in the source text.
pub fn extract_fields(formula: &str) -> Vec<String> {
    let body = formula.strip_prefix('=').unwrap_or(formula);
    let mut fields: Vec<(usize, String)> = Vec::new();

    let mut offset = 0usize;
    for (segment, in_string) in split_strings(body) {
        if !in_string {
            for caps in ident_re().captures_iter(segment) {
                let m = caps.get(0).map(|m| m.start()).unwrap_or(0);
                if is_field_reference(segment, &caps) {
                    fields.push((offset + m, caps[1].to_string()));
                }
            }
        }
        offset += segment.len();
    }

    for caps in explicit_field_re().captures_iter(body) {
        let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
        fields.push((start, caps[1].replace("\\\"", "\"")));
    }

    fields.sort_by_key(|(pos, _)| *pos);
    fields.into_iter().map(|(_, name)| name).collect()
}

fn is_field_reference(segment: &str, caps: &Captures) -> bool {
    let Some(whole) = caps.get(0) else {
        return false;
    };
    if caps.get(2).is_some() {
        return false;
    }
    let name = &caps[1];
    if KEYWORDS.contains(&name) {
        return false;
    }
    // Property or method access such as `x.len` is not a field.
    !segment[..whole.start()].trim_end().ends_with('.')
}

fn rewrite_identifiers(segment: &str, field: impl Fn(&str) -> String) -> String {
    ident_re()
        .replace_all(segment, |caps: &Captures| {
            let name = &caps[1];
            if caps.get(2).is_some() {
                // Explicit `FIELD("key")` calls get the row map injected.
                if name == FIELD_FN {
                    return format!("{}({}, ", FIELD_FN, ROW_BINDING);
                }
                return caps[0].to_string();
            }
            if is_field_reference(segment, caps) {
                field(name)
            } else {
                caps[0].to_string()
            }
        })
        .to_string()
}

/// Split a script into alternating (text, is_string_literal) segments.
fn split_strings(script: &str) -> Vec<(&str, bool)> {
    let bytes = script.as_bytes();
    let mut segments = Vec::new();
    let mut seg_start = 0;
    let mut in_string = false;
    let mut backslashes = 0usize;
    let mut i = 0usize;

    while i < bytes.len() {
        let b = bytes[i];
        if in_string {
            if b == b'\\' {
                backslashes += 1;
                i += 1;
                continue;
            }
            if b == b'"' && backslashes.is_multiple_of(2) {
                segments.push((&script[seg_start..=i], true));
                in_string = false;
                seg_start = i + 1;
            }
            backslashes = 0;
            i += 1;
            continue;
        }

        if b == b'"' {
            if seg_start < i {
                segments.push((&script[seg_start..i], false));
            }
            in_string = true;
            seg_start = i;
            backslashes = 0;
        }
        i += 1;
    }

    if seg_start < script.len() {
        segments.push((&script[seg_start..], in_string));
    }
    segments
}

fn map_outside_strings(script: &str, f: impl Fn(&str) -> String) -> String {
    let mut out = String::with_capacity(script.len());
    for (segment, in_string) in split_strings(script) {
        if in_string {
            out.push_str(segment);
        } else {
            out.push_str(&f(segment));
        }
    }
    out
}

/// Rewrite `AGG(a, b)` into `AGG([a, b])` for every aggregate builtin,
/// recursing into the arguments. Unbalanced calls are left untouched so the
/// parser reports them.
fn wrap_aggregate_args(script: &str) -> String {
    let bytes = script.as_bytes();
    let mut out = String::with_capacity(script.len() + 8);
    let mut i = 0usize;
    let mut copied = 0usize;
    let mut in_string = false;
    let mut backslashes = 0usize;

    while i < bytes.len() {
        let b = bytes[i];
        if in_string {
            if b == b'\\' {
                backslashes += 1;
            } else {
                if b == b'"' && backslashes.is_multiple_of(2) {
                    in_string = false;
                }
                backslashes = 0;
            }
            i += 1;
            continue;
        }
        if b == b'"' {
            in_string = true;
            i += 1;
            continue;
        }

        let at_boundary = i == 0 || !is_ident_byte(bytes[i - 1]);
        if at_boundary && (b.is_ascii_alphabetic() || b == b'_') {
            let start = i;
            while i < bytes.len() && is_ident_byte(bytes[i]) {
                i += 1;
            }
            let name = &script[start..i];
            let mut open = i;
            while open < bytes.len() && bytes[open].is_ascii_whitespace() {
                open += 1;
            }
            if is_aggregate(name) && open < bytes.len() && bytes[open] == b'(' {
                if let Some(close) = matching_paren(bytes, open) {
                    out.push_str(&script[copied..start]);
                    let inner = wrap_aggregate_args(&script[open + 1..close]);
                    out.push_str(name);
                    out.push_str("([");
                    out.push_str(&inner);
                    out.push_str("])");
                    i = close + 1;
                    copied = i;
                }
            }
            continue;
        }
        i += 1;
    }

    out.push_str(&script[copied..]);
    out
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn matching_paren(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut backslashes = 0usize;
    for (idx, &b) in bytes.iter().enumerate().skip(open) {
        if in_string {
            if b == b'\\' {
                backslashes += 1;
                continue;
            }
            if b == b'"' && backslashes.is_multiple_of(2) {
                in_string = false;
            }
            backslashes = 0;
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}
