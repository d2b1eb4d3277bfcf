/*
 * protocol.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Runner protocol: program assembly and tagged outcome decoding.
 */

//! The runner protocol.
//!
//! Every invocation runs a script built from the embedded runner with the
//! program body spliced in. The runner writes exactly one JSON array to
//! stdout:
//!
//! - `["ok"]` or `["ok", value]` when the program called back without error
//! - `["err", error, stack]` when it called back with an error, threw, or
//!   exited without calling back
//!
//! The tag is explicit because stdout is the only channel and exceptions
//! do not cross the process boundary.

use serde_json::Value;

use crate::error::{RuntimeError, RuntimeResult};

/// The embedded runner.
const RUNNER: &str = include_str!("../js/runner.js");

/// Marker in the runner replaced by the program body.
const PROGRAM_SLOT: &str = "__LESS_RUNTIME_PROGRAM__";

/// Outcome of one invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Callback invoked without error. `None` when no value was passed.
    Ok(Option<Value>),
    /// Callback invoked with an error, or the program failed outright.
    Err {
        /// Textual form of the structured error object.
        payload: String,
        /// Stack trace, when the runtime provided one.
        stack: Option<String>,
    },
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok(_))
    }
}

/// Splice `body` into the runner. `body` sees a `callback(err, result)`
/// binding in scope.
pub fn wrap_program(body: &str) -> String {
    RUNNER.replacen(PROGRAM_SLOT, body, 1)
}

/// Body that loads `source` and reports success immediately.
///
/// Used once when a program is compiled, so that syntax errors surface
/// before the first real call.
pub fn probe_body(source: &str) -> String {
    format!("{source}\ncallback(null);")
}

/// Body that loads `source` and applies `function` to `args`.
pub fn call_body(source: &str, function: &str, args: &[Value]) -> RuntimeResult<String> {
    if !is_identifier(function) {
        return Err(RuntimeError::InvalidFunction(function.to_string()));
    }
    let args = serde_json::to_string(args)?;
    Ok(format!("{source}\nreturn {function}.apply(this, {args});"))
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Decode the runner's stdout into an [`Outcome`].
///
/// The runner writes its outcome on a line of its own, but the program may
/// print before or after it. When the whole output is not a tagged array,
/// the last line that is one is used.
pub fn decode(output: &str) -> RuntimeResult<Outcome> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Err(RuntimeError::MalformedResponse(
            "no outcome was written".to_string(),
        ));
    }

    let items = match serde_json::from_str::<Vec<Value>>(trimmed) {
        Ok(items) => items,
        Err(first) => trimmed
            .lines()
            .rev()
            .find_map(tagged_line)
            .ok_or_else(|| RuntimeError::MalformedResponse(format!("{first}: {}", preview(trimmed))))?,
    };

    let mut items = items.into_iter();
    match items.next() {
        Some(Value::String(tag)) if tag == "ok" => {
            let value = items.next().filter(|v| !v.is_null());
            Ok(Outcome::Ok(value))
        }
        Some(Value::String(tag)) if tag == "err" => {
            let payload = match items.next() {
                Some(Value::String(text)) => text,
                Some(Value::Null) | None => {
                    return Err(RuntimeError::MalformedResponse(
                        "error outcome without a payload".to_string(),
                    ));
                }
                Some(other) => other.to_string(),
            };
            let stack = match items.next() {
                Some(Value::String(stack)) if !stack.is_empty() => Some(stack),
                _ => None,
            };
            Ok(Outcome::Err { payload, stack })
        }
        Some(other) => Err(RuntimeError::MalformedResponse(format!(
            "unknown outcome tag {other}"
        ))),
        None => Err(RuntimeError::MalformedResponse("empty outcome".to_string())),
    }
}

/// Parse `line` if it is a JSON array starting with a known tag.
fn tagged_line(line: &str) -> Option<Vec<Value>> {
    let items = serde_json::from_str::<Vec<Value>>(line.trim()).ok()?;
    match items.first() {
        Some(Value::String(tag)) if tag == "ok" || tag == "err" => Some(items),
        _ => None,
    }
}

fn preview(text: &str) -> String {
    const LIMIT: usize = 200;
    match text.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
