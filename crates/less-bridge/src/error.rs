/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for compiling through the engine.

use std::ops::Deref;

use less_runtime::RuntimeError;
use thiserror::Error;

use crate::diagnostic::Diagnostic;

/// A failure reported by the engine while rendering, with its diagnostic.
///
/// Derefs to [`Diagnostic`], so `err.line()`, `err.get("index")` and the
/// other accessors are available directly.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    diagnostic: Box<Diagnostic>,
}

impl ParseError {
    pub fn new(diagnostic: Diagnostic) -> Self {
        Self {
            diagnostic: Box::new(diagnostic),
        }
    }

    pub fn diagnostic(&self) -> &Diagnostic {
        &self.diagnostic
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        *self.diagnostic
    }
}

impl Deref for ParseError {
    type Target = Diagnostic;

    fn deref(&self) -> &Diagnostic {
        &self.diagnostic
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.diagnostic.message().is_empty() {
            write!(f, "engine reported an error without a message")
        } else {
            f.write_str(self.diagnostic.message())
        }
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Error)]
pub enum LessError {
    /// The engine program could not be compiled or the runtime could not be
    /// started. The parser that raised it is unusable.
    #[error("failed to compile the Less engine: {0}")]
    EngineCompile(#[source] RuntimeError),

    /// The engine rejected the stylesheet.
    #[error("{0}")]
    Parse(#[source] ParseError),

    /// The exchange with the engine did not yield a well-formed outcome.
    #[error("engine transport failed: {0}")]
    Transport(String),
}

impl LessError {
    pub fn transport(msg: impl ToString) -> Self {
        Self::Transport(msg.to_string())
    }

    /// The diagnostic, if this is a parse failure.
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            LessError::Parse(err) => Some(err.diagnostic()),
            _ => None,
        }
    }
}

impl From<ParseError> for LessError {
    fn from(err: ParseError) -> Self {
        LessError::Parse(err)
    }
}

pub type Result<T> = std::result::Result<T, LessError>;
