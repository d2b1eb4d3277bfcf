/*
 * less-bridge
 * Copyright (c) 2025 Posit, PBC
 */

//! Compile Less stylesheets to CSS through the less.js engine.
//!
//! This crate provides:
//! - [`Parser`]: owns a compiled engine program and renders stylesheets
//! - [`Options`] and [`Defaults`]: call, construction and process-wide options
//! - [`ParseOutput`]: CSS plus the resolved paths of imported files
//! - [`Diagnostic`]: structured engine failures with source location
//!
//! The engine itself runs in Node.js via `less-runtime`.

mod defaults;
mod diagnostic;
mod error;
mod options;
mod output;
mod parser;

pub use defaults::Defaults;
pub use diagnostic::{Diagnostic, DiagnosticType, MissingField, normalize_separators};
pub use error::{LessError, ParseError, Result};
pub use options::Options;
pub use output::ParseOutput;
pub use parser::{Parser, compile};

pub use less_runtime::{NodeRuntime, RuntimeConfig, RuntimeError};
