/*
 * parser.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The compiler façade.
//!
//! A [`Parser`] owns one compiled engine program and calls its `render`
//! function once per [`Parser::parse`]. Options are resolved at parse time
//! in three layers, lowest first:
//!
//! 1. the injected [`Defaults`] (process-wide unless substituted)
//! 2. the options the parser was constructed with
//! 3. the options passed to `parse`
//!
//! # Example
//!
//! ```rust,no_run
//! use less_bridge::{Options, Parser};
//!
//! let parser = Parser::new(Options::new().with_paths(["styles/include"]))?;
//! let output = parser.parse(".class { width: 1 + 1 }", &Options::new())?;
//! println!("{}", output.css());
//! # Ok::<(), less_bridge::LessError>(())
//! ```

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use less_runtime::{Context, NodeRuntime, Outcome};
use serde_json::Value;

use crate::defaults::Defaults;
use crate::diagnostic::Diagnostic;
use crate::error::{LessError, ParseError, Result};
use crate::options::Options;
use crate::output::ParseOutput;

/// The engine program. Its `render(source, options)` loads `less`,
/// registers custom functions when asked to, and renders.
const COMPILER_SOURCE: &str = include_str!("../js/compiler.js");

/// Entry point invoked for every parse.
const RENDER: &str = "render";

/// Compiles Less source to CSS through the engine.
///
/// Calls on one parser are serialized. Separate parsers share nothing but
/// their [`Defaults`] and may be used in parallel.
#[derive(Debug)]
pub struct Parser {
    defaults: Arc<Defaults>,
    options: Options,
    context: Mutex<Context>,
}

impl Parser {
    /// Create a parser on the process-wide defaults and the shared runtime.
    pub fn new(options: Options) -> Result<Self> {
        Self::with_defaults(Defaults::global(), options)
    }

    /// Create a parser on the given defaults and the shared runtime.
    pub fn with_defaults(defaults: Arc<Defaults>, options: Options) -> Result<Self> {
        let runtime = NodeRuntime::shared().map_err(LessError::EngineCompile)?;
        Self::with_runtime(runtime, defaults, options)
    }

    /// Create a parser on an explicit runtime.
    pub fn with_runtime(
        runtime: Arc<NodeRuntime>,
        defaults: Arc<Defaults>,
        options: Options,
    ) -> Result<Self> {
        Self::with_program(runtime, defaults, options, COMPILER_SOURCE)
    }

    fn with_program(
        runtime: Arc<NodeRuntime>,
        defaults: Arc<Defaults>,
        options: Options,
        program: &str,
    ) -> Result<Self> {
        let started = Instant::now();
        let context = Context::compile(runtime, program).map_err(LessError::EngineCompile)?;
        tracing::debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            "engine compiled"
        );

        Ok(Self {
            defaults,
            options,
            context: Mutex::new(context),
        })
    }

    /// Options this parser was constructed with.
    pub fn options(&self) -> &Options {
        &self.options
    }

    pub fn defaults(&self) -> &Arc<Defaults> {
        &self.defaults
    }

    /// Compile `source`.
    ///
    /// Returns [`LessError::Parse`] when the engine rejects the stylesheet and
    /// [`LessError::Transport`] when the exchange itself fails.
    pub fn parse(&self, source: &str, options: &Options) -> Result<ParseOutput> {
        let mut merged = self.defaults.merge(&self.options.merge(options));

        let scoped_module_paths = match merged.custom_functions() {
            Some(module) => {
                let module = std::path::absolute(module).map_err(LessError::transport)?;
                let dirs = module_dirs(&module);
                tracing::debug!(module = %module.display(), "scoping custom functions to this call");
                merged.set_custom_functions(module);
                dirs
            }
            None => Vec::new(),
        };

        let args = [
            Value::String(source.to_owned()),
            serde_json::to_value(&merged).map_err(LessError::transport)?,
        ];

        let started = Instant::now();
        let outcome = {
            let context = self.context.lock().unwrap_or_else(PoisonError::into_inner);
            context
                .call_with(RENDER, &args, &scoped_module_paths)
                .map_err(LessError::transport)?
        };
        tracing::debug!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            ok = outcome.is_ok(),
            "render finished"
        );

        match outcome {
            Outcome::Ok(value) => ParseOutput::from_response(value).map_err(LessError::transport),
            Outcome::Err { payload, .. } => {
                let diagnostic = Diagnostic::translate(&payload).map_err(|e| {
                    LessError::Transport(format!("unreadable error payload ({e}): {payload}"))
                })?;
                Err(ParseError::new(diagnostic).into())
            }
        }
    }
}

/// Directories that make a custom functions module and its own
/// dependencies loadable.
fn module_dirs(module: &Path) -> Vec<PathBuf> {
    match module.parent() {
        Some(dir) => vec![dir.to_path_buf(), dir.join("node_modules")],
        None => Vec::new(),
    }
}

/// Compile `source` with a throwaway parser.
pub fn compile(source: &str, options: Options) -> Result<String> {
    Parser::new(options)?
        .parse(source, &Options::new())
        .map(ParseOutput::into_css)
}
