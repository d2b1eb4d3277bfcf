/*
 * compile.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Compile command implementation
 */

use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info};

use less_bridge::{Defaults, LessError, NodeRuntime, Options, Parser, RuntimeConfig};

use crate::report;

/// Arguments for one compile
#[derive(Debug, Default)]
pub struct CompileArgs {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub include_paths: Vec<PathBuf>,
    pub compress: bool,
    pub strict_math: bool,
    pub relative_urls: bool,
    pub silent: bool,
    pub custom_functions: Option<PathBuf>,
    pub timeout: Option<u64>,
    pub depends: bool,
}

impl CompileArgs {
    /// Input path, or `None` for stdin.
    fn input_path(&self) -> Option<&Path> {
        self.input.as_deref().filter(|p| *p != Path::new("-"))
    }

    fn options(&self) -> Options {
        let mut options = Options::new().with_compress(self.compress);
        if let Some(input) = self.input_path() {
            options = options.with_filename(input.display().to_string());
        }
        if !self.include_paths.is_empty() {
            options = options.with_paths(self.include_paths.iter().cloned());
        }
        if self.strict_math {
            options = options.with_strict_math(true);
        }
        if self.relative_urls {
            options = options.with_relative_urls(true);
        }
        if self.silent {
            options = options.with_silent(true);
        }
        if let Some(module) = &self.custom_functions {
            options = options.with_custom_functions(module.clone());
        }
        options
    }

    fn runtime_config(&self) -> RuntimeConfig {
        let config = RuntimeConfig::from_env();
        match self.timeout {
            Some(secs) => config.with_timeout(Duration::from_secs(secs)),
            None => config,
        }
    }
}

/// Execute the compile
pub fn execute(args: CompileArgs) -> Result<ExitCode> {
    let (name, source) = read_input(args.input_path())?;
    debug!(input = %name, bytes = source.len(), "read input");

    let runtime = NodeRuntime::detect(args.runtime_config())
        .context("Failed to locate a Node.js runtime")?;
    let parser = Parser::with_runtime(Arc::new(runtime), Defaults::global(), args.options())?;

    let output = match parser.parse(&source, &Options::new()) {
        Ok(output) => output,
        Err(LessError::Parse(err)) => {
            eprint!("{}", report::render(&err, &name, &source));
            return Ok(ExitCode::FAILURE);
        }
        Err(other) => return Err(other.into()),
    };

    let text = if args.depends {
        let mut listing = output.imports().join("\n");
        if !listing.is_empty() {
            listing.push('\n');
        }
        listing
    } else {
        output.into_css()
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, &text)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(output = %path.display(), "wrote output");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn read_input(path: Option<&Path>) -> Result<(String, String)> {
    match path {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok((path.display().to_string(), source))
        }
        None => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .context("Failed to read stdin")?;
            Ok(("<stdin>".to_string(), source))
        }
    }
}
