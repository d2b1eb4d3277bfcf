/*
 * main.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! lessc - compile Less stylesheets from the command line

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod compile;
mod report;

#[derive(Parser)]
#[command(name = "lessc")]
#[command(version)]
#[command(about = "Compile Less stylesheets to CSS", long_about = None)]
struct Cli {
    /// Input file (omit or use '-' for stdin)
    input: Option<PathBuf>,

    /// Write CSS to FILE instead of stdout
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Directory searched for @import, in order (repeatable)
    #[arg(short = 'I', long = "include-path")]
    include_path: Vec<PathBuf>,

    /// Minify the output
    #[arg(short = 'x', long)]
    compress: bool,

    /// Only evaluate math inside parentheses
    #[arg(long)]
    strict_math: bool,

    /// Rewrite urls relative to the importing file
    #[arg(long)]
    relative_urls: bool,

    /// Suppress engine warnings
    #[arg(short = 's', long)]
    silent: bool,

    /// Module whose registerCustomFunctions is called before compiling
    #[arg(long)]
    custom_functions: Option<PathBuf>,

    /// Seconds to wait for the engine before giving up
    #[arg(long)]
    timeout: Option<u64>,

    /// Print the imported files instead of CSS
    #[arg(short = 'M', long)]
    depends: bool,

    /// Log what the bridge is doing to stderr
    #[arg(short = 'v', long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    compile::execute(compile::CompileArgs {
        input: cli.input,
        output: cli.output,
        include_paths: cli.include_path,
        compress: cli.compress,
        strict_math: cli.strict_math,
        relative_urls: cli.relative_urls,
        silent: cli.silent,
        custom_functions: cli.custom_functions,
        timeout: cli.timeout,
        depends: cli.depends,
    })
}
