/*
 * less-runtime
 * Copyright (c) 2025 Posit, PBC
 *
 * External script runtime abstraction for the Less compiler bridge.
 *
 * The Less engine is a JavaScript program. This crate locates a Node.js
 * executable, compiles a program against it once, and then calls named
 * functions in that program over a tagged request/response protocol:
 *
 * - RuntimeConfig: which executable, extra library dirs, bounded wait
 * - NodeRuntime: a located executable; runs one script per child process
 * - Context: a compiled program, callable repeatedly
 * - protocol: runner assembly and `["ok", ..]` / `["err", ..]` decoding
 *
 * Node.js types never appear in the API; callers see serde_json values.
 */

mod config;
mod context;
mod error;
mod node;
pub mod protocol;

pub use config::{
    COMMAND_ENV, DEFAULT_CANDIDATES, DEFAULT_TIMEOUT, LIB_PATH_ENV, MODULE_PATH_VAR,
    RuntimeConfig, TIMEOUT_ENV, base_module_paths, module_search_path,
};
pub use context::Context;
pub use error::{RuntimeError, RuntimeResult};
pub use node::NodeRuntime;
pub use protocol::Outcome;
