/*
 * config.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Runtime configuration and the module search environment.
 */

//! Runtime configuration.
//!
//! `RuntimeConfig` decides which executable runs the engine and how long a
//! single invocation may take. The module search path handed to every child
//! process is assembled here as well.
//!
//! ## Environment variables
//!
//! | variable | effect |
//! |---|---|
//! | `LESS_NODE` | explicit runtime executable, skips the PATH search |
//! | `LESS_LIB_PATH` | extra engine library directories (platform path list) |
//! | `LESS_TIMEOUT_SECS` | bounded wait for one invocation |
//!
//! The host process environment is never modified. The search path is
//! computed once per process and passed to each child through its own
//! environment.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use crate::error::RuntimeResult;

/// Executables tried in order when no explicit command is configured.
pub const DEFAULT_CANDIDATES: &[&str] = &["nodejs", "node"];

/// Default bounded wait for one invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable the runtime consults when resolving `require()`.
pub const MODULE_PATH_VAR: &str = "NODE_PATH";

pub const COMMAND_ENV: &str = "LESS_NODE";
pub const LIB_PATH_ENV: &str = "LESS_LIB_PATH";
pub const TIMEOUT_ENV: &str = "LESS_TIMEOUT_SECS";

/// Configuration for locating and driving the script runtime.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Explicit executable. When set, `candidates` is ignored.
    pub command: Option<PathBuf>,
    /// Executable names searched on PATH, first match wins.
    pub candidates: Vec<String>,
    /// Extra library directories, searched before the process-wide ones.
    pub lib_paths: Vec<PathBuf>,
    /// Bounded wait for one invocation.
    pub timeout: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command: None,
            candidates: DEFAULT_CANDIDATES.iter().map(|c| c.to_string()).collect(),
            lib_paths: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl RuntimeConfig {
    /// Build a configuration from `LESS_NODE` and `LESS_TIMEOUT_SECS`.
    ///
    /// Unparseable timeouts are ignored with a warning and the default is kept.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(command) = std::env::var_os(COMMAND_ENV).filter(|c| !c.is_empty()) {
            config.command = Some(PathBuf::from(command));
        }

        if let Ok(raw) = std::env::var(TIMEOUT_ENV) {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.timeout = Duration::from_secs(secs),
                _ => tracing::warn!(value = %raw, "ignoring invalid {}", TIMEOUT_ENV),
            }
        }

        config
    }

    /// Use an explicit executable.
    pub fn with_command(mut self, command: impl Into<PathBuf>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Set the bounded wait for one invocation.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Add a library directory to the module search path.
    pub fn with_lib_path(mut self, dir: impl Into<PathBuf>) -> Self {
        self.lib_paths.push(dir.into());
        self
    }

    /// Names used when searching for the executable, for error reporting.
    pub(crate) fn searched_names(&self) -> Vec<String> {
        match &self.command {
            Some(command) => vec![command.display().to_string()],
            None => self.candidates.clone(),
        }
    }
}

/// Process-wide module search directories.
///
/// Local `node_modules` first, then `LESS_LIB_PATH`, then whatever
/// `NODE_PATH` the host process was started with.
pub fn base_module_paths() -> &'static [PathBuf] {
    static BASE: OnceLock<Vec<PathBuf>> = OnceLock::new();
    BASE.get_or_init(|| {
        let mut dirs = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            dirs.push(cwd.join("node_modules"));
        }
        if let Some(libs) = std::env::var_os(LIB_PATH_ENV) {
            dirs.extend(std::env::split_paths(&libs));
        }
        if let Some(inherited) = std::env::var_os(MODULE_PATH_VAR) {
            dirs.extend(std::env::split_paths(&inherited));
        }
        dirs.retain(|d| !d.as_os_str().is_empty());
        tracing::debug!(count = dirs.len(), "module search path initialized");
        dirs
    })
}

/// Join `scoped`, then `lib_paths`, then the process-wide directories into
/// one value for [`MODULE_PATH_VAR`].
pub fn module_search_path(scoped: &[PathBuf], lib_paths: &[PathBuf]) -> RuntimeResult<OsString> {
    let dirs = scoped
        .iter()
        .chain(lib_paths)
        .chain(base_module_paths())
        .map(PathBuf::as_path);
    Ok(std::env::join_paths(dedup(dirs))?)
}

fn dedup<'a>(dirs: impl Iterator<Item = &'a Path>) -> Vec<&'a Path> {
    let mut seen: Vec<&Path> = Vec::new();
    for dir in dirs {
        if !seen.contains(&dir) {
            seen.push(dir);
        }
    }
    seen
}
