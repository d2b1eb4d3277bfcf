/*
 * node.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * External Node.js runtime driven as a child process.
 */

//! Node.js as an external runtime.
//!
//! Each invocation writes the assembled script to a scratch file and runs
//! it in a fresh child process. The child gets the module search path in
//! its own environment and is killed if it outlives the configured timeout.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, OnceLock};
use std::time::Instant;

use tokio::process::Command;

use crate::config::{MODULE_PATH_VAR, RuntimeConfig, module_search_path};
use crate::error::{RuntimeError, RuntimeResult};

/// A located runtime executable plus the configuration used to drive it.
#[derive(Debug)]
pub struct NodeRuntime {
    binary: PathBuf,
    config: RuntimeConfig,
}

impl NodeRuntime {
    /// Display name of this runtime.
    pub const NAME: &'static str = "Node.js (V8)";

    /// Locate the runtime executable described by `config`.
    pub fn detect(config: RuntimeConfig) -> RuntimeResult<Self> {
        let binary = match &config.command {
            Some(command) => which::which(command).map_err(|_| RuntimeError::NotFound {
                candidates: config.searched_names(),
            })?,
            None => config
                .candidates
                .iter()
                .find_map(|name| which::which(name).ok())
                .ok_or_else(|| RuntimeError::NotFound {
                    candidates: config.searched_names(),
                })?,
        };

        tracing::debug!(command = %binary.display(), "located {}", Self::NAME);
        Ok(Self { binary, config })
    }

    /// Runtime built from [`RuntimeConfig::from_env`], detected once per process.
    ///
    /// A failed detection is not cached, so a later call may succeed once the
    /// executable becomes available.
    pub fn shared() -> RuntimeResult<Arc<Self>> {
        static SHARED: OnceLock<Arc<NodeRuntime>> = OnceLock::new();

        if let Some(runtime) = SHARED.get() {
            return Ok(Arc::clone(runtime));
        }
        let runtime = Arc::new(Self::detect(RuntimeConfig::from_env())?);
        Ok(Arc::clone(SHARED.get_or_init(|| runtime)))
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Run `script` to completion and return its stdout.
    ///
    /// `scoped_module_paths` are visible to this child only. If the child
    /// writes nothing and exits unsuccessfully, its stderr is reported.
    pub(crate) fn exec(&self, script: &str, scoped_module_paths: &[PathBuf]) -> RuntimeResult<String> {
        let module_path = module_search_path(scoped_module_paths, &self.config.lib_paths)?;

        let file = tempfile::Builder::new()
            .prefix("less-runtime-")
            .suffix(".js")
            .tempfile()?;
        std::fs::write(file.path(), script)?;

        let timeout = self.config.timeout;
        let started = Instant::now();

        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let output: RuntimeResult<std::process::Output> = rt.block_on(async {
            let child = Command::new(&self.binary)
                .arg(file.path())
                .env(MODULE_PATH_VAR, &module_path)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .spawn()
                .map_err(|source| RuntimeError::Spawn {
                    command: self.binary.clone(),
                    source,
                })?;

            // Dropping the wait future on timeout drops the child, which kills it.
            match tokio::time::timeout(timeout, child.wait_with_output()).await {
                Ok(output) => Ok(output?),
                Err(_) => Err(RuntimeError::Timeout { timeout }),
            }
        });

        let output = match output {
            Ok(output) => output,
            Err(err) => {
                if matches!(err, RuntimeError::Timeout { .. }) {
                    tracing::warn!(
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "runtime invocation timed out"
                    );
                }
                return Err(err);
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        tracing::trace!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            status = ?output.status.code(),
            bytes = stdout.len(),
            "runtime invocation finished"
        );

        if stdout.trim().is_empty() && !output.status.success() {
            return Err(RuntimeError::Exited {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(stdout)
    }
}
