/*
 * context.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * A compiled program that can be called repeatedly.
 */

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{RuntimeError, RuntimeResult};
use crate::node::NodeRuntime;
use crate::protocol::{self, Outcome};

/// A program compiled against a runtime.
///
/// Compilation runs the program once so that load-time failures (syntax
/// errors, a broken runtime) are reported before the first call. Every
/// [`Context::call`] then runs the program in a fresh child process, so no
/// state carries over from one call to the next.
///
/// A context does not serialize its callers. Owners that need one call at
/// a time must guard it themselves.
#[derive(Debug)]
pub struct Context {
    runtime: Arc<NodeRuntime>,
    source: String,
}

impl Context {
    /// Compile `source` for `runtime`.
    pub fn compile(runtime: Arc<NodeRuntime>, source: impl Into<String>) -> RuntimeResult<Self> {
        let source = source.into();
        tracing::debug!(bytes = source.len(), runtime = NodeRuntime::NAME, "compiling program");

        let script = protocol::wrap_program(&protocol::probe_body(&source));
        match protocol::decode(&runtime.exec(&script, &[])?)? {
            Outcome::Ok(_) => Ok(Self { runtime, source }),
            Outcome::Err { payload, .. } => Err(RuntimeError::Program(payload)),
        }
    }

    /// Call `function` with positional `args`.
    pub fn call(&self, function: &str, args: &[Value]) -> RuntimeResult<Outcome> {
        self.call_with(function, args, &[])
    }

    /// Call `function` with `module_paths` added to the module search path
    /// of this invocation only.
    pub fn call_with(
        &self,
        function: &str,
        args: &[Value],
        module_paths: &[PathBuf],
    ) -> RuntimeResult<Outcome> {
        let script = protocol::wrap_program(&protocol::call_body(&self.source, function, args)?);
        tracing::debug!(function, bytes = script.len(), "calling into runtime");

        let outcome = protocol::decode(&self.runtime.exec(&script, module_paths)?)?;
        if let Outcome::Err { stack: Some(stack), .. } = &outcome {
            tracing::trace!(function, %stack, "program reported an error");
        }
        Ok(outcome)
    }

    pub fn runtime(&self) -> &Arc<NodeRuntime> {
        &self.runtime
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}
