/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Error types for runtime detection and program execution.
 */

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur while locating, compiling against, or calling
/// into the external script runtime.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// None of the candidate executables could be found on PATH.
    #[error("no script runtime found (tried: {})", .candidates.join(", "))]
    NotFound { candidates: Vec<String> },

    /// The runtime executable exists but could not be started.
    #[error("failed to spawn {}: {source}", .command.display())]
    Spawn {
        command: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Standard I/O error (scratch files, pipes).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The invocation did not produce an outcome within the bounded wait.
    #[error("runtime did not respond within {timeout:?}")]
    Timeout { timeout: Duration },

    /// The runtime exited without writing an outcome.
    #[error("runtime exited with code {code:?}: {stderr}")]
    Exited { code: Option<i32>, stderr: String },

    /// The runtime wrote something that is not a tagged outcome.
    #[error("malformed runtime response: {0}")]
    MalformedResponse(String),

    /// The program reported an error while being compiled.
    #[error("program failed to load: {0}")]
    Program(String),

    /// The requested entry point is not a plain identifier.
    #[error("invalid function name '{0}'")]
    InvalidFunction(String),

    /// A module search directory cannot be placed in the environment.
    #[error("invalid module search path: {0}")]
    ModulePath(#[from] std::env::JoinPathsError),

    /// Arguments could not be encoded for the runner.
    #[error("failed to encode arguments: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_lists_candidates() {
        let err = RuntimeError::NotFound {
            candidates: vec!["nodejs".to_string(), "node".to_string()],
        };
        assert_eq!(err.to_string(), "no script runtime found (tried: nodejs, node)");
    }

    #[test]
    fn test_timeout_display() {
        let err = RuntimeError::Timeout {
            timeout: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "runtime did not respond within 30s");
    }

    #[test]
    fn test_timeout_display_below_one_second() {
        let err = RuntimeError::Timeout {
            timeout: Duration::from_millis(200),
        };
        assert_eq!(err.to_string(), "runtime did not respond within 200ms");
    }
}
