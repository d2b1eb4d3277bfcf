/*
 * output.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Result of a successful compile.

use serde::Deserialize;
use serde_json::Value;

/// CSS produced by the engine plus the files it imported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ParseOutput {
    #[serde(default)]
    css: String,
    #[serde(default)]
    imports: Vec<String>,
}

impl ParseOutput {
    /// Build from the value of an `ok` outcome. A missing value is an empty
    /// output; unknown keys (such as `map`) are ignored.
    pub fn from_response(value: Option<Value>) -> Result<Self, serde_json::Error> {
        match value {
            None => Ok(Self::default()),
            Some(value) => serde_json::from_value(value),
        }
    }

    pub fn css(&self) -> &str {
        &self.css
    }

    pub fn to_css(&self) -> &str {
        self.css()
    }

    pub fn into_css(self) -> String {
        self.css
    }

    /// Resolved paths of every imported file, nested imports included, in
    /// the order the engine resolved them.
    pub fn imports(&self) -> &[String] {
        &self.imports
    }
}
