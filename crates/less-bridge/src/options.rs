/*
 * options.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Compile options.
//!
//! Options exist in tiers: process-wide [`Defaults`](crate::Defaults), the
//! options a [`Parser`](crate::Parser) was constructed with, and the options
//! passed to a single `parse` call. [`Options::merge`] layers one tier over
//! another key by key. `paths` is a single value: the higher tier replaces
//! the lower list entirely instead of extending it.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

/// Keys with a typed slot in [`Options`].
const RECOGNIZED_KEYS: &[&str] = &["paths", "filename", "custom_functions", "compress"];

/// Options forwarded to the engine's `render`.
///
/// Recognized keys have typed accessors. Any other key is forwarded to the
/// engine verbatim and unvalidated.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Options {
    /// Search order for `@import` resolution.
    #[serde(skip_serializing_if = "Option::is_none")]
    paths: Option<Vec<PathBuf>>,

    /// Name associated with the compiled source in diagnostics.
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<String>,

    /// Module whose `registerCustomFunctions` is invoked before rendering.
    #[serde(skip_serializing_if = "Option::is_none")]
    custom_functions: Option<PathBuf>,

    /// Produce minified output.
    #[serde(skip_serializing_if = "Option::is_none")]
    compress: Option<bool>,

    #[serde(flatten)]
    extra: IndexMap<String, Value>,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_paths<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.paths = Some(paths.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_custom_functions(mut self, module: impl Into<PathBuf>) -> Self {
        self.custom_functions = Some(module.into());
        self
    }

    pub fn with_compress(mut self, compress: bool) -> Self {
        self.compress = Some(compress);
        self
    }

    pub fn with_strict_math(self, strict: bool) -> Self {
        self.with("strictMath", strict)
    }

    pub fn with_silent(self, silent: bool) -> Self {
        self.with("silent", silent)
    }

    pub fn with_relative_urls(self, relative: bool) -> Self {
        self.with("relativeUrls", relative)
    }

    /// Set an engine option by name.
    ///
    /// Recognized keys are stored in their typed slot when the value has the
    /// expected shape; a mismatched value for a recognized key is dropped.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// In-place form of [`Options::with`].
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        if !RECOGNIZED_KEYS.contains(&key.as_str()) {
            self.extra.insert(key, value);
            return;
        }

        match (key.as_str(), value) {
            ("paths", Value::Array(items)) => {
                let paths: Option<Vec<PathBuf>> = items
                    .into_iter()
                    .map(|item| item.as_str().map(PathBuf::from))
                    .collect();
                match paths {
                    Some(paths) => self.paths = Some(paths),
                    None => tracing::warn!("ignoring non-string entry in `paths`"),
                }
            }
            ("filename", Value::String(name)) => self.filename = Some(name),
            ("custom_functions", Value::String(module)) => {
                self.custom_functions = Some(PathBuf::from(module))
            }
            ("compress", Value::Bool(compress)) => self.compress = Some(compress),
            (name, value) => {
                tracing::warn!(key = name, %value, "ignoring option with unexpected type");
            }
        }
    }

    pub fn paths(&self) -> Option<&[PathBuf]> {
        self.paths.as_deref()
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn custom_functions(&self) -> Option<&Path> {
        self.custom_functions.as_deref()
    }

    pub fn compress(&self) -> Option<bool> {
        self.compress
    }

    /// Look up a forwarded option that has no typed accessor.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    /// Layer `overrides` on top of `self`.
    ///
    /// Every key present in `overrides` wins; keys it leaves unset keep the
    /// value from `self`. Neither input is modified.
    pub fn merge(&self, overrides: &Options) -> Options {
        let mut merged = self.clone();
        if let Some(paths) = &overrides.paths {
            merged.paths = Some(paths.clone());
        }
        if let Some(filename) = &overrides.filename {
            merged.filename = Some(filename.clone());
        }
        if let Some(module) = &overrides.custom_functions {
            merged.custom_functions = Some(module.clone());
        }
        if let Some(compress) = overrides.compress {
            merged.compress = Some(compress);
        }
        for (key, value) in &overrides.extra {
            merged.extra.insert(key.clone(), value.clone());
        }
        merged
    }

    pub(crate) fn set_custom_functions(&mut self, module: PathBuf) {
        self.custom_functions = Some(module);
    }
}
