/*
 * defaults.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Process-wide default options.
//!
//! [`Defaults::global`] is the instance every [`Parser`](crate::Parser) uses
//! unless another one is injected with
//! [`Parser::with_defaults`](crate::Parser::with_defaults). The `paths` list
//! is shared state: appending to it is visible to every later `parse` call
//! that does not supply its own `paths`, including calls on parsers built
//! before the append.
//!
//! Reads and writes go through an `RwLock`, so mutating the defaults from one
//! thread while another merges is well defined. A merge observes the list as
//! it was at the moment of the merge.

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use crate::options::Options;

static GLOBAL: LazyLock<Arc<Defaults>> = LazyLock::new(|| Arc::new(Defaults::new()));

#[derive(Debug, Default)]
struct DefaultsInner {
    paths: Vec<PathBuf>,
    custom_functions: Option<PathBuf>,
}

/// Mutable defaults beneath every parser's options.
#[derive(Debug, Default)]
pub struct Defaults {
    inner: RwLock<DefaultsInner>,
}

impl Defaults {
    /// An empty, independent set of defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide defaults.
    pub fn global() -> Arc<Defaults> {
        Arc::clone(&GLOBAL)
    }

    /// Snapshot of the current search paths.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.read(|inner| inner.paths.clone())
    }

    /// Append a directory to the search paths.
    pub fn push_path(&self, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        tracing::debug!(dir = %dir.display(), "adding default search path");
        self.write(|inner| inner.paths.push(dir));
    }

    /// Replace the search paths.
    pub fn set_paths<I, P>(&self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let paths: Vec<PathBuf> = paths.into_iter().map(Into::into).collect();
        self.write(|inner| inner.paths = paths);
    }

    pub fn clear_paths(&self) {
        self.write(|inner| inner.paths.clear());
    }

    pub fn custom_functions(&self) -> Option<PathBuf> {
        self.read(|inner| inner.custom_functions.clone())
    }

    pub fn set_custom_functions(&self, module: Option<&Path>) {
        let module = module.map(Path::to_path_buf);
        self.write(|inner| inner.custom_functions = module);
    }

    /// Layer `options` over these defaults.
    ///
    /// The result always carries `paths` (possibly empty). Neither the
    /// defaults nor `options` are modified.
    pub fn merge(&self, options: &Options) -> Options {
        let base = self.read(|inner| {
            let mut base = Options::new().with_paths(inner.paths.iter().cloned());
            if let Some(module) = &inner.custom_functions {
                base.set_custom_functions(module.clone());
            }
            base
        });
        base.merge(options)
    }

    // A panic while holding the lock cannot leave a Vec or Option half
    // written, so a poisoned lock is still safe to use.
    fn read<T>(&self, f: impl FnOnce(&DefaultsInner) -> T) -> T {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn write<T>(&self, f: impl FnOnce(&mut DefaultsInner) -> T) -> T {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}
