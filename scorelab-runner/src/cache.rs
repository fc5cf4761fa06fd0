//! Result-context cache: parsed results keyed by file path.
//!
//! The cache is an explicit value owned by the caller. Nothing is global.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::export::load_result;
use crate::runner::BacktestResult;

#[derive(Debug, Default, Clone)]
pub struct ResultContextCache {
    entries: BTreeMap<PathBuf, Arc<BacktestResult>>,
}

impl ResultContextCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached result for `path`, reading and parsing it on a miss.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<Arc<BacktestResult>> {
        let path = path.as_ref();
        if let Some(hit) = self.entries.get(path) {
            return Ok(Arc::clone(hit));
        }
        let result = Arc::new(load_result(path)?);
        self.entries.insert(path.to_path_buf(), Arc::clone(&result));
        Ok(result)
    }

    /// Cached entry without I/O.
    pub fn get(&self, path: impl AsRef<Path>) -> Option<Arc<BacktestResult>> {
        self.entries.get(path.as_ref()).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
