//! Flat key-value persistence for UI state.
//!
//! [`LayoutStore`] is the seam; [`JsonFileStore`] keeps every key in one
//! JSON object on disk:
//! ```json
//! {
//!   "train-dashboard:columns": "{\"left\":[...],\"right\":[...]}",
//!   "train-dashboard:kpi-order": "[\"kpi-delay\",\"kpi-cancel\"]"
//! }
//! ```

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

pub trait LayoutStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

impl<T: LayoutStore + ?Sized> LayoutStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File content, or `None` when there is nothing stored yet.
    fn read_raw(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read layout file {}", self.path.display()))?;
        Ok(Some(content).filter(|c| !c.trim().is_empty()))
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        match self.read_raw()? {
            Some(content) => serde_json::from_str(&content).with_context(|| {
                format!("Layout file {} is not a JSON object", self.path.display())
            }),
            None => Ok(BTreeMap::new()),
        }
    }
}

impl LayoutStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        // Malformed content is replaced; I/O failures leave the file alone.
        let mut entries = match self.read_raw()? {
            Some(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                warn!(path = %self.path.display(), error = %e, "Replacing malformed layout file");
                BTreeMap::new()
            }),
            None => BTreeMap::new(),
        };
        entries.insert(key.to_string(), value.to_string());

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&entries)?)
            .with_context(|| format!("Failed to write layout file {}", self.path.display()))?;

        debug!(path = %self.path.display(), key, "Layout saved");
        Ok(())
    }
}

/// Volatile store, used when persistence is disabled.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl LayoutStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("layout store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("layout store lock poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
