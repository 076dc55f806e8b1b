use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Key under which the chosen language code is stored. Shared with the
/// existing web host, so its saved choice is picked up as is.
pub const PREFERENCE_KEY: &str = "mediskill-lang";

/// A single durable slot holding the last chosen language code.
pub trait PreferenceStore: Send + Sync {
    /// Read the stored code, if any.
    fn load(&self) -> Result<Option<String>>;

    /// Overwrite the stored code.
    fn save(&self, code: &str) -> Result<()>;
}

/// Process-lifetime store, for hosts without durable storage and for tests.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    value: Mutex<Option<String>>,
}

impl MemoryPreferenceStore {
    pub fn with_value(code: &str) -> Self {
        Self {
            value: Mutex::new(Some(code.to_string())),
        }
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self
            .value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }

    fn save(&self, code: &str) -> Result<()> {
        *self.value.lock().unwrap_or_else(PoisonError::into_inner) = Some(code.to_string());
        Ok(())
    }
}

/// Stores the preference in a small JSON key-value file.
///
/// Other keys already present in the file are preserved on save.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let content = std::fs::read_to_string(&self.path)
            .context(format!("Failed to read preferences at {}", self.path.display()))?;
        if content.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&content)
            .context(format!("Failed to parse preferences at {}", self.path.display()))
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load(&self) -> Result<Option<String>> {
        Ok(self.read_entries()?.remove(PREFERENCE_KEY))
    }

    fn save(&self, code: &str) -> Result<()> {
        // A corrupt file is replaced rather than blocking every future save
        let mut entries = self.read_entries().unwrap_or_default();
        entries.insert(PREFERENCE_KEY.to_string(), code.to_string());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).context(format!(
                    "Failed to create preference directory {}",
                    parent.display()
                ))?;
            }
        }

        let content = serde_json::to_string_pretty(&entries)?;
        std::fs::write(&self.path, content)
            .context(format!("Failed to write preferences at {}", self.path.display()))
    }
}
