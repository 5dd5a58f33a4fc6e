//! Named slave-configuration presets.
//!
//! A store is one JSON file holding an ordered list of records. Each record is
//! kept as its own compact JSON string so a single corrupt entry does not
//! poison the rest of the file:
//!
//! ```json
//! {"configs": ["{\"name\":\"line-a\",\"slaveNum\":1,\"slaves\":[...]}"]}
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use whts_message::backend_to_master::{SlaveConfig, SlaveEntry};

/// Environment variable naming the default store file.
pub const STORE_ENV: &str = "WHTS_STORE";

/// File name used when no path is configured.
pub const DEFAULT_STORE_FILE: &str = "whts-slave-configs.json";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to access store {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid store file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no slave configuration named {0:?}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// One named slave configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaveConfigRecord {
    pub name: String,
    pub slave_num: usize,
    pub slaves: Vec<SlaveEntry>,
}

impl SlaveConfigRecord {
    pub fn new(name: impl Into<String>, slaves: Vec<SlaveEntry>) -> Self {
        Self {
            name: name.into(),
            slave_num: slaves.len(),
            slaves,
        }
    }

    /// The Backend→Master message this record describes.
    pub fn to_message(&self) -> SlaveConfig {
        SlaveConfig::new(self.slaves.clone())
    }

    fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn from_json_string(s: &str) -> Result<Self> {
        let mut record: Self = serde_json::from_str(s)?;
        record.slave_num = record.slaves.len();
        Ok(record)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    configs: Vec<String>,
}

/// An ordered, name-unique collection of [`SlaveConfigRecord`]s backed by a file.
#[derive(Debug, Clone)]
pub struct SlaveConfigStore {
    path: PathBuf,
    records: Vec<SlaveConfigRecord>,
}

impl SlaveConfigStore {
    /// Resolve the store path: explicit path, then `WHTS_STORE`, then the
    /// default file name in the working directory.
    pub fn default_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }
        std::env::var_os(STORE_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_FILE))
    }

    /// An empty store that will save to `path`.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Vec::new(),
        }
    }

    /// Load a store. A missing file yields an empty store; entries that fail
    /// to parse are skipped.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "store file missing, starting empty");
                return Ok(Self::empty(path));
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        let file: StoreFile = serde_json::from_str(&text)?;
        let mut store = Self::empty(path);
        for (index, entry) in file.configs.iter().enumerate() {
            match SlaveConfigRecord::from_json_string(entry) {
                Ok(record) => {
                    store.add(record);
                }
                Err(err) => warn!(index, error = %err, "skipping invalid slave config entry"),
            }
        }
        debug!(path = %store.path.display(), records = store.records.len(), "loaded store");
        Ok(store)
    }

    /// Write every record back to the store file.
    pub fn save(&self) -> Result<()> {
        let configs = self
            .records
            .iter()
            .map(SlaveConfigRecord::to_json_string)
            .collect::<Result<Vec<_>>>()?;
        let text = serde_json::to_string_pretty(&StoreFile { configs })?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&self.path, text).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;
        info!(path = %self.path.display(), records = self.records.len(), "saved store");
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Insert a record, replacing any record with the same name in place.
    /// Returns `true` when an existing record was replaced.
    pub fn add(&mut self, mut record: SlaveConfigRecord) -> bool {
        record.slave_num = record.slaves.len();
        match self.records.iter_mut().find(|r| r.name == record.name) {
            Some(existing) => {
                *existing = record;
                true
            }
            None => {
                self.records.push(record);
                false
            }
        }
    }

    /// Remove a record by name.
    pub fn remove(&mut self, name: &str) -> Result<SlaveConfigRecord> {
        let index = self
            .records
            .iter()
            .position(|r| r.name == name)
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        Ok(self.records.remove(index))
    }

    pub fn get(&self, name: &str) -> Option<&SlaveConfigRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    /// Records in insertion order.
    pub fn list(&self) -> &[SlaveConfigRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Copy a record under a fresh name and return that name.
    ///
    /// The copy is named `<name>_copy`; if that is taken, `<name>_copy(2)`,
    /// `<name>_copy(3)` and so on.
    pub fn duplicate(&mut self, name: &str) -> Result<String> {
        let source = self
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;

        let base = format!("{name}_copy");
        let mut candidate = base.clone();
        let mut index = 1;
        while self.get(&candidate).is_some() {
            index += 1;
            candidate = format!("{base}({index})");
        }

        self.records
            .push(SlaveConfigRecord::new(candidate.clone(), source.slaves));
        Ok(candidate)
    }
}
