//! Namespaced key-value record store.
//!
//! Every logical table (the user list, a user's question pool, result list,
//! stats) lives under its own key and is read and written wholesale as one
//! JSON document. There is no partial update and no transaction: the last
//! write wins.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;

/// Name of a record in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKey {
    /// All registered users, credentials included.
    Users,
    /// The signed-in user, if any.
    CurrentUser,
    /// A user's question pool.
    Questions(String),
    /// A user's submitted test results.
    Results(String),
    /// A user's aggregate stats.
    Stats(String),
}

impl RecordKey {
    /// The storage name of this record.
    pub fn name(&self) -> String {
        match self {
            RecordKey::Users => "users".to_string(),
            RecordKey::CurrentUser => "current_user".to_string(),
            RecordKey::Questions(user_id) => format!("questions_{user_id}"),
            RecordKey::Results(user_id) => format!("tests_{user_id}"),
            RecordKey::Stats(user_id) => format!("stats_{user_id}"),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Backend holding raw record documents.
pub trait RecordStore {
    /// Read the raw document stored under `key`, or `None` if absent.
    fn read(&self, key: &RecordKey) -> Result<Option<String>, StoreError>;

    /// Replace the document stored under `key`.
    fn write(&mut self, key: &RecordKey, value: &str) -> Result<(), StoreError>;

    /// Delete the record. Removing a missing record is not an error.
    fn remove(&mut self, key: &RecordKey) -> Result<(), StoreError>;

    /// Read and deserialize a record.
    fn load<T: DeserializeOwned>(&self, key: &RecordKey) -> Result<Option<T>, StoreError>
    where
        Self: Sized,
    {
        let Some(raw) = self.read(key)? else {
            return Ok(None);
        };
        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Serialize {
                key: key.name(),
                source,
            })
    }

    /// Read a record, falling back to the type's default when it is absent.
    fn load_or_default<T: DeserializeOwned + Default>(
        &self,
        key: &RecordKey,
    ) -> Result<T, StoreError>
    where
        Self: Sized,
    {
        Ok(self.load(key)?.unwrap_or_default())
    }

    /// Serialize and write a record.
    fn save<T: Serialize>(&mut self, key: &RecordKey, value: &T) -> Result<(), StoreError>
    where
        Self: Sized,
    {
        let raw = serde_json::to_string_pretty(value).map_err(|source| StoreError::Serialize {
            key: key.name(),
            source,
        })?;
        self.write(key, &raw)
    }
}

/// In-memory store, used by tests and embedders that persist elsewhere.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    records: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordStore for MemoryStore {
    fn read(&self, key: &RecordKey) -> Result<Option<String>, StoreError> {
        Ok(self.records.get(&key.name()).cloned())
    }

    fn write(&mut self, key: &RecordKey, value: &str) -> Result<(), StoreError> {
        self.records.insert(key.name(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &RecordKey) -> Result<(), StoreError> {
        self.records.remove(&key.name());
        Ok(())
    }
}

/// Store keeping one `<key>.json` file per record in a data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Open a store rooted at `root`. The directory is created on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The data directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &RecordKey) -> PathBuf {
        self.root.join(format!("{}.json", key.name()))
    }
}

impl RecordStore for JsonFileStore {
    fn read(&self, key: &RecordKey) -> Result<Option<String>, StoreError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                tracing::debug!(record = %key, path = %path.display(), "read record");
                Ok(Some(content))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.name(),
                source,
            }),
        }
    }

    fn write(&mut self, key: &RecordKey, value: &str) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            key: key.name(),
            source,
        };
        std::fs::create_dir_all(&self.root).map_err(io_err)?;
        let path = self.path_for(key);
        std::fs::write(&path, value).map_err(io_err)?;
        tracing::debug!(record = %key, path = %path.display(), "wrote record");
        Ok(())
    }

    fn remove(&mut self, key: &RecordKey) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                key: key.name(),
                source,
            }),
        }
    }
}
