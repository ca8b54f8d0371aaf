//! Key-value persistence underneath the session store.
//!
//! Writes are grouped into a [`PreferenceEdit`] and applied with
//! [`PreferenceStore::commit`], so either every change in the edit becomes
//! visible or none does.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::PreferenceError;

/// File name of the persisted auth namespace.
pub const AUTH_PREFERENCES_FILE: &str = "eatoff_auth.json";

#[derive(Debug, Clone, PartialEq)]
enum EditOp {
    Put(String, Value),
    Remove(String),
}

/// A batch of preference writes committed together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreferenceEdit {
    clear: bool,
    ops: Vec<EditOp>,
}

impl PreferenceEdit {
    /// Empty edit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a flag.
    #[must_use]
    pub fn put_bool(mut self, key: &str, value: bool) -> Self {
        self.ops.push(EditOp::Put(key.to_string(), Value::Bool(value)));
        self
    }

    /// Store a string.
    #[must_use]
    pub fn put_string(mut self, key: &str, value: impl Into<String>) -> Self {
        self.ops
            .push(EditOp::Put(key.to_string(), Value::String(value.into())));
        self
    }

    /// Delete a key.
    #[must_use]
    pub fn remove(mut self, key: &str) -> Self {
        self.ops.push(EditOp::Remove(key.to_string()));
        self
    }

    /// Drop every stored key before the other operations apply.
    #[must_use]
    pub fn clear(mut self) -> Self {
        self.clear = true;
        self
    }

    fn apply(self, values: &mut Map<String, Value>) {
        if self.clear {
            values.clear();
        }
        for op in self.ops {
            match op {
                EditOp::Put(key, value) => {
                    values.insert(key, value);
                }
                EditOp::Remove(key) => {
                    values.remove(&key);
                }
            }
        }
    }
}

/// Persistent key-value store.
pub trait PreferenceStore: Send + Sync + std::fmt::Debug {
    /// Raw stored value for `key`.
    fn get(&self, key: &str) -> Option<Value>;

    /// Apply all writes in `edit` as one unit.
    ///
    /// # Errors
    /// Returns [`PreferenceError`] when the backing storage cannot be written;
    /// the visible state is then unchanged.
    fn commit(&self, edit: PreferenceEdit) -> Result<(), PreferenceError>;

    /// Stored flag, `None` when absent or not a boolean.
    fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(|value| value.as_bool())
    }

    /// Stored string, `None` when absent or not a string.
    fn get_string(&self, key: &str) -> Option<String> {
        match self.get(key) {
            Some(Value::String(value)) => Some(value),
            _ => None,
        }
    }

    /// Store a single flag.
    ///
    /// # Errors
    /// See [`PreferenceStore::commit`].
    fn put_bool(&self, key: &str, value: bool) -> Result<(), PreferenceError> {
        self.commit(PreferenceEdit::new().put_bool(key, value))
    }

    /// Store a single string.
    ///
    /// # Errors
    /// See [`PreferenceStore::commit`].
    fn put_string(&self, key: &str, value: &str) -> Result<(), PreferenceError> {
        self.commit(PreferenceEdit::new().put_string(key, value))
    }

    /// Delete a single key.
    ///
    /// # Errors
    /// See [`PreferenceStore::commit`].
    fn remove(&self, key: &str) -> Result<(), PreferenceError> {
        self.commit(PreferenceEdit::new().remove(key))
    }

    /// Delete every key.
    ///
    /// # Errors
    /// See [`PreferenceStore::commit`].
    fn clear(&self) -> Result<(), PreferenceError> {
        self.commit(PreferenceEdit::new().clear())
    }
}

/// In-process store; contents vanish with the value.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: Mutex<Map<String, Value>>,
}

impl MemoryPreferences {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw value, bypassing type-safe puts. Used to model corrupt state.
    pub fn insert_raw(&self, key: &str, value: Value) {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value);
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// True when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<Value> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn commit(&self, edit: PreferenceEdit) -> Result<(), PreferenceError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        edit.apply(&mut values);
        Ok(())
    }
}

/// JSON object file on disk, cached in memory.
#[derive(Debug)]
pub struct FilePreferences {
    path: PathBuf,
    values: Mutex<Map<String, Value>>,
}

impl FilePreferences {
    /// Open the auth namespace inside `data_dir`.
    #[must_use]
    pub fn open(data_dir: &Path) -> Self {
        Self::open_file(data_dir.join(AUTH_PREFERENCES_FILE))
    }

    /// Open an explicit file. A missing file is an empty store; an unreadable
    /// or malformed one is logged and treated as empty.
    #[must_use]
    pub fn open_file(path: PathBuf) -> Self {
        let values = load(&path);
        Self {
            path,
            values: Mutex::new(values),
        }
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, values: &Map<String, Value>) -> Result<(), PreferenceError> {
        let io_error = |source: io::Error| PreferenceError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let encoded = serde_json::to_vec_pretty(values)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, encoded).map_err(io_error)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600)).map_err(io_error)?;
        }
        fs::rename(&tmp, &self.path).map_err(io_error)?;

        debug!(path = %self.path.display(), keys = values.len(), "preferences written");
        Ok(())
    }
}

fn load(path: &Path) -> Map<String, Value> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Map::new(),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "unreadable preferences, starting empty");
            return Map::new();
        }
    };

    match serde_json::from_str::<Value>(&contents) {
        Ok(Value::Object(values)) => values,
        Ok(_) | Err(_) => {
            warn!(path = %path.display(), "malformed preferences, starting empty");
            Map::new()
        }
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<Value> {
        self.values
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn commit(&self, edit: PreferenceEdit) -> Result<(), PreferenceError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        let mut next = values.clone();
        edit.apply(&mut next);
        self.write(&next)?;
        *values = next;
        Ok(())
    }
}
