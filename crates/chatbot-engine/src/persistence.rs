//! Key-value persistence for conversation state.
//!
//! The store writes a versioned JSON envelope under a single top-level
//! key. Only the conversation slice is whitelisted into the envelope.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::ConversationState;

/// Current schema version of the persisted envelope.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// Default top-level key the conversation is stored under.
pub const DEFAULT_STORAGE_KEY: &str = "root";

/// Error type for persistence operations.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid stored data: {0}")]
    InvalidData(String),

    #[error("Unsupported schema version: {0} (max supported: {1})")]
    UnsupportedSchema(u32, u32),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

/// A durable key-value store holding serialized snapshots.
pub trait StateStorage: Send {
    /// Read the value stored under `key`, if any.
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Store `value` under `key`, replacing any previous value.
    fn write(&self, key: &str, value: &str) -> Result<(), PersistenceError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), PersistenceError>;
}

/// On-disk envelope. Unknown top-level keys are ignored on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Envelope {
    schema_version: u32,
    #[serde(rename = "chatState", default)]
    chat_state: ConversationState,
}

/// Serialize conversation state into the persisted envelope.
pub fn encode_state(state: &ConversationState) -> Result<String, PersistenceError> {
    let envelope = Envelope {
        schema_version: CURRENT_SCHEMA_VERSION,
        chat_state: state.clone(),
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}

/// Parse a persisted envelope, checking its schema version first.
pub fn decode_state(content: &str) -> Result<ConversationState, PersistenceError> {
    let raw: serde_json::Value = serde_json::from_str(content)?;
    let version_u64 = raw
        .get("schema_version")
        .and_then(serde_json::Value::as_u64)
        .ok_or_else(|| PersistenceError::InvalidData("missing schema_version".to_string()))?;
    let version = u32::try_from(version_u64)
        .map_err(|_| PersistenceError::InvalidData("schema_version too large".to_string()))?;

    if version > CURRENT_SCHEMA_VERSION {
        return Err(PersistenceError::UnsupportedSchema(version, CURRENT_SCHEMA_VERSION));
    }

    // v1 is the only version so far; older versions would migrate here.
    let envelope: Envelope = serde_json::from_value(raw)?;
    Ok(envelope.chat_state)
}

/// Load conversation state from storage. Returns `Ok(None)` when nothing
/// has been stored yet.
pub fn load_state(
    storage: &dyn StateStorage,
    key: &str,
) -> Result<Option<ConversationState>, PersistenceError> {
    match storage.read(key)? {
        Some(content) => decode_state(&content).map(Some),
        None => Ok(None),
    }
}

/// Save conversation state to storage.
pub fn save_state(
    storage: &dyn StateStorage,
    key: &str,
    state: &ConversationState,
) -> Result<(), PersistenceError> {
    let json = encode_state(state)?;
    storage.write(key, &json)
}

/// Directory-backed storage: one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_path: PathBuf,
}

impl FileStorage {
    /// Create a new `FileStorage`, creating the directory if needed.
    pub fn new(base_path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, PersistenceError> {
        validate_key(key)?;
        Ok(self.base_path.join(format!("{key}.json")))
    }
}

impl StateStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let path = self.key_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(&path)?))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let path = self.key_path(key)?;
        atomic_write(&path, value.as_bytes())?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        let path = self.key_path(key)?;
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

/// In-memory storage. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    /// Create an empty in-memory storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw value under `key`, for inspection.
    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map still holds consistent strings.
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl StateStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        validate_key(key)?;
        Ok(self.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        validate_key(key)?;
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        validate_key(key)?;
        self.lock().remove(key);
        Ok(())
    }
}

/// Validate a storage key for filesystem safety.
fn validate_key(key: &str) -> Result<(), PersistenceError> {
    if key.is_empty() {
        return Err(PersistenceError::InvalidKey("key cannot be empty".to_string()));
    }

    for ch in key.chars() {
        if !ch.is_ascii_alphanumeric() && ch != '-' && ch != '_' {
            return Err(PersistenceError::InvalidKey(format!(
                "key contains invalid character: {ch}"
            )));
        }
    }

    Ok(())
}

/// Write content atomically using temp file + fsync + rename.
fn atomic_write(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);
    let pid = std::process::id();

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("file");
    let tmp_path = path.with_file_name(format!("{file_name}.{timestamp}.{pid}.tmp"));

    let result = (|| {
        let mut file = File::create(&tmp_path)?;
        file.write_all(content)?;
        file.sync_all()?;
        fs::rename(&tmp_path, path)?;
        Ok(())
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }

    result
}
