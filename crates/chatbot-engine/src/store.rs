//! Conversation store.
//!
//! Holds the ordered message log and persists it after every mutation.
//! When storage fails the store keeps working in memory and records a
//! notice for the UI.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::message::Message;
use crate::persistence::{self, PersistenceError, StateStorage, DEFAULT_STORAGE_KEY};

/// The persisted conversation slice.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConversationState {
    /// Messages in insertion order.
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// Error type for store mutations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Message index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Owns the conversation and keeps storage in sync with it.
pub struct ConversationStore {
    state: ConversationState,
    storage: Option<Box<dyn StateStorage>>,
    key: String,
    notice: Option<String>,
}

impl std::fmt::Debug for ConversationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationStore")
            .field("state", &self.state)
            .field("persistent", &self.storage.is_some())
            .field("key", &self.key)
            .field("notice", &self.notice)
            .finish()
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl ConversationStore {
    /// Create a store that never touches durable storage.
    pub fn in_memory() -> Self {
        Self {
            state: ConversationState::default(),
            storage: None,
            key: DEFAULT_STORAGE_KEY.to_string(),
            notice: None,
        }
    }

    /// Open a store backed by `storage`, rehydrating from `key`.
    ///
    /// A snapshot that cannot be read leaves the store empty and in
    /// memory-only mode, so the unreadable snapshot is never overwritten.
    pub fn open(storage: Box<dyn StateStorage>, key: impl Into<String>) -> Self {
        let key = key.into();
        match persistence::load_state(storage.as_ref(), &key) {
            Ok(state) => {
                let state = state.unwrap_or_default();
                debug!(key = %key, messages = state.messages.len(), "Rehydrated conversation");
                Self {
                    state,
                    storage: Some(storage),
                    key,
                    notice: None,
                }
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Failed to load conversation, using memory only");
                Self {
                    state: ConversationState::default(),
                    storage: None,
                    key,
                    notice: Some(storage_notice(&e)),
                }
            }
        }
    }

    /// Append a message. No validation happens here.
    pub fn add_message(&mut self, msg: Message) {
        self.state.messages.push(msg);
        self.persist();
    }

    /// Replace the message at `index`.
    pub fn update_message(&mut self, index: usize, msg: Message) -> Result<(), StoreError> {
        let len = self.state.messages.len();
        let Some(slot) = self.state.messages.get_mut(index) else {
            warn!(index, len, "Rejected message update");
            return Err(StoreError::IndexOutOfRange { index, len });
        };
        *slot = msg;
        self.persist();
        Ok(())
    }

    /// Replace the whole conversation with the empty initial state.
    pub fn reset(&mut self) {
        self.state = ConversationState::default();
        self.persist();
    }

    /// Messages in insertion order.
    pub fn messages(&self) -> &[Message] {
        &self.state.messages
    }

    /// Current conversation state.
    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    /// Number of messages.
    pub fn len(&self) -> usize {
        self.state.messages.len()
    }

    /// Check if the conversation is empty.
    pub fn is_empty(&self) -> bool {
        self.state.messages.is_empty()
    }

    /// Most recent message, if any.
    pub fn last(&self) -> Option<&Message> {
        self.state.messages.last()
    }

    /// Whether mutations are still written to durable storage.
    pub fn is_persistent(&self) -> bool {
        self.storage.is_some()
    }

    /// Storage notice raised by a degraded store, if any.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    fn persist(&mut self) {
        let Some(storage) = &self.storage else {
            return;
        };
        if let Err(e) = persistence::save_state(storage.as_ref(), &self.key, &self.state) {
            warn!(key = %self.key, error = %e, "Failed to persist conversation, using memory only");
            self.notice = Some(storage_notice(&e));
            self.storage = None;
        }
    }
}

fn storage_notice(error: &PersistenceError) -> String {
    format!("History is not being saved ({error})")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{FileStorage, MemoryStorage};

    /// Storage whose writes always fail.
    struct BrokenStorage;

    impl StateStorage for BrokenStorage {
        fn read(&self, _key: &str) -> Result<Option<String>, PersistenceError> {
            Ok(None)
        }

        fn write(&self, _key: &str, _value: &str) -> Result<(), PersistenceError> {
            Err(PersistenceError::Io(std::io::Error::other("disk full")))
        }

        fn remove(&self, _key: &str) -> Result<(), PersistenceError> {
            Ok(())
        }
    }

    fn store_with(storage: &MemoryStorage) -> ConversationStore {
        ConversationStore::open(Box::new(storage.clone()), "root")
    }

    #[test]
    fn test_add_message_appends_in_order() {
        let mut store = ConversationStore::in_memory();
        store.add_message(Message::bot("one"));
        store.add_message(Message::bot("two"));

        assert_eq!(store.len(), 2);
        assert_eq!(store.messages()[0].text, "one");
        assert_eq!(store.last().unwrap().text, "two");
    }

    #[test]
    fn test_update_message_replaces_only_target() {
        let mut store = ConversationStore::in_memory();
        store.add_message(Message::bot("one"));
        store.add_message(Message::bot("two"));
        store.add_message(Message::bot("three"));
        let before = store.messages().to_vec();

        store.update_message(1, Message::bot_revealed("TWO")).unwrap();

        assert_eq!(store.messages()[0], before[0]);
        assert_eq!(store.messages()[1], Message::bot_revealed("TWO"));
        assert_eq!(store.messages()[2], before[2]);
    }

    #[test]
    fn test_update_message_out_of_range() {
        let mut store = ConversationStore::in_memory();
        store.add_message(Message::bot("one"));

        let result = store.update_message(1, Message::bot("nope"));
        assert_eq!(result, Err(StoreError::IndexOutOfRange { index: 1, len: 1 }));
        assert_eq!(store.len(), 1);
        assert_eq!(store.messages()[0].text, "one");
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut store = ConversationStore::in_memory();
        store.add_message(Message::bot("one"));
        store.add_message(Message::bot("two"));

        store.reset();
        assert!(store.is_empty());
        assert_eq!(store.state(), &ConversationState::default());
    }

    #[test]
    fn test_every_mutation_is_persisted() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);

        store.add_message(Message::bot("one"));
        let saved = persistence::load_state(&storage, "root").unwrap().unwrap();
        assert_eq!(saved.messages.len(), 1);

        store.update_message(0, Message::bot("uno")).unwrap();
        let saved = persistence::load_state(&storage, "root").unwrap().unwrap();
        assert_eq!(saved.messages[0].text, "uno");

        store.reset();
        let saved = persistence::load_state(&storage, "root").unwrap().unwrap();
        assert!(saved.messages.is_empty());
    }

    #[test]
    fn test_rehydrates_from_storage() {
        let storage = MemoryStorage::new();
        {
            let mut store = store_with(&storage);
            store.add_message(Message::bot("kept"));
        }

        let store = store_with(&storage);
        assert_eq!(store.len(), 1);
        assert_eq!(store.messages()[0].text, "kept");
        assert!(store.is_persistent());
    }

    #[test]
    fn test_rehydrates_from_file_storage() {
        let temp = tempfile::TempDir::new().unwrap();
        {
            let storage = FileStorage::new(temp.path()).unwrap();
            let mut store = ConversationStore::open(Box::new(storage), "root");
            store.add_message(Message::bot("on disk"));
        }

        let storage = FileStorage::new(temp.path()).unwrap();
        let store = ConversationStore::open(Box::new(storage), "root");
        assert_eq!(store.messages()[0].text, "on disk");
    }

    #[test]
    fn test_corrupt_snapshot_degrades_without_overwriting() {
        let storage = MemoryStorage::new();
        storage.write("root", "not valid json").unwrap();

        let mut store = store_with(&storage);
        assert!(store.is_empty());
        assert!(!store.is_persistent());
        assert!(store.notice().is_some());

        store.add_message(Message::bot("memory only"));
        assert_eq!(store.len(), 1);
        assert_eq!(storage.get("root").as_deref(), Some("not valid json"));
    }

    #[test]
    fn test_future_schema_degrades() {
        let storage = MemoryStorage::new();
        storage
            .write("root", r#"{"schema_version": 7, "chatState": {"messages": []}}"#)
            .unwrap();

        let store = store_with(&storage);
        assert!(!store.is_persistent());
        assert!(store.notice().unwrap().contains("Unsupported schema"));
    }

    #[test]
    fn test_write_failure_degrades_to_memory() {
        let mut store = ConversationStore::open(Box::new(BrokenStorage), "root");
        assert!(store.is_persistent());
        assert!(store.notice().is_none());

        store.add_message(Message::bot("still here"));

        assert_eq!(store.len(), 1);
        assert!(!store.is_persistent());
        assert!(store.notice().unwrap().contains("disk full"));
    }
}
