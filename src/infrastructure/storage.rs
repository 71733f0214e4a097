use std::collections::HashMap;

use web_sys::Storage;

use crate::domain::drawing::KeyValueStorage;
use crate::domain::errors::StorageError;

/// `window.localStorage`.
pub struct BrowserLocalStorage {
    storage: Storage,
}

impl BrowserLocalStorage {
    pub fn new() -> Result<Self, StorageError> {
        let window =
            web_sys::window().ok_or_else(|| StorageError::Unavailable("no window".to_string()))?;
        let storage = window
            .local_storage()
            .map_err(|e| StorageError::Unavailable(format!("{e:?}")))?
            .ok_or_else(|| StorageError::Unavailable("localStorage unavailable".to_string()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStorage for BrowserLocalStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage.get_item(key).map_err(|e| StorageError::Read(format!("{e:?}")))
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        // quota exceeded surfaces here as a DOMException
        self.storage.set_item(key, value).map_err(|e| StorageError::Write(format!("{e:?}")))
    }
}

/// Process-local storage, for hosts without localStorage and for tests.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    items: HashMap<String, String>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.items.insert(key.into(), value.into());
        self
    }

    pub fn item(&self, key: &str) -> Option<&str> {
        self.items.get(key).map(String::as_str)
    }
}

impl KeyValueStorage for InMemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
