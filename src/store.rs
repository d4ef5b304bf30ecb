//! Token Store
//!
//! Storage collaborator contract plus in-memory and mock implementations.
//! Stores only ever see transformed keys; the raw token text never reaches
//! this boundary.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::StorageError;
use crate::types::TokenRecord;

/// Storage interface the token manager depends on.
///
/// Any key-value-capable backend satisfies the contract as long as it
/// preserves the expiration instant without truncation, round-trips the
/// record's strings exactly, and looks keys up by exact string equality.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Persist a record under its transformed key.
    async fn write(&self, record: TokenRecord) -> Result<(), StorageError>;

    /// Fetch the record stored under a transformed key, if any.
    async fn read(&self, key: &str) -> Result<Option<TokenRecord>, StorageError>;

    /// Delete the record stored under a transformed key.
    ///
    /// Idempotent: removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory token store implementation.
pub struct InMemoryTokenStore {
    records: Mutex<HashMap<String, TokenRecord>>,
}

impl InMemoryTokenStore {
    /// Create new in-memory token store.
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.records.lock().unwrap().is_empty()
    }
}

impl Default for InMemoryTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenStore for InMemoryTokenStore {
    async fn write(&self, record: TokenRecord) -> Result<(), StorageError> {
        self.records
            .lock()
            .unwrap()
            .insert(record.token.clone(), record);
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Option<TokenRecord>, StorageError> {
        let records = self.records.lock().unwrap();
        Ok(records.get(key).cloned())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.records.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Mock token store for testing.
#[derive(Default)]
pub struct MockTokenStore {
    records: Mutex<HashMap<String, TokenRecord>>,
    write_history: Mutex<Vec<TokenRecord>>,
    read_history: Mutex<Vec<String>>,
    remove_history: Mutex<Vec<String>>,
    next_error: Mutex<Option<StorageError>>,
    should_fail: Mutex<bool>,
}

impl MockTokenStore {
    /// Create new mock token store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set next error to return.
    pub fn set_next_error(&self, error: StorageError) -> &Self {
        *self.next_error.lock().unwrap() = Some(error);
        self
    }

    /// Set store to fail all operations.
    pub fn set_should_fail(&self, should_fail: bool) -> &Self {
        *self.should_fail.lock().unwrap() = should_fail;
        self
    }

    /// Pre-populate a record.
    pub fn add_record(&self, record: TokenRecord) -> &Self {
        self.records
            .lock()
            .unwrap()
            .insert(record.token.clone(), record);
        self
    }

    /// Get write history.
    pub fn get_write_history(&self) -> Vec<TokenRecord> {
        self.write_history.lock().unwrap().clone()
    }

    /// Get read history (keys queried).
    pub fn get_read_history(&self) -> Vec<String> {
        self.read_history.lock().unwrap().clone()
    }

    /// Get remove history (keys removed).
    pub fn get_remove_history(&self) -> Vec<String> {
        self.remove_history.lock().unwrap().clone()
    }

    fn check_error(&self) -> Result<(), StorageError> {
        if *self.should_fail.lock().unwrap() {
            return Err(StorageError::WriteFailed {
                message: "Mock store failure".to_string(),
            });
        }

        if let Some(error) = self.next_error.lock().unwrap().take() {
            return Err(error);
        }

        Ok(())
    }
}

#[async_trait]
impl TokenStore for MockTokenStore {
    async fn write(&self, record: TokenRecord) -> Result<(), StorageError> {
        self.check_error()?;

        self.write_history.lock().unwrap().push(record.clone());
        self.records
            .lock()
            .unwrap()
            .insert(record.token.clone(), record);
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Option<TokenRecord>, StorageError> {
        self.check_error()?;

        self.read_history.lock().unwrap().push(key.to_string());
        Ok(self.records.lock().unwrap().get(key).cloned())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_error()?;

        self.remove_history.lock().unwrap().push(key.to_string());
        self.records.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Create in-memory token store.
pub fn create_in_memory_token_store() -> InMemoryTokenStore {
    InMemoryTokenStore::new()
}

/// Create mock token store for testing.
pub fn create_mock_token_store() -> MockTokenStore {
    MockTokenStore::new()
}
