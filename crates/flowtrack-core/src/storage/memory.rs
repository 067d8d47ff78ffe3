use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use super::KvStore;
use crate::error::StorageError;

/// In-memory key-value store.
///
/// `failing_writes` makes every `set`/`remove` fail, which lets callers
/// exercise their handling of an unavailable store.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: RefCell<HashMap<String, String>>,
    fail_writes: Cell<bool>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_writes() -> Self {
        let kv = Self::default();
        kv.fail_writes.set(true);
        kv
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::QueryFailed("store is read-only".into()));
        }
        Ok(())
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check_writable()?;
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}
