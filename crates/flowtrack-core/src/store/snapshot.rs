//! Saving and restoring a store through a [`KvStore`].
//!
//! Each collection lives under its own key and is written independently.
//! A failed write is logged and skipped; the in-memory store stays
//! authoritative and nothing is retried.

use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{ActiveSession, FlowStore, StoreSettings};
use crate::storage::KvStore;
use crate::task::{Task, TimeBlock};

pub const TASKS_KEY: &str = "tasks";
pub const TIME_BLOCKS_KEY: &str = "time_blocks";
pub const ACTIVE_SESSION_KEY: &str = "active_session";

impl FlowStore {
    /// Write tasks, blocks and the active session to `kv`.
    ///
    /// Returns how many keys were written successfully. Failures are logged
    /// at warn level and otherwise ignored.
    pub fn persist<K: KvStore + ?Sized>(&self, kv: &K) -> usize {
        let mut written = 0;
        written += usize::from(write_json(kv, TASKS_KEY, &self.tasks));
        written += usize::from(write_json(kv, TIME_BLOCKS_KEY, &self.blocks));

        match &self.active {
            Some(session) => written += usize::from(write_json(kv, ACTIVE_SESSION_KEY, session)),
            None => match kv.remove(ACTIVE_SESSION_KEY) {
                Ok(()) => written += 1,
                Err(e) => tracing::warn!(key = ACTIVE_SESSION_KEY, error = %e, "failed to clear key"),
            },
        }
        written
    }

    /// Restore a store from `kv`.
    ///
    /// Missing keys yield empty collections. Unreadable or corrupt keys are
    /// logged and treated as missing.
    pub fn load<K: KvStore + ?Sized>(kv: &K, settings: StoreSettings) -> Self {
        let tasks: Vec<Task> = read_json(kv, TASKS_KEY).unwrap_or_default();
        let blocks: Vec<TimeBlock> = read_json(kv, TIME_BLOCKS_KEY).unwrap_or_default();
        let active: Option<ActiveSession> = read_json(kv, ACTIVE_SESSION_KEY);
        tracing::debug!(tasks = tasks.len(), blocks = blocks.len(), "store loaded");
        Self::from_parts(tasks, blocks, active, settings)
    }
}

fn write_json<K: KvStore + ?Sized, T: Serialize + ?Sized>(kv: &K, key: &str, value: &T) -> bool {
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to serialize");
            return false;
        }
    };
    match kv.set(key, &json) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to persist");
            false
        }
    }
}

fn read_json<K: KvStore + ?Sized, T: DeserializeOwned>(kv: &K, key: &str) -> Option<T> {
    let raw = match kv.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to read");
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "discarding corrupt value");
            None
        }
    }
}
