mod config;
pub mod database;
pub mod memory;

pub use config::{Config, LoggingConfig, MetricsConfig, TasksConfig};
pub use database::Database;
pub use memory::MemoryKv;

use std::path::PathBuf;

use crate::error::StorageError;

/// String key-value storage.
///
/// Each key is written independently; there is no transaction spanning
/// several keys.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Returns the data directory, creating it if needed.
///
/// `FLOWTRACK_DATA_DIR` wins when set. Otherwise `~/.config/flowtrack/`, or
/// `~/.config/flowtrack-dev/` when `FLOWTRACK_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("FLOWTRACK_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("FLOWTRACK_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("flowtrack-dev")
            } else {
                base_dir.join("flowtrack")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
