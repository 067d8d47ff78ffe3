pub mod config;
pub mod plan;
pub mod stats;
pub mod task;

use flowtrack_core::{Config, Database, FlowStore};

/// Open the on-disk database and load the store from it.
pub fn open_store(config: &Config) -> Result<(Database, FlowStore), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let store = FlowStore::load(&db, config.store_settings());
    Ok((db, store))
}

/// Print any serializable value as pretty JSON.
pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
