//! # flowtrack Core Library
//!
//! Business logic for the flowtrack productivity tracker: sizing tasks,
//! tracking time spent on them and deriving focus metrics from the record.
//! Front-ends (the bundled CLI, or any UI) are thin layers over this crate.
//!
//! ## Architecture
//!
//! - **Allocation**: pure power-law sizing and cone-of-slippage functions
//! - **Context switching**: switch cost between tasks and per-day totals
//! - **Store**: an owned, injectable [`FlowStore`] holding tasks and time
//!   blocks and driving their lifecycle
//! - **Stats**: time metrics, chrono-fingerprint, accuracy and summaries,
//!   recomputed from the raw records on every call
//! - **Storage**: key-value persistence (SQLite or in-memory) and TOML
//!   configuration
//!
//! ## Key Components
//!
//! - [`FlowStore`]: task/time-block owner and lifecycle manager
//! - [`allocate`] / [`cone_of_slippage`]: time allocation heuristics
//! - [`time_metrics`] / [`chrono_fingerprint`]: derived statistics
//! - [`Database`]: SQLite key-value store
//! - [`Config`]: application configuration

pub mod allocation;
pub mod context_switch;
pub mod error;
pub mod events;
pub mod stats;
pub mod storage;
pub mod store;
pub mod task;

pub use allocation::{allocate, cone_of_slippage, Allocation, ConeOfSlippage};
pub use context_switch::{daily_switch_cost, sequence_switch_cost, switch_cost};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use stats::{
    analytics_summary, chrono_fingerprint, historical_accuracy, time_metrics, AnalyticsSummary,
    ChronoFingerprint, MetricsSettings, TimeMetrics,
};
pub use storage::{Config, Database, KvStore, MemoryKv};
pub use store::{ActiveSession, FlowStore, StoreSettings};
pub use task::{NewTask, Task, TaskState, TimeBlock};
