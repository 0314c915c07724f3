// FocusFlow - task tracking with filtered/sorted views over a persisted collection

pub mod command;
pub mod config;
pub mod dates;
pub mod error;
pub mod filter;
pub mod json;
pub mod kv;
pub mod models;
pub mod record;
pub mod store;

// Re-export main types for convenience
pub use command::{Command, Outcome};
pub use config::Config;
pub use error::StoreError;
pub use filter::{CategoryFilter, Chip, SortKey, Stats, View, ViewQuery, compute_view};
pub use kv::{KeyValue, MemoryKv, SqliteKv};
pub use models::{DueStatus, NewTask, Task, TaskUpdate};
pub use record::Record;
pub use store::{OpenOptions, TaskStore};
