#![forbid(unsafe_code)]

pub mod bank_source;
pub mod repository;
pub mod sqlite;
pub mod stats_store;

pub use bank_source::{BankLoadError, load_question_bank};
pub use repository::{InMemoryRepository, KeyValueStore, KvEntry, Storage, StorageError};
pub use stats_store::StatsStore;
