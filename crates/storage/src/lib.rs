#![forbid(unsafe_code)]

pub mod file;
pub mod import;
pub mod repository;
pub mod sqlite;

pub use file::JsonFileSource;
pub use repository::{
    AttemptStore, InMemoryRepository, QuestionSource, Snapshot, SnapshotKey, SnapshotRepository,
    Storage, StorageError,
};
