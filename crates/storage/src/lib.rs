#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    BestRecordRepository, InMemoryRepository, SessionSummaryRepository, SessionSummaryRow, Storage,
    StorageError,
};
