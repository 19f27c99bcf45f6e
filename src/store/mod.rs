//! Document persistence for tasks and daily reports.
//!
//! Two logical collections are used: `tasks`, keyed by task id and queried by
//! exact match on `date`, and `daily_reports`, keyed by ISO day. Writes are
//! whole-document overwrites.

pub mod firestore;
pub mod local;

use thiserror::Error;

use crate::models::{DailyReport, Task};

pub use firestore::{FirestoreConfig, FirestoreStore};
pub use local::LocalStore;

pub const TASKS_COLLECTION: &str = "tasks";
pub const REPORTS_COLLECTION: &str = "daily_reports";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Store returned HTTP {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Malformed document: {0}")]
    Decode(String),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Store is not configured: {0}")]
    Config(String),
    #[error("Failed to create storage directory: {0}")]
    Directory(String),
}

/// Thin pass-through over a document database.
///
/// Implementations must be movable to the sync worker thread.
pub trait DocumentStore: Send {
    /// All tasks whose `date` equals `date` (YYYY-MM-DD)
    fn query_tasks_by_date(&self, date: &str) -> Result<Vec<Task>, StoreError>;
    fn get_task(&self, id: &str) -> Result<Option<Task>, StoreError>;
    /// Create or overwrite the task document keyed by `task.id`
    fn set_task(&self, task: &Task) -> Result<(), StoreError>;
    fn delete_task(&self, id: &str) -> Result<(), StoreError>;
    fn get_report(&self, date: &str) -> Result<Option<DailyReport>, StoreError>;
    /// Create or overwrite the report document keyed by `report.date`
    fn set_report(&self, report: &DailyReport) -> Result<(), StoreError>;
}

impl<S: DocumentStore + ?Sized> DocumentStore for Box<S> {
    fn query_tasks_by_date(&self, date: &str) -> Result<Vec<Task>, StoreError> {
        (**self).query_tasks_by_date(date)
    }

    fn get_task(&self, id: &str) -> Result<Option<Task>, StoreError> {
        (**self).get_task(id)
    }

    fn set_task(&self, task: &Task) -> Result<(), StoreError> {
        (**self).set_task(task)
    }

    fn delete_task(&self, id: &str) -> Result<(), StoreError> {
        (**self).delete_task(id)
    }

    fn get_report(&self, date: &str) -> Result<Option<DailyReport>, StoreError> {
        (**self).get_report(date)
    }

    fn set_report(&self, report: &DailyReport) -> Result<(), StoreError> {
        (**self).set_report(report)
    }
}
