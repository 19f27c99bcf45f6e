//! Local key-value persistence.
//!
//! Mirrors the remote collections as two JSON arrays stored under fixed keys
//! in a single SQLite table. The list-level helpers (`get_tasks`,
//! `save_tasks`, `get_reports`, `save_report`) log failures instead of
//! returning them; the `DocumentStore` impl propagates them.

use rusqlite::{Connection, OptionalExtension};
use std::path::PathBuf;

use super::{DocumentStore, StoreError};
use crate::models::{DailyReport, Task};

pub const TASKS_KEY: &str = "worklog_tasks";
pub const REPORTS_KEY: &str = "worklog_reports";

pub struct LocalStore {
    conn: Connection,
}

impl LocalStore {
    /// Open (or create) the store file and initialize the schema
    pub fn open(path: &str) -> Result<Self, StoreError> {
        let db_path = PathBuf::from(path);

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StoreError::Directory(e.to_string()))?;
            }
        }

        let conn = Connection::open(&db_path)?;
        let store = LocalStore { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let store = LocalStore {
            conn: Connection::open_in_memory()?,
        };
        store.initialize_schema()?;
        Ok(store)
    }

    fn initialize_schema(&self) -> Result<(), StoreError> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key     TEXT PRIMARY KEY,
                value   TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    fn get_item(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv WHERE key = ?1",
                rusqlite::params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            rusqlite::params![key, value],
        )?;
        Ok(())
    }

    fn try_get_tasks(&self) -> Result<Vec<Task>, StoreError> {
        match self.get_item(TASKS_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    fn try_save_tasks(&self, tasks: &[Task]) -> Result<(), StoreError> {
        let json = serde_json::to_string(tasks)?;
        self.set_item(TASKS_KEY, &json)
    }

    fn try_get_reports(&self) -> Result<Vec<DailyReport>, StoreError> {
        match self.get_item(REPORTS_KEY)? {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => Ok(Vec::new()),
        }
    }

    fn try_save_report(&self, report: &DailyReport) -> Result<(), StoreError> {
        let mut reports = self.try_get_reports()?;
        reports.retain(|r| r.date != report.date);
        reports.push(report.clone());
        let json = serde_json::to_string(&reports)?;
        self.set_item(REPORTS_KEY, &json)
    }

    /// Every stored task, or an empty list if the stored value is unreadable
    pub fn get_tasks(&self) -> Vec<Task> {
        self.try_get_tasks().unwrap_or_else(|e| {
            log::error!("event=local_load_tasks status=error error={}", e);
            Vec::new()
        })
    }

    pub fn save_tasks(&self, tasks: &[Task]) {
        if let Err(e) = self.try_save_tasks(tasks) {
            log::error!("event=local_save_tasks status=error error={}", e);
        }
    }

    pub fn get_reports(&self) -> Vec<DailyReport> {
        self.try_get_reports().unwrap_or_else(|e| {
            log::error!("event=local_load_reports status=error error={}", e);
            Vec::new()
        })
    }

    /// Store a report, replacing any report for the same date
    pub fn save_report(&self, report: &DailyReport) {
        if let Err(e) = self.try_save_report(report) {
            log::error!("event=local_save_report status=error date={} error={}", report.date, e);
        }
    }
}

impl DocumentStore for LocalStore {
    fn query_tasks_by_date(&self, date: &str) -> Result<Vec<Task>, StoreError> {
        let mut tasks = self.try_get_tasks()?;
        tasks.retain(|t| t.date == date);
        Ok(tasks)
    }

    fn get_task(&self, id: &str) -> Result<Option<Task>, StoreError> {
        Ok(self.try_get_tasks()?.into_iter().find(|t| t.id == id))
    }

    fn set_task(&self, task: &Task) -> Result<(), StoreError> {
        let mut tasks = self.try_get_tasks()?;
        match tasks.iter_mut().find(|t| t.id == task.id) {
            Some(existing) => *existing = task.clone(),
            None => tasks.push(task.clone()),
        }
        self.try_save_tasks(&tasks)
    }

    fn delete_task(&self, id: &str) -> Result<(), StoreError> {
        let mut tasks = self.try_get_tasks()?;
        tasks.retain(|t| t.id != id);
        self.try_save_tasks(&tasks)
    }

    fn get_report(&self, date: &str) -> Result<Option<DailyReport>, StoreError> {
        Ok(self.try_get_reports()?.into_iter().find(|r| r.date == date))
    }

    fn set_report(&self, report: &DailyReport) -> Result<(), StoreError> {
        self.try_save_report(report)
    }
}
