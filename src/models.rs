use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Workflow state of a task. Any state can move to any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "TODO")]
    Todo,
    #[serde(rename = "IN_PROGRESS")]
    InProgress,
    #[serde(rename = "DONE")]
    Done,
}

impl TaskStatus {
    /// Column order used by the board
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    /// Human-facing label, also used as the column heading
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Completed",
        }
    }

    /// Stored form, as written to documents and shown in the report prompt
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
        }
    }

    pub fn next(self) -> Self {
        match self {
            TaskStatus::Todo => TaskStatus::InProgress,
            TaskStatus::InProgress => TaskStatus::Done,
            TaskStatus::Done => TaskStatus::Todo,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            TaskStatus::Todo => TaskStatus::Done,
            TaskStatus::InProgress => TaskStatus::Todo,
            TaskStatus::Done => TaskStatus::InProgress,
        }
    }

    pub fn column_index(self) -> usize {
        match self {
            TaskStatus::Todo => 0,
            TaskStatus::InProgress => 1,
            TaskStatus::Done => 2,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown status '{0}' (expected todo, in-progress or done)")]
pub struct ParseStatusError(pub String);

impl FromStr for TaskStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "todo" | "to-do" => Ok(TaskStatus::Todo),
            "in-progress" | "inprogress" | "doing" => Ok(TaskStatus::InProgress),
            "done" | "completed" => Ok(TaskStatus::Done),
            _ => Err(ParseStatusError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkAttachment {
    pub id: String,
    pub url: String,
    pub label: String,
}

impl LinkAttachment {
    /// Create a link. A blank label falls back to the URL.
    pub fn new(url: impl Into<String>, label: Option<&str>) -> Self {
        let url = url.into();
        let label = match label.map(str::trim) {
            Some(l) if !l.is_empty() => l.to_string(),
            _ => url.clone(),
        };
        Self {
            id: new_id(),
            url,
            label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub links: Vec<LinkAttachment>,
    pub date: String, // YYYY-MM-DD
    pub created_at: i64, // epoch millis
}

impl Task {
    pub fn new(title: String, date: NaiveDate) -> Self {
        Self {
            id: new_id(),
            title,
            status: TaskStatus::Todo,
            notes: String::new(),
            links: Vec::new(),
            date: format_day(date),
            created_at: now_millis(),
        }
    }

    /// Labels of all attachments joined for display
    pub fn link_labels(&self) -> String {
        self.links
            .iter()
            .map(|l| l.label.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// The editable part of a task, as produced by the task form or the CLI.
/// `id` is set when editing an existing task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    pub id: Option<String>,
    pub title: String,
    pub status: TaskStatus,
    pub notes: String,
    pub links: Vec<LinkAttachment>,
}

impl TaskDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: None,
            title: title.into(),
            status: TaskStatus::Todo,
            notes: String::new(),
            links: Vec::new(),
        }
    }

    pub fn from_task(task: &Task) -> Self {
        Self {
            id: Some(task.id.clone()),
            title: task.title.clone(),
            status: task.status,
            notes: task.notes.clone(),
            links: task.links.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyReport {
    pub date: String,
    pub summary: String,
    pub generated_at: i64,
}

impl DailyReport {
    pub fn new(date: NaiveDate, summary: String) -> Self {
        Self {
            date: format_day(date),
            summary,
            generated_at: now_millis(),
        }
    }
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// ISO day key used for `Task::date` and report document ids
pub fn format_day(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_to_document_form() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");
        let parsed: TaskStatus = serde_json::from_str("\"DONE\"").unwrap();
        assert_eq!(parsed, TaskStatus::Done);
    }

    #[test]
    fn status_parses_cli_spellings() {
        assert_eq!("todo".parse::<TaskStatus>().unwrap(), TaskStatus::Todo);
        assert_eq!("In Progress".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("IN_PROGRESS".parse::<TaskStatus>().unwrap(), TaskStatus::InProgress);
        assert_eq!("completed".parse::<TaskStatus>().unwrap(), TaskStatus::Done);
        let err = "later".parse::<TaskStatus>().unwrap_err();
        assert_eq!(err.to_string(), "unknown status 'later' (expected todo, in-progress or done)");
    }

    #[test]
    fn status_cycle_visits_every_column() {
        let mut s = TaskStatus::Todo;
        for _ in 0..3 {
            s = s.next();
        }
        assert_eq!(s, TaskStatus::Todo);
        assert_eq!(TaskStatus::Todo.previous(), TaskStatus::Done);
    }

    #[test]
    fn link_label_defaults_to_url() {
        let link = LinkAttachment::new("https://example.com", None);
        assert_eq!(link.label, "https://example.com");
        let blank = LinkAttachment::new("https://example.com", Some("   "));
        assert_eq!(blank.label, "https://example.com");
        let named = LinkAttachment::new("https://example.com", Some("Docs"));
        assert_eq!(named.label, "Docs");
    }

    #[test]
    fn task_uses_camel_case_fields() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let task = Task::new("Write spec".to_string(), day);
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value["date"], "2024-03-09");
        assert_eq!(value["status"], "TODO");
        assert!(value.get("createdAt").is_some());
        assert!(value.get("created_at").is_none());
    }

    #[test]
    fn task_without_notes_or_links_deserializes() {
        let json = r#"{"id":"a","title":"t","status":"TODO","date":"2024-01-01","createdAt":1}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(task.notes.is_empty());
        assert!(task.links.is_empty());
    }
}
