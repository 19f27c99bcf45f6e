use clap::{Parser, Subcommand};
use std::io::{self, BufRead, Write};
use thiserror::Error;

use crate::models::{format_day, now_millis, DailyReport, LinkAttachment, ParseStatusError, Task, TaskStatus};
use crate::store::{DocumentStore, StoreError};
use crate::summary::{SummaryError, SummaryGenerator};
use crate::utils::{parse_date, today};

#[derive(Parser)]
#[command(name = "worklog")]
#[command(about = "Daily kanban board with end-of-day reports")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (uses separate dev config/data)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive board (default if no subcommand)
    Tui,
    /// Add a task to a day
    Add {
        /// Task title
        title: String,
        /// Day (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Initial status: todo, in-progress or done
        #[arg(long, default_value = "todo")]
        status: String,
        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
        /// Attach a link, as URL or URL|LABEL (repeatable)
        #[arg(long = "link")]
        links: Vec<String>,
    },
    /// List a day's tasks grouped by status
    List {
        /// Day (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },
    /// Move a task to another status
    Status {
        /// Task id
        id: String,
        /// todo, in-progress or done
        status: String,
    },
    /// Delete a task
    Delete {
        /// Task id
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Print a day's report, generating it if none is stored
    Report {
        /// Day (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
        /// Generate a new report even if one is stored
        #[arg(long)]
        regenerate: bool,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Store error: {0}")]
    StoreError(#[from] StoreError),
    #[error("Report generation failed: {0}")]
    SummaryError(#[from] SummaryError),
    #[error("Failed to parse date: {0}")]
    DateParseError(String),
    #[error("Invalid status: {0}")]
    StatusError(#[from] ParseStatusError),
    #[error("Task title cannot be empty")]
    EmptyTitle,
    #[error("Task not found: {0}")]
    TaskNotFound(String),
    #[error("No tasks to report on for {0}")]
    NoTasks(String),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

fn resolve_date(date: Option<&str>) -> Result<chrono::NaiveDate, CliError> {
    match date {
        Some(date_str) => parse_date(date_str)
            .map_err(|e| CliError::DateParseError(format!("Invalid date format '{}': {}", date_str, e))),
        None => Ok(today()),
    }
}

/// `URL` or `URL|LABEL`
pub fn parse_link_arg(arg: &str) -> LinkAttachment {
    match arg.split_once('|') {
        Some((url, label)) => LinkAttachment::new(url.trim(), Some(label)),
        None => LinkAttachment::new(arg.trim(), None),
    }
}

/// Handle the add command
pub fn handle_add<S: DocumentStore + ?Sized>(
    title: &str,
    date: Option<&str>,
    status: &str,
    notes: Option<String>,
    links: &[String],
    store: &S,
) -> Result<Task, CliError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(CliError::EmptyTitle);
    }
    let day = resolve_date(date)?;

    let mut task = Task::new(title.to_string(), day);
    task.status = status.parse::<TaskStatus>()?;
    task.notes = notes.unwrap_or_default();
    task.links = links.iter().map(|l| parse_link_arg(l)).collect();

    store.set_task(&task)?;
    println!("Task created for {} (ID: {})", task.date, task.id);
    Ok(task)
}

/// Handle the list command
pub fn handle_list<S: DocumentStore + ?Sized>(date: Option<&str>, store: &S) -> Result<Vec<Task>, CliError> {
    let day = format_day(resolve_date(date)?);
    let tasks = store.query_tasks_by_date(&day)?;

    let done = tasks.iter().filter(|t| t.status == TaskStatus::Done).count();
    println!(
        "{}: {} task(s), {}% complete",
        day,
        tasks.len(),
        crate::board::progress_percent(done, tasks.len())
    );
    for status in TaskStatus::ALL {
        let column: Vec<&Task> = tasks.iter().filter(|t| t.status == status).collect();
        println!("\n{} ({})", status.label(), column.len());
        for task in column {
            println!("  {}  {}", task.id, task.title);
            if !task.notes.is_empty() {
                println!("      {}", task.notes.lines().next().unwrap_or_default());
            }
            if !task.links.is_empty() {
                println!("      links: {}", task.link_labels());
            }
        }
    }
    Ok(tasks)
}

/// Handle the status command
pub fn handle_status<S: DocumentStore + ?Sized>(id: &str, status: &str, store: &S) -> Result<Task, CliError> {
    let status = status.parse::<TaskStatus>()?;
    let mut task = store
        .get_task(id)?
        .ok_or_else(|| CliError::TaskNotFound(id.to_string()))?;

    task.status = status;
    store.set_task(&task)?;
    println!("'{}' moved to {}", task.title, status.label());
    Ok(task)
}

/// Handle the delete command. Without `yes`, asks on `input` first.
pub fn handle_delete<S: DocumentStore + ?Sized, R: BufRead>(
    id: &str,
    yes: bool,
    input: &mut R,
    store: &S,
) -> Result<bool, CliError> {
    let task = store
        .get_task(id)?
        .ok_or_else(|| CliError::TaskNotFound(id.to_string()))?;

    if !yes {
        print!("Delete '{}'? [y/N] ", task.title);
        io::stdout().flush()?;
        let mut answer = String::new();
        input.read_line(&mut answer)?;
        if !matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes") {
            println!("Cancelled");
            return Ok(false);
        }
    }

    store.delete_task(id)?;
    println!("Task deleted (ID: {})", id);
    Ok(true)
}

/// Handle the report command
pub fn handle_report<S: DocumentStore + ?Sized>(
    date: Option<&str>,
    regenerate: bool,
    store: &S,
    generator: &SummaryGenerator,
) -> Result<DailyReport, CliError> {
    let day = format_day(resolve_date(date)?);

    if !regenerate {
        if let Some(report) = store.get_report(&day)? {
            println!("{}", report.summary);
            return Ok(report);
        }
    }

    let tasks = store.query_tasks_by_date(&day)?;
    if tasks.is_empty() {
        return Err(CliError::NoTasks(day));
    }

    let report = DailyReport {
        summary: generator.generate_daily_summary(&day, &tasks)?,
        date: day,
        generated_at: now_millis(),
    };
    store.set_report(&report)?;
    println!("{}", report.summary);
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LocalStore;
    use crate::summary::LanguageModel;

    struct Canned;

    impl LanguageModel for Canned {
        fn generate(&self, _prompt: &str) -> Result<Option<String>, SummaryError> {
            Ok(Some("## Report".to_string()))
        }
    }

    #[test]
    fn link_args_split_on_pipe() {
        let link = parse_link_arg("https://x.dev/pr/1|PR #1");
        assert_eq!(link.url, "https://x.dev/pr/1");
        assert_eq!(link.label, "PR #1");

        let bare = parse_link_arg("https://x.dev");
        assert_eq!(bare.label, "https://x.dev");
    }

    #[test]
    fn add_then_list_then_status() {
        let store = LocalStore::open_in_memory().unwrap();
        let task = handle_add(
            "  Write docs ",
            Some("2024-03-01"),
            "todo",
            Some("draft".to_string()),
            &["https://docs|Docs".to_string()],
            &store,
        )
        .unwrap();
        assert_eq!(task.title, "Write docs");
        assert_eq!(task.date, "2024-03-01");
        assert_eq!(task.links[0].label, "Docs");

        let listed = handle_list(Some("2024-03-01"), &store).unwrap();
        assert_eq!(listed, vec![task.clone()]);

        let moved = handle_status(&task.id, "done", &store).unwrap();
        assert_eq!(moved.status, TaskStatus::Done);
        assert_eq!(store.get_task(&task.id).unwrap().unwrap().status, TaskStatus::Done);
    }

    #[test]
    fn add_rejects_blank_title_and_bad_input() {
        let store = LocalStore::open_in_memory().unwrap();
        assert!(matches!(handle_add("   ", None, "todo", None, &[], &store), Err(CliError::EmptyTitle)));
        assert!(matches!(
            handle_add("x", Some("03/01/2024"), "todo", None, &[], &store),
            Err(CliError::DateParseError(_))
        ));
        assert!(matches!(
            handle_add("x", None, "blocked", None, &[], &store),
            Err(CliError::StatusError(_))
        ));
    }

    #[test]
    fn delete_asks_unless_confirmed() {
        let store = LocalStore::open_in_memory().unwrap();
        let task = handle_add("Temp", Some("2024-03-01"), "todo", None, &[], &store).unwrap();

        let mut no = io::Cursor::new(b"n\n".to_vec());
        assert!(!handle_delete(&task.id, false, &mut no, &store).unwrap());
        assert!(store.get_task(&task.id).unwrap().is_some());

        let mut yes = io::Cursor::new(b"y\n".to_vec());
        assert!(handle_delete(&task.id, false, &mut yes, &store).unwrap());
        assert!(store.get_task(&task.id).unwrap().is_none());

        let mut empty = io::Cursor::new(Vec::new());
        assert!(matches!(
            handle_delete(&task.id, true, &mut empty, &store),
            Err(CliError::TaskNotFound(_))
        ));
    }

    #[test]
    fn report_reuses_stored_unless_regenerating() {
        let store = LocalStore::open_in_memory().unwrap();
        let generator = SummaryGenerator::new(Box::new(Canned));

        assert!(matches!(
            handle_report(Some("2024-03-01"), false, &store, &generator),
            Err(CliError::NoTasks(_))
        ));

        handle_add("Ship", Some("2024-03-01"), "done", None, &[], &store).unwrap();
        store
            .set_report(&DailyReport {
                date: "2024-03-01".to_string(),
                summary: "old".to_string(),
                generated_at: 1,
            })
            .unwrap();

        let stored = handle_report(Some("2024-03-01"), false, &store, &generator).unwrap();
        assert_eq!(stored.summary, "old");

        let fresh = handle_report(Some("2024-03-01"), true, &store, &generator).unwrap();
        assert_eq!(fresh.summary, "## Report");
        assert_eq!(store.get_report("2024-03-01").unwrap().unwrap().summary, "## Report");
    }
}
