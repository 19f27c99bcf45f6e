//! End-of-day report generation.
//!
//! The generator turns a day's tasks into a prompt and hands it to a
//! [`LanguageModel`]. An empty day never reaches the model.

pub mod gemini;

use serde::Serialize;
use thiserror::Error;

use crate::models::Task;

pub use gemini::{GeminiConfig, GeminiModel};

pub const NO_TASKS_SUMMARY: &str = "No tasks recorded for this day.";
pub const EMPTY_RESPONSE_SUMMARY: &str = "Could not generate summary.";
const NO_NOTES: &str = "No notes";
const NO_LINKS: &str = "No links";

#[derive(Debug, Error)]
pub enum SummaryError {
    #[error("API key not found (set the {0} environment variable)")]
    MissingApiKey(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Model API returned HTTP {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Unexpected model response: {0}")]
    Decode(String),
    #[error("Failed to build prompt: {0}")]
    Prompt(#[from] serde_json::Error),
}

/// A hosted text model: one prompt in, free text (markdown) out.
pub trait LanguageModel: Send {
    /// Returns `Ok(None)` when the model answered without any text
    fn generate(&self, prompt: &str) -> Result<Option<String>, SummaryError>;
}

#[derive(Serialize)]
struct PromptTask<'a> {
    title: &'a str,
    status: &'static str,
    notes: &'a str,
    links: String,
}

/// Build the report prompt for `date` from its tasks
pub fn build_prompt(date: &str, tasks: &[Task]) -> Result<String, SummaryError> {
    let rows: Vec<PromptTask> = tasks
        .iter()
        .map(|t| {
            let labels = t.link_labels();
            PromptTask {
                title: &t.title,
                status: t.status.as_str(),
                notes: if t.notes.is_empty() { NO_NOTES } else { &t.notes },
                links: if labels.is_empty() { NO_LINKS.to_string() } else { labels },
            }
        })
        .collect();
    let tasks_json = serde_json::to_string_pretty(&rows)?;

    Ok(format!(
        "You are a professional Project Manager assistant.\n\
         Generate a concise but professional end-of-day report for {date} based on the following tasks.\n\
         \n\
         Tasks:\n\
         {tasks_json}\n\
         \n\
         Structure the report with these sections using Markdown:\n\
         1. 🏆 Achievements (Completed tasks)\n\
         2. 🚧 In Progress (Tasks started but not finished)\n\
         3. 📝 Pending (To-do items)\n\
         4. 💡 Summary & Next Steps (A brief synthesis of the day's effort and suggested focus for tomorrow).\n\
         \n\
         Keep it professional, encouraging, and clear.\n"
    ))
}

pub struct SummaryGenerator {
    model: Box<dyn LanguageModel>,
}

impl SummaryGenerator {
    pub fn new(model: Box<dyn LanguageModel>) -> Self {
        Self { model }
    }

    /// Produce the markdown report for a day.
    ///
    /// An empty task list returns [`NO_TASKS_SUMMARY`] without calling the
    /// model. Model failures, including a missing credential, are returned
    /// to the caller unchanged.
    pub fn generate_daily_summary(&self, date: &str, tasks: &[Task]) -> Result<String, SummaryError> {
        if tasks.is_empty() {
            return Ok(NO_TASKS_SUMMARY.to_string());
        }

        let prompt = build_prompt(date, tasks)?;
        log::debug!("event=summary_request date={} tasks={}", date, tasks.len());

        match self.model.generate(&prompt) {
            Ok(Some(text)) if !text.trim().is_empty() => Ok(text),
            Ok(_) => Ok(EMPTY_RESPONSE_SUMMARY.to_string()),
            Err(e) => {
                log::error!("event=summary_request status=error date={} error={}", date, e);
                Err(e)
            }
        }
    }
}
