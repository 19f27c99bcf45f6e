//! Board state for one selected day.
//!
//! Every mutation is applied to the in-memory task list first and then
//! queued as a remote write on the sync worker. Remote failures are logged
//! and never rolled back, so local and remote state can disagree until the
//! day is loaded again.

use chrono::{Days, NaiveDate};
use thiserror::Error;

use crate::models::{format_day, now_millis, DailyReport, Task, TaskDraft, TaskStatus};
use crate::sync::{SyncEvent, SyncHandle, SyncRequest};

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Task title cannot be empty")]
    EmptyTitle,
    #[error("Task not found: {0}")]
    TaskNotFound(String),
    #[error("No tasks to report on for this day.")]
    NoTasks,
    #[error("A report is already being generated")]
    ReportInProgress,
    #[error("Tasks for this day are still loading")]
    Loading,
    #[error("Sync worker is not running")]
    WorkerStopped,
}

/// Outcomes the presentation layer should react to
#[derive(Debug)]
pub enum BoardNotice {
    ReportReady(DailyReport),
    ReportFailed(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub todo: usize,
    pub in_progress: usize,
    pub done: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.todo + self.in_progress + self.done
    }

    pub fn get(&self, status: TaskStatus) -> usize {
        match status {
            TaskStatus::Todo => self.todo,
            TaskStatus::InProgress => self.in_progress,
            TaskStatus::Done => self.done,
        }
    }
}

pub struct Board {
    sync: SyncHandle,
    current_date: NaiveDate,
    tasks: Vec<Task>,
    report: Option<DailyReport>,
    loading: bool,
    generating_report: bool,
    pending_delete: Option<String>,
    load_generation: u64,
}

impl Board {
    /// Create the board and start loading `date`
    pub fn new(sync: SyncHandle, date: NaiveDate) -> Self {
        let mut board = Self {
            sync,
            current_date: date,
            tasks: Vec::new(),
            report: None,
            loading: false,
            generating_report: false,
            pending_delete: None,
            load_generation: 0,
        };
        board.load(date);
        board
    }

    pub fn current_date(&self) -> NaiveDate {
        self.current_date
    }

    /// ISO key of the selected day
    pub fn day_key(&self) -> String {
        format_day(self.current_date)
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn report(&self) -> Option<&DailyReport> {
        self.report.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_generating_report(&self) -> bool {
        self.generating_report
    }

    pub fn pending_delete(&self) -> Option<&Task> {
        self.pending_delete.as_deref().and_then(|id| self.task(id))
    }

    /// Select `date` and request its tasks and report.
    ///
    /// The previous day's tasks and report are dropped immediately. State is
    /// replaced wholesale when the response arrives; responses to earlier
    /// loads are discarded.
    pub fn load(&mut self, date: NaiveDate) {
        self.current_date = date;
        self.load_generation += 1;
        self.loading = true;
        self.tasks.clear();
        self.report = None;
        self.pending_delete = None;
        log::info!("event=board_load date={} generation={}", format_day(date), self.load_generation);

        let request = SyncRequest::Load {
            generation: self.load_generation,
            date: format_day(date),
        };
        if !self.sync.send(request) {
            log::error!("event=board_load status=error reason=worker_stopped");
            self.loading = false;
        }
    }

    pub fn previous_day(&mut self) {
        let date = self
            .current_date
            .checked_sub_days(Days::new(1))
            .unwrap_or(self.current_date);
        self.load(date);
    }

    pub fn next_day(&mut self) {
        let date = self
            .current_date
            .checked_add_days(Days::new(1))
            .unwrap_or(self.current_date);
        self.load(date);
    }

    pub fn today(&mut self) {
        self.load(crate::utils::today());
    }

    /// Create a task on the selected day, or update an existing one.
    ///
    /// Updates keep the task's original day and creation time. Refused while
    /// the day is loading.
    pub fn save_task(&mut self, draft: TaskDraft) -> Result<Task, BoardError> {
        if self.loading {
            return Err(BoardError::Loading);
        }
        let title = draft.title.trim().to_string();
        if title.is_empty() {
            return Err(BoardError::EmptyTitle);
        }

        let task = match draft.id {
            Some(id) => {
                let existing = self
                    .tasks
                    .iter_mut()
                    .find(|t| t.id == id)
                    .ok_or(BoardError::TaskNotFound(id))?;
                existing.title = title;
                existing.status = draft.status;
                existing.notes = draft.notes;
                existing.links = draft.links;
                existing.clone()
            }
            None => {
                let task = Task {
                    id: crate::models::new_id(),
                    title,
                    status: draft.status,
                    notes: draft.notes,
                    links: draft.links,
                    date: self.day_key(),
                    created_at: now_millis(),
                };
                self.tasks.push(task.clone());
                task
            }
        };

        self.push_write(SyncRequest::SaveTask(task.clone()));
        Ok(task)
    }

    /// Move a task to `status`. Unknown ids are ignored.
    pub fn change_status(&mut self, id: &str, status: TaskStatus) -> bool {
        let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) else {
            return false;
        };
        task.status = status;
        let updated = task.clone();
        self.push_write(SyncRequest::SaveTask(updated));
        true
    }

    /// Mark a task for deletion; nothing is removed until confirmed
    pub fn request_delete(&mut self, id: &str) -> bool {
        if self.task(id).is_some() {
            self.pending_delete = Some(id.to_string());
            true
        } else {
            false
        }
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Remove the task marked by `request_delete`
    pub fn confirm_delete(&mut self) -> Option<Task> {
        let id = self.pending_delete.take()?;
        let index = self.tasks.iter().position(|t| t.id == id)?;
        let removed = self.tasks.remove(index);
        self.push_write(SyncRequest::DeleteTask(id));
        Some(removed)
    }

    /// Ask the model for a report on the selected day's tasks.
    ///
    /// The result arrives later as a [`BoardNotice`] from `poll`/`settle`.
    pub fn generate_report(&mut self) -> Result<(), BoardError> {
        if self.loading {
            return Err(BoardError::Loading);
        }
        if self.tasks.is_empty() {
            return Err(BoardError::NoTasks);
        }
        if self.generating_report {
            return Err(BoardError::ReportInProgress);
        }

        let request = SyncRequest::GenerateReport {
            date: self.day_key(),
            tasks: self.tasks.clone(),
        };
        if !self.sync.send(request) {
            return Err(BoardError::WorkerStopped);
        }
        self.generating_report = true;
        log::info!("event=report_generate status=started date={}", self.day_key());
        Ok(())
    }

    /// Tasks split into To Do, In Progress and Completed, in list order
    pub fn tasks_by_status(&self) -> [Vec<&Task>; 3] {
        let mut grouped: [Vec<&Task>; 3] = [Vec::new(), Vec::new(), Vec::new()];
        for task in &self.tasks {
            grouped[task.status.column_index()].push(task);
        }
        grouped
    }

    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for task in &self.tasks {
            match task.status {
                TaskStatus::Todo => counts.todo += 1,
                TaskStatus::InProgress => counts.in_progress += 1,
                TaskStatus::Done => counts.done += 1,
            }
        }
        counts
    }

    /// Share of completed tasks, rounded to a whole percent
    pub fn progress_percent(&self) -> u8 {
        progress_percent(self.counts().done, self.tasks.len())
    }

    /// Apply every completed request without blocking
    pub fn poll(&mut self) -> Vec<BoardNotice> {
        let mut notices = Vec::new();
        while let Some(event) = self.sync.try_recv() {
            self.apply(event, &mut notices);
        }
        notices
    }

    /// Block until all outstanding requests have completed
    pub fn settle(&mut self) -> Vec<BoardNotice> {
        let mut notices = Vec::new();
        while self.sync.in_flight() > 0 {
            match self.sync.recv() {
                Some(event) => self.apply(event, &mut notices),
                None => break,
            }
        }
        notices
    }

    /// Flush queued writes and stop the worker
    pub fn shutdown(&mut self) {
        self.sync.shutdown();
        self.poll();
    }

    fn push_write(&mut self, request: SyncRequest) {
        if !self.sync.send(request) {
            log::error!("event=remote_write status=error reason=worker_stopped");
        }
    }

    fn apply(&mut self, event: SyncEvent, notices: &mut Vec<BoardNotice>) {
        match event {
            SyncEvent::Loaded { generation, date, tasks, report } => {
                if generation != self.load_generation {
                    log::debug!("event=board_load status=stale date={} generation={}", date, generation);
                    return;
                }
                self.loading = false;
                match tasks {
                    Ok(tasks) => {
                        log::info!("event=board_load status=ok date={} tasks={}", date, tasks.len());
                        self.tasks = tasks;
                    }
                    Err(e) => {
                        log::error!("event=board_load status=error date={} error={}", date, e);
                        self.tasks.clear();
                    }
                }
                match report {
                    Ok(report) => self.report = report,
                    Err(e) => {
                        log::error!("event=report_load status=error date={} error={}", date, e);
                        self.report = None;
                    }
                }
            }
            SyncEvent::TaskSaved { id, result } => {
                if let Err(e) = result {
                    log::error!("event=task_save status=error id={} error={}", id, e);
                }
            }
            SyncEvent::TaskDeleted { id, result } => {
                if let Err(e) = result {
                    log::error!("event=task_delete status=error id={} error={}", id, e);
                }
            }
            SyncEvent::ReportGenerated { date, result } => {
                self.generating_report = false;
                match result {
                    Ok(report) => {
                        log::info!("event=report_generate status=ok date={}", date);
                        if report.date == self.day_key() {
                            self.report = Some(report.clone());
                            notices.push(BoardNotice::ReportReady(report));
                        }
                    }
                    Err(e) => {
                        log::error!("event=report_generate status=error date={} error={}", date, e);
                        notices.push(BoardNotice::ReportFailed(e.to_string()));
                    }
                }
            }
        }
    }
}

/// `round(done / total * 100)`, zero for an empty day
pub fn progress_percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    ((done as f64 / total as f64) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_rounds_to_nearest_percent() {
        assert_eq!(progress_percent(0, 0), 0);
        assert_eq!(progress_percent(1, 2), 50);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
        assert_eq!(progress_percent(1, 8), 13);
        assert_eq!(progress_percent(4, 4), 100);
    }

    #[test]
    fn counts_total_adds_columns() {
        let counts = StatusCounts { todo: 2, in_progress: 1, done: 3 };
        assert_eq!(counts.total(), 6);
        assert_eq!(counts.get(TaskStatus::InProgress), 1);
    }
}
