use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use worklog::board::{Board, BoardError, BoardNotice};
use worklog::models::{DailyReport, Task, TaskDraft, TaskStatus};
use worklog::store::{DocumentStore, LocalStore, StoreError};
use worklog::summary::{LanguageModel, SummaryError, SummaryGenerator};
use worklog::sync::SyncHandle;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
}

/// Shared in-memory documents; clones see the same data
#[derive(Clone, Default)]
struct MemoryStore {
    tasks: Arc<Mutex<HashMap<String, Task>>>,
    reports: Arc<Mutex<HashMap<String, DailyReport>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    fn write_guard(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(StoreError::Network("connection refused".to_string()))
        } else {
            Ok(())
        }
    }
}

impl DocumentStore for MemoryStore {
    fn query_tasks_by_date(&self, date: &str) -> Result<Vec<Task>, StoreError> {
        let mut tasks: Vec<Task> = self
            .tasks
            .lock()
            .unwrap()
            .values()
            .filter(|t| t.date == date)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.created_at);
        Ok(tasks)
    }

    fn get_task(&self, id: &str) -> Result<Option<Task>, StoreError> {
        Ok(self.tasks.lock().unwrap().get(id).cloned())
    }

    fn set_task(&self, task: &Task) -> Result<(), StoreError> {
        self.write_guard()?;
        self.tasks.lock().unwrap().insert(task.id.clone(), task.clone());
        Ok(())
    }

    fn delete_task(&self, id: &str) -> Result<(), StoreError> {
        self.write_guard()?;
        self.tasks.lock().unwrap().remove(id);
        Ok(())
    }

    fn get_report(&self, date: &str) -> Result<Option<DailyReport>, StoreError> {
        Ok(self.reports.lock().unwrap().get(date).cloned())
    }

    fn set_report(&self, report: &DailyReport) -> Result<(), StoreError> {
        self.write_guard()?;
        self.reports.lock().unwrap().insert(report.date.clone(), report.clone());
        Ok(())
    }
}

/// Counts calls and answers with a numbered report
#[derive(Clone, Default)]
struct CountingModel {
    calls: Arc<AtomicUsize>,
    fail: bool,
}

impl LanguageModel for CountingModel {
    fn generate(&self, _prompt: &str) -> Result<Option<String>, SummaryError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail {
            return Err(SummaryError::Api {
                status: 503,
                message: "overloaded".to_string(),
            });
        }
        Ok(Some(format!("## Report {}", n)))
    }
}

fn board_with(store: MemoryStore, model: CountingModel, date: NaiveDate) -> Board {
    let sync = SyncHandle::spawn(store, SummaryGenerator::new(Box::new(model))).unwrap();
    let mut board = Board::new(sync, date);
    board.settle();
    board
}

fn draft(title: &str) -> TaskDraft {
    TaskDraft::new(title)
}

#[test]
fn created_task_belongs_to_selected_day() {
    let store = MemoryStore::default();
    let mut board = board_with(store.clone(), CountingModel::default(), day(14));

    let task = board.save_task(draft("Write spec")).unwrap();
    board.settle();

    assert_eq!(task.date, "2024-06-14");
    assert_eq!(store.get_task(&task.id).unwrap().unwrap().date, "2024-06-14");
    assert_eq!(board.tasks_by_status()[0].len(), 1);
    assert_eq!(board.tasks_by_status()[0][0].title, "Write spec");
    assert_eq!(board.progress_percent(), 0);
}

#[test]
fn blank_title_is_rejected() {
    let mut board = board_with(MemoryStore::default(), CountingModel::default(), day(14));
    assert!(matches!(board.save_task(draft("   ")), Err(BoardError::EmptyTitle)));
    assert!(board.tasks().is_empty());
}

#[test]
fn editing_keeps_day_and_creation_time() {
    let store = MemoryStore::default();
    let mut board = board_with(store.clone(), CountingModel::default(), day(14));
    let task = board.save_task(draft("Draft")).unwrap();

    let mut edit = TaskDraft::from_task(&task);
    edit.title = "  Final  ".to_string();
    edit.status = TaskStatus::InProgress;
    let updated = board.save_task(edit).unwrap();
    board.settle();

    assert_eq!(updated.id, task.id);
    assert_eq!(updated.title, "Final");
    assert_eq!(updated.date, task.date);
    assert_eq!(updated.created_at, task.created_at);
    assert_eq!(board.tasks().len(), 1);
    assert_eq!(store.get_task(&task.id).unwrap().unwrap().status, TaskStatus::InProgress);
}

#[test]
fn status_change_moves_task_between_columns_and_is_idempotent() {
    let store = MemoryStore::default();
    let mut board = board_with(store.clone(), CountingModel::default(), day(14));
    let task = board.save_task(draft("Ship")).unwrap();

    assert!(board.change_status(&task.id, TaskStatus::Done));
    assert!(board.change_status(&task.id, TaskStatus::Done));
    board.settle();

    let [todo, in_progress, done] = board.tasks_by_status();
    assert!(todo.is_empty());
    assert!(in_progress.is_empty());
    assert_eq!(done.len(), 1);
    assert_eq!(store.get_task(&task.id).unwrap().unwrap().status, TaskStatus::Done);
    assert!(!board.change_status("missing", TaskStatus::Done));
}

#[test]
fn half_done_day_reports_fifty_percent() {
    let mut board = board_with(MemoryStore::default(), CountingModel::default(), day(14));
    let a = board.save_task(draft("A")).unwrap();
    board.save_task(draft("B")).unwrap();
    board.change_status(&a.id, TaskStatus::Done);

    let counts = board.counts();
    assert_eq!((counts.todo, counts.in_progress, counts.done), (1, 0, 1));
    assert_eq!(board.progress_percent(), 50);
}

#[test]
fn deleted_task_is_gone_after_reload() {
    let store = MemoryStore::default();
    let mut board = board_with(store.clone(), CountingModel::default(), day(14));
    let keep = board.save_task(draft("Keep")).unwrap();
    let gone = board.save_task(draft("Drop")).unwrap();

    assert!(board.request_delete(&gone.id));
    assert_eq!(board.pending_delete().map(|t| t.id.clone()), Some(gone.id.clone()));
    let removed = board.confirm_delete().unwrap();
    assert_eq!(removed.id, gone.id);
    assert!(board.pending_delete().is_none());

    board.load(day(14));
    board.settle();
    let ids: Vec<&str> = board.tasks().iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec![keep.id.as_str()]);
}

#[test]
fn cancelled_delete_keeps_task() {
    let mut board = board_with(MemoryStore::default(), CountingModel::default(), day(14));
    let task = board.save_task(draft("Stay")).unwrap();
    board.request_delete(&task.id);
    board.cancel_delete();
    assert!(board.confirm_delete().is_none());
    assert_eq!(board.tasks().len(), 1);
}

#[test]
fn switching_days_shows_only_that_days_tasks() {
    let mut board = board_with(MemoryStore::default(), CountingModel::default(), day(14));
    board.save_task(draft("Friday")).unwrap();

    board.next_day();
    board.settle();
    assert_eq!(board.day_key(), "2024-06-15");
    assert!(board.tasks().is_empty());

    board.previous_day();
    board.settle();
    assert_eq!(board.tasks().len(), 1);
}

#[test]
fn only_latest_load_is_applied() {
    let store = MemoryStore::default();
    let seeded = Task::new("Old day".to_string(), day(13));
    store.set_task(&seeded).unwrap();

    let mut board = board_with(store, CountingModel::default(), day(14));
    board.load(day(13));
    board.load(day(15));
    board.settle();

    assert_eq!(board.day_key(), "2024-06-15");
    assert!(board.tasks().is_empty());
    assert!(!board.is_loading());
}

#[test]
fn report_is_refused_while_the_next_day_loads() {
    let store = MemoryStore::default();
    let model = CountingModel::default();
    let mut board = board_with(store.clone(), model.clone(), day(14));
    board.save_task(draft("Yesterday work")).unwrap();

    board.next_day();
    assert!(board.is_loading());
    assert!(board.tasks().is_empty());
    assert!(matches!(board.generate_report(), Err(BoardError::Loading)));
    assert!(!board.is_generating_report());
    board.settle();

    assert!(store.get_report("2024-06-15").unwrap().is_none());
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    assert!(matches!(board.generate_report(), Err(BoardError::NoTasks)));
}

#[test]
fn previous_days_tasks_cannot_be_changed_while_loading() {
    let store = MemoryStore::default();
    let mut board = board_with(store.clone(), CountingModel::default(), day(14));
    let task = board.save_task(draft("Yesterday work")).unwrap();
    board.settle();

    board.next_day();
    assert!(!board.change_status(&task.id, TaskStatus::Done));
    assert!(!board.request_delete(&task.id));
    assert!(board.pending_delete().is_none());
    assert!(matches!(board.save_task(draft("Too early")), Err(BoardError::Loading)));
    board.settle();

    assert!(board.tasks().is_empty());
    let stored = store.get_task(&task.id).unwrap().unwrap();
    assert_eq!(stored.status, TaskStatus::Todo);
    assert_eq!(store.query_tasks_by_date("2024-06-15").unwrap().len(), 0);
}

#[test]
fn stored_report_is_dropped_when_leaving_the_day() {
    let store = MemoryStore::default();
    let mut board = board_with(store.clone(), CountingModel::default(), day(14));
    board.save_task(draft("Task")).unwrap();
    board.generate_report().unwrap();
    board.settle();
    assert!(board.report().is_some());

    board.next_day();
    assert!(board.report().is_none());
    board.settle();
    assert!(board.report().is_none());

    board.previous_day();
    board.settle();
    assert_eq!(board.report().map(|r| r.summary.as_str()), Some("## Report 1"));
}

#[test]
fn failed_write_keeps_optimistic_state() {
    let store = MemoryStore::default();
    store.fail_writes.store(true, Ordering::SeqCst);
    let mut board = board_with(store.clone(), CountingModel::default(), day(14));

    let task = board.save_task(draft("Offline")).unwrap();
    let notices = board.settle();

    assert!(notices.is_empty());
    assert_eq!(board.tasks().len(), 1);
    assert!(store.get_task(&task.id).unwrap().is_none());
}

#[test]
fn empty_day_never_calls_the_model() {
    let model = CountingModel::default();
    let mut board = board_with(MemoryStore::default(), model.clone(), day(14));

    assert!(matches!(board.generate_report(), Err(BoardError::NoTasks)));
    assert_eq!(
        BoardError::NoTasks.to_string(),
        "No tasks to report on for this day."
    );
    assert_eq!(model.calls.load(Ordering::SeqCst), 0);
    assert!(!board.is_generating_report());
}

#[test]
fn regenerating_overwrites_the_stored_report() {
    let store = MemoryStore::default();
    let model = CountingModel::default();
    let mut board = board_with(store.clone(), model.clone(), day(14));
    board.save_task(draft("Write spec")).unwrap();

    board.generate_report().unwrap();
    assert!(board.is_generating_report());
    assert!(matches!(board.generate_report(), Err(BoardError::ReportInProgress)));
    let notices = board.settle();
    assert!(matches!(notices.as_slice(), [BoardNotice::ReportReady(r)] if r.summary == "## Report 1"));

    board.generate_report().unwrap();
    board.settle();

    let stored = store.get_report("2024-06-14").unwrap().unwrap();
    assert_eq!(stored.summary, "## Report 2");
    assert_eq!(board.report().map(|r| r.summary.as_str()), Some("## Report 2"));
    assert_eq!(store.reports.lock().unwrap().len(), 1);
    assert_eq!(model.calls.load(Ordering::SeqCst), 2);
}

#[test]
fn report_for_a_day_left_behind_is_not_shown() {
    let mut board = board_with(MemoryStore::default(), CountingModel::default(), day(14));
    board.save_task(draft("Task")).unwrap();
    board.generate_report().unwrap();
    board.next_day();

    let notices = board.settle();
    assert!(notices.is_empty());
    assert!(board.report().is_none());
    assert!(!board.is_generating_report());
}

#[test]
fn model_failure_surfaces_a_notice() {
    let model = CountingModel {
        fail: true,
        ..CountingModel::default()
    };
    let store = MemoryStore::default();
    let mut board = board_with(store.clone(), model, day(14));
    board.save_task(draft("Task")).unwrap();
    board.generate_report().unwrap();

    let notices = board.settle();
    assert!(matches!(notices.as_slice(), [BoardNotice::ReportFailed(msg)] if msg.contains("503")));
    assert!(board.report().is_none());
    assert!(store.get_report("2024-06-14").unwrap().is_none());
}

#[test]
fn local_store_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("worklog.db");
    let path = path.to_str().unwrap();

    let task_id = {
        let store = LocalStore::open(path).unwrap();
        let sync = SyncHandle::spawn(store, SummaryGenerator::new(Box::new(CountingModel::default()))).unwrap();
        let mut board = Board::new(sync, day(14));
        board.settle();
        let task = board.save_task(draft("Persist me")).unwrap();
        board.shutdown();
        task.id
    };

    let store = LocalStore::open(path).unwrap();
    let tasks = store.query_tasks_by_date("2024-06-14").unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, task_id);
}
