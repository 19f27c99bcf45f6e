use chrono::NaiveDate;
use std::time::{Duration, Instant};

use crate::board::{Board, BoardError, BoardNotice};
use crate::config::{Config, KeyBindings};
use crate::models::{DailyReport, LinkAttachment, Task, TaskDraft, TaskStatus};
use crate::tui::error::TuiError;
use crate::tui::theme::Palette;
use crate::tui::widgets::editor::Editor;
use crate::utils::{parse_key_binding, ParsedKeyBinding};

const STATUS_MESSAGE_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    View,
    TaskForm,
    Report,
    Alert,
    ConfirmDelete,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Title,
    Status,
    Notes,
    Links,
}

impl TaskField {
    const ORDER: [TaskField; 4] = [TaskField::Title, TaskField::Status, TaskField::Notes, TaskField::Links];

    fn step(self, forward: bool) -> Self {
        let index = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        let len = Self::ORDER.len();
        let next = if forward { (index + 1) % len } else { (index + len - 1) % len };
        Self::ORDER[next]
    }
}

/// The inline "add link" sub-form
#[derive(Debug, Clone)]
pub struct LinkInput {
    pub label: Editor,
    pub url: Editor,
    pub on_url: bool,
}

impl LinkInput {
    fn new() -> Self {
        Self {
            label: Editor::new(),
            url: Editor::new(),
            on_url: false,
        }
    }

    pub fn active_editor(&mut self) -> &mut Editor {
        if self.on_url { &mut self.url } else { &mut self.label }
    }
}

#[derive(Debug, Clone)]
pub struct TaskForm {
    pub current_field: TaskField,
    pub title: Editor,
    pub status: TaskStatus,
    pub notes: Editor,
    pub links: Vec<LinkAttachment>,
    pub link_selected: usize,
    pub link_input: Option<LinkInput>,
    pub editing_task_id: Option<String>, // None for new tasks
}

impl TaskForm {
    pub fn new(status: TaskStatus) -> Self {
        Self {
            current_field: TaskField::Title,
            title: Editor::new(),
            status,
            notes: Editor::multiline(),
            links: Vec::new(),
            link_selected: 0,
            link_input: None,
            editing_task_id: None,
        }
    }

    pub fn from_task(task: &Task) -> Self {
        Self {
            current_field: TaskField::Title,
            title: Editor::new().with_content(&task.title),
            status: task.status,
            notes: Editor::multiline().with_content(&task.notes),
            links: task.links.clone(),
            link_selected: 0,
            link_input: None,
            editing_task_id: Some(task.id.clone()),
        }
    }

    pub fn navigate(&mut self, forward: bool) {
        self.current_field = self.current_field.step(forward);
    }

    /// Editor for the focused text field, if any
    pub fn active_editor(&mut self) -> Option<&mut Editor> {
        if let Some(input) = self.link_input.as_mut() {
            return Some(input.active_editor());
        }
        match self.current_field {
            TaskField::Title => Some(&mut self.title),
            TaskField::Notes => Some(&mut self.notes),
            TaskField::Status | TaskField::Links => None,
        }
    }

    pub fn open_link_input(&mut self) {
        self.link_input = Some(LinkInput::new());
    }

    /// Attach the link being typed. A blank URL is ignored.
    pub fn commit_link_input(&mut self) -> bool {
        let Some(input) = self.link_input.as_ref() else {
            return false;
        };
        let url = input.url.text().trim().to_string();
        if url.is_empty() {
            return false;
        }
        let label = input.label.text();
        self.links.push(LinkAttachment::new(url, Some(label.as_str())));
        self.link_selected = self.links.len() - 1;
        self.link_input = None;
        true
    }

    pub fn remove_selected_link(&mut self) {
        if self.link_selected < self.links.len() {
            self.links.remove(self.link_selected);
            self.link_selected = self.link_selected.min(self.links.len().saturating_sub(1));
        }
    }

    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            id: self.editing_task_id.clone(),
            title: self.title.text(),
            status: self.status,
            notes: self.notes.text(),
            links: self.links.clone(),
        }
    }
}

/// Key bindings from config, parsed once at startup
#[derive(Debug, Clone)]
pub struct Keymap {
    pub quit: ParsedKeyBinding,
    pub new: ParsedKeyBinding,
    pub edit: ParsedKeyBinding,
    pub save: ParsedKeyBinding,
    pub delete: ParsedKeyBinding,
    pub list_up: ParsedKeyBinding,
    pub list_down: ParsedKeyBinding,
    pub column_left: ParsedKeyBinding,
    pub column_right: ParsedKeyBinding,
    pub advance_status: ParsedKeyBinding,
    pub retreat_status: ParsedKeyBinding,
    pub previous_day: ParsedKeyBinding,
    pub next_day: ParsedKeyBinding,
    pub today: ParsedKeyBinding,
    pub generate_report: ParsedKeyBinding,
    pub view_report: ParsedKeyBinding,
    pub help: ParsedKeyBinding,
}

impl Keymap {
    pub fn from_config(bindings: &KeyBindings) -> Result<Self, TuiError> {
        let parse = |s: &str| parse_key_binding(s).map_err(TuiError::KeyBindingError);
        Ok(Self {
            quit: parse(&bindings.quit)?,
            new: parse(&bindings.new)?,
            edit: parse(&bindings.edit)?,
            save: parse(&bindings.save)?,
            delete: parse(&bindings.delete)?,
            list_up: parse(&bindings.list_up)?,
            list_down: parse(&bindings.list_down)?,
            column_left: parse(&bindings.column_left)?,
            column_right: parse(&bindings.column_right)?,
            advance_status: parse(&bindings.advance_status)?,
            retreat_status: parse(&bindings.retreat_status)?,
            previous_day: parse(&bindings.previous_day)?,
            next_day: parse(&bindings.next_day)?,
            today: parse(&bindings.today)?,
            generate_report: parse(&bindings.generate_report)?,
            view_report: parse(&bindings.view_report)?,
            help: parse(&bindings.help)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct UiState {
    pub mode: Mode,
    pub focused_column: usize,
    pub selected: [usize; 3],
    pub report_scroll: usize,
    pub delete_selection: usize, // 0 = Delete, 1 = Cancel
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            mode: Mode::View,
            focused_column: 0,
            selected: [0; 3],
            report_scroll: 0,
            delete_selection: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatusState {
    pub message: Option<String>,
    pub message_time: Option<Instant>,
}

pub struct App {
    pub config: Config,
    pub keys: Keymap,
    pub palette: Palette,
    pub board: Board,

    pub ui: UiState,
    pub form: Option<TaskForm>,
    pub alert: Option<String>,
    pub status: StatusState,
}

impl App {
    pub fn new(config: Config, board: Board) -> Result<Self, TuiError> {
        let keys = Keymap::from_config(&config.key_bindings)?;
        let palette = Palette::from_theme(&config.get_active_theme());
        Ok(Self {
            config,
            keys,
            palette,
            board,
            ui: UiState::default(),
            form: None,
            alert: None,
            status: StatusState::default(),
        })
    }

    pub fn current_date(&self) -> NaiveDate {
        self.board.current_date()
    }

    /// Tasks of the focused column, in board order
    pub fn column_tasks(&self, column: usize) -> Vec<&Task> {
        let [todo, in_progress, done] = self.board.tasks_by_status();
        match column {
            0 => todo,
            1 => in_progress,
            _ => done,
        }
    }

    pub fn selected_task(&self) -> Option<&Task> {
        let column = self.ui.focused_column;
        self.column_tasks(column).get(self.ui.selected[column]).copied()
    }

    /// Keep every column's selection inside its list
    pub fn clamp_selection(&mut self) {
        let lens: Vec<usize> = (0..3).map(|c| self.column_tasks(c).len()).collect();
        for (selected, len) in self.ui.selected.iter_mut().zip(lens) {
            *selected = (*selected).min(len.saturating_sub(1));
        }
    }

    pub fn focus_column(&mut self, forward: bool) {
        self.ui.focused_column = if forward {
            (self.ui.focused_column + 1).min(2)
        } else {
            self.ui.focused_column.saturating_sub(1)
        };
    }

    pub fn move_selection_up(&mut self) {
        let column = self.ui.focused_column;
        self.ui.selected[column] = self.ui.selected[column].saturating_sub(1);
    }

    pub fn move_selection_down(&mut self) {
        let column = self.ui.focused_column;
        let len = self.column_tasks(column).len();
        if self.ui.selected[column] + 1 < len {
            self.ui.selected[column] += 1;
        }
    }

    /// Put the focus on the task with `id`, wherever it now lives
    fn focus_task(&mut self, id: &str) {
        for column in 0..3 {
            if let Some(index) = self.column_tasks(column).iter().position(|t| t.id == id) {
                self.ui.focused_column = column;
                self.ui.selected[column] = index;
                return;
            }
        }
    }

    pub fn previous_day(&mut self) {
        self.board.previous_day();
        self.ui.selected = [0; 3];
    }

    pub fn next_day(&mut self) {
        self.board.next_day();
        self.ui.selected = [0; 3];
    }

    pub fn go_to_today(&mut self) {
        self.board.today();
        self.ui.selected = [0; 3];
    }

    pub fn open_new_form(&mut self) {
        // New tasks start in the focused column
        let status = TaskStatus::ALL[self.ui.focused_column];
        self.form = Some(TaskForm::new(status));
        self.ui.mode = Mode::TaskForm;
    }

    pub fn open_edit_form(&mut self) {
        let Some(form) = self.selected_task().map(TaskForm::from_task) else {
            return;
        };
        self.form = Some(form);
        self.ui.mode = Mode::TaskForm;
    }

    pub fn cancel_form(&mut self) {
        self.form = None;
        self.ui.mode = Mode::View;
    }

    pub fn save_form(&mut self) {
        let Some(form) = self.form.as_ref() else {
            return;
        };
        let editing = form.editing_task_id.is_some();
        match self.board.save_task(form.to_draft()) {
            Ok(task) => {
                self.form = None;
                self.ui.mode = Mode::View;
                self.focus_task(&task.id);
                let verb = if editing { "updated" } else { "created" };
                self.set_status_message(format!("Task {}: {}", verb, task.title));
            }
            // Keep the form so nothing typed is lost
            Err(e @ (BoardError::EmptyTitle | BoardError::Loading)) => {
                self.set_status_message(e.to_string());
            }
            Err(e) => {
                self.form = None;
                self.ui.mode = Mode::View;
                self.set_status_message(e.to_string());
            }
        }
    }

    /// Move the selected task one column right (or left)
    pub fn shift_selected_status(&mut self, forward: bool) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let id = task.id.clone();
        let status = if forward { task.status.next() } else { task.status.previous() };
        if self.board.change_status(&id, status) {
            self.focus_task(&id);
            self.clamp_selection();
        }
    }

    pub fn request_delete_selected(&mut self) {
        let Some(id) = self.selected_task().map(|t| t.id.clone()) else {
            return;
        };
        if self.board.request_delete(&id) {
            self.ui.delete_selection = 0;
            self.ui.mode = Mode::ConfirmDelete;
        }
    }

    pub fn confirm_delete(&mut self) {
        if let Some(task) = self.board.confirm_delete() {
            self.set_status_message(format!("Task deleted: {}", task.title));
        }
        self.clamp_selection();
        self.ui.mode = Mode::View;
    }

    pub fn cancel_delete(&mut self) {
        self.board.cancel_delete();
        self.ui.mode = Mode::View;
    }

    pub fn generate_report(&mut self) {
        match self.board.generate_report() {
            Ok(()) => self.set_status_message("Generating report...".to_string()),
            Err(BoardError::NoTasks) => self.show_alert(BoardError::NoTasks.to_string()),
            Err(e) => self.set_status_message(e.to_string()),
        }
    }

    /// Show the stored report, or generate one if the day has none
    pub fn open_report(&mut self) {
        if self.board.report().is_some() {
            self.ui.report_scroll = 0;
            self.ui.mode = Mode::Report;
        } else {
            self.generate_report();
        }
    }

    pub fn close_report(&mut self) {
        self.ui.mode = Mode::View;
    }

    pub fn scroll_report(&mut self, delta: isize) {
        self.ui.report_scroll = self.ui.report_scroll.saturating_add_signed(delta);
    }

    pub fn copy_report(&mut self) {
        let Some(report) = self.board.report() else {
            return;
        };
        let summary = report.summary.clone();
        let result = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(summary));
        match result {
            Ok(()) => self.set_status_message("Report copied to clipboard".to_string()),
            Err(e) => {
                log::warn!("event=clipboard_copy status=error error={}", e);
                self.set_status_message(format!("Clipboard unavailable: {}", e));
            }
        }
    }

    pub fn show_alert(&mut self, message: String) {
        self.alert = Some(message);
        self.ui.mode = Mode::Alert;
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
        self.ui.mode = Mode::View;
    }

    pub fn enter_help_mode(&mut self) {
        self.ui.mode = Mode::Help;
    }

    pub fn exit_help_mode(&mut self) {
        self.ui.mode = Mode::View;
    }

    /// Apply finished sync work and react to report outcomes
    pub fn poll_board(&mut self) {
        for notice in self.board.poll() {
            self.handle_notice(notice);
        }
        self.clamp_selection();
    }

    fn handle_notice(&mut self, notice: BoardNotice) {
        match notice {
            BoardNotice::ReportReady(report) => self.show_report(report),
            BoardNotice::ReportFailed(message) => {
                // Don't yank the user out of a half-filled form
                if self.ui.mode == Mode::TaskForm {
                    self.set_status_message(message);
                } else {
                    self.show_alert(message);
                }
            }
        }
    }

    fn show_report(&mut self, report: DailyReport) {
        log::debug!("event=report_show date={}", report.date);
        if self.ui.mode == Mode::TaskForm {
            self.set_status_message("Report ready".to_string());
            return;
        }
        self.ui.report_scroll = 0;
        self.ui.mode = Mode::Report;
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status.message = Some(message);
        self.status.message_time = Some(Instant::now());
    }

    pub fn clear_status_message(&mut self) {
        self.status.message = None;
        self.status.message_time = None;
    }

    pub fn check_status_message_timeout(&mut self) {
        if let Some(time) = self.status.message_time {
            if time.elapsed() >= STATUS_MESSAGE_TIMEOUT {
                self.clear_status_message();
            }
        }
    }

    pub fn shutdown(&mut self) {
        self.board.shutdown();
    }
}
