use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, size as terminal_size, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Terminal;
use std::io;
use std::time::Duration;

use crate::tui::app::{Mode, TaskField};
use crate::tui::error::TuiError;
use crate::tui::layout::Layout;
use crate::tui::App;

const TICK: Duration = Duration::from_millis(16);
const REPORT_PAGE: isize = 10;

/// Restores the terminal even if the loop panics
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: true,
        })
    }

    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Already cleaning up; errors have nowhere to go
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

/// Refuse to start in a terminal the board cannot fit in
fn check_terminal_size() -> Result<(), TuiError> {
    let (width, height) = terminal_size()?;
    let min_width = Layout::MIN_WIDTH + 2;
    let min_height = Layout::MIN_HEIGHT + 2;
    if width < min_width || height < min_height {
        return Err(TuiError::RenderError(format!(
            "Terminal size too small. Current: {}x{}, Minimum required: {}x{}. Please resize your terminal window.",
            width, height, min_width, min_height
        )));
    }
    Ok(())
}

pub fn run_event_loop(mut app: App) -> Result<(), TuiError> {
    check_terminal_size()?;

    let mut guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = (|| -> Result<(), TuiError> {
        loop {
            app.poll_board();
            app.check_status_message_timeout();

            let size = terminal.size()?;
            let area = Rect::new(0, 0, size.width, size.height);
            terminal.draw(|f| {
                let layout = Layout::calculate(area);
                crate::tui::render::render(f, &mut app, &layout);
            })?;

            // Press only; Windows also reports Release
            if event::poll(TICK)? {
                if let Event::Key(key_event) = event::read()? {
                    if key_event.kind == KeyEventKind::Press && handle_key_event(&mut app, key_event) {
                        return Ok(());
                    }
                }
            }
        }
    })();

    log::info!("event=app_quit");
    app.shutdown();
    guard.restore()?;
    result
}

/// Full-screen message shown when the store could not be opened. Waits for q/Esc.
pub fn run_startup_error(message: &str) -> Result<(), TuiError> {
    let mut guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    loop {
        terminal.draw(|f| {
            let lines = vec![
                Line::from(Span::styled(
                    "Initializing...",
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(message.to_string(), Style::default().fg(Color::Red))),
                Line::from(""),
                Line::from(Span::styled("Press q to quit", Style::default().fg(Color::DarkGray))),
            ];
            let paragraph = Paragraph::new(lines)
                .block(Block::default().borders(Borders::ALL).title("Worklog").title_alignment(Alignment::Center))
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            f.render_widget(paragraph, f.area());
        })?;

        if event::poll(TICK)? {
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind == KeyEventKind::Press
                    && matches!(key_event.code, KeyCode::Char('q') | KeyCode::Esc)
                {
                    break;
                }
            }
        }
    }

    guard.restore()
}

/// Dispatch one key press. Returns true when the user asked to quit.
pub fn handle_key_event(app: &mut App, key_event: KeyEvent) -> bool {
    match app.ui.mode {
        Mode::View => return handle_view_mode(app, key_event),
        Mode::TaskForm => handle_task_form_mode(app, key_event),
        Mode::Report => handle_report_mode(app, key_event),
        Mode::Alert => {
            if matches!(key_event.code, KeyCode::Enter | KeyCode::Esc) {
                app.dismiss_alert();
            }
        }
        Mode::ConfirmDelete => handle_confirm_delete_mode(app, key_event),
        Mode::Help => {
            if key_event.code == KeyCode::Esc || app.keys.help.matches(&key_event) {
                app.exit_help_mode();
            }
        }
    }
    false
}

fn handle_view_mode(app: &mut App, key_event: KeyEvent) -> bool {
    let keys = app.keys.clone();
    if keys.quit.matches(&key_event) {
        return true;
    }

    if keys.help.matches(&key_event) {
        app.enter_help_mode();
    } else if keys.new.matches(&key_event) {
        app.open_new_form();
    } else if keys.edit.matches(&key_event) || key_event.code == KeyCode::Enter {
        app.open_edit_form();
    } else if keys.delete.matches(&key_event) {
        app.request_delete_selected();
    } else if keys.list_up.matches(&key_event) || key_event.code == KeyCode::Up {
        app.move_selection_up();
    } else if keys.list_down.matches(&key_event) || key_event.code == KeyCode::Down {
        app.move_selection_down();
    } else if keys.column_left.matches(&key_event) || key_event.code == KeyCode::Left {
        app.focus_column(false);
    } else if keys.column_right.matches(&key_event) || key_event.code == KeyCode::Right {
        app.focus_column(true);
    } else if keys.advance_status.matches(&key_event) {
        app.shift_selected_status(true);
    } else if keys.retreat_status.matches(&key_event) {
        app.shift_selected_status(false);
    } else if keys.previous_day.matches(&key_event) {
        app.previous_day();
    } else if keys.next_day.matches(&key_event) {
        app.next_day();
    } else if keys.today.matches(&key_event) {
        app.go_to_today();
    } else if keys.generate_report.matches(&key_event) {
        app.generate_report();
    } else if keys.view_report.matches(&key_event) {
        app.open_report();
    }
    false
}

fn handle_task_form_mode(app: &mut App, key_event: KeyEvent) {
    if app.keys.save.matches(&key_event) {
        app.save_form();
        return;
    }

    let Some(form) = app.form.as_mut() else {
        app.cancel_form();
        return;
    };

    // Inline link sub-form takes every key until it is closed
    if let Some(input) = form.link_input.as_mut() {
        match key_event.code {
            KeyCode::Esc => form.link_input = None,
            KeyCode::Tab | KeyCode::BackTab => input.on_url = !input.on_url,
            KeyCode::Enter => {
                if input.on_url {
                    form.commit_link_input();
                } else {
                    input.on_url = true;
                }
            }
            _ => {
                input.active_editor().handle_key(&key_event);
            }
        }
        return;
    }

    match key_event.code {
        KeyCode::Esc => {
            app.cancel_form();
            return;
        }
        KeyCode::Tab => {
            form.navigate(!key_event.modifiers.contains(KeyModifiers::SHIFT));
            return;
        }
        KeyCode::BackTab => {
            form.navigate(false);
            return;
        }
        _ => {}
    }

    match form.current_field {
        TaskField::Status => match key_event.code {
            KeyCode::Left => form.status = form.status.previous(),
            KeyCode::Right | KeyCode::Char(' ') => form.status = form.status.next(),
            KeyCode::Enter => form.navigate(true),
            _ => {}
        },
        TaskField::Links => match key_event.code {
            KeyCode::Char('a') | KeyCode::Enter => form.open_link_input(),
            KeyCode::Char('x') | KeyCode::Delete => form.remove_selected_link(),
            KeyCode::Up => form.link_selected = form.link_selected.saturating_sub(1),
            KeyCode::Down => {
                if form.link_selected + 1 < form.links.len() {
                    form.link_selected += 1;
                }
            }
            _ => {}
        },
        TaskField::Title => {
            if key_event.code == KeyCode::Enter {
                form.navigate(true);
            } else {
                form.title.handle_key(&key_event);
            }
        }
        TaskField::Notes => {
            form.notes.handle_key(&key_event);
        }
    }
}

fn handle_report_mode(app: &mut App, key_event: KeyEvent) {
    match key_event.code {
        KeyCode::Esc | KeyCode::Char('q') => app.close_report(),
        KeyCode::Up | KeyCode::Char('k') => app.scroll_report(-1),
        KeyCode::Down | KeyCode::Char('j') => app.scroll_report(1),
        KeyCode::PageUp => app.scroll_report(-REPORT_PAGE),
        KeyCode::PageDown => app.scroll_report(REPORT_PAGE),
        KeyCode::Char('r') => {
            app.close_report();
            app.generate_report();
        }
        KeyCode::Char('y') => app.copy_report(),
        _ => {}
    }
}

fn handle_confirm_delete_mode(app: &mut App, key_event: KeyEvent) {
    match key_event.code {
        KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
            app.ui.delete_selection = 1 - app.ui.delete_selection.min(1);
        }
        KeyCode::Enter => {
            if app.ui.delete_selection == 0 {
                app.confirm_delete();
            } else {
                app.cancel_delete();
            }
        }
        KeyCode::Char('y') => app.confirm_delete(),
        KeyCode::Esc | KeyCode::Char('n') => app.cancel_delete(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::config::Config;
    use crate::models::TaskStatus;
    use crate::store::LocalStore;
    use crate::summary::{LanguageModel, SummaryError, SummaryGenerator};
    use crate::sync::SyncHandle;
    use chrono::NaiveDate;

    struct Silent;

    impl LanguageModel for Silent {
        fn generate(&self, _prompt: &str) -> Result<Option<String>, SummaryError> {
            Ok(Some("# Done".to_string()))
        }
    }

    fn app() -> App {
        let store = LocalStore::open_in_memory().unwrap();
        let sync = SyncHandle::spawn(store, SummaryGenerator::new(Box::new(Silent))).unwrap();
        let mut board = Board::new(sync, NaiveDate::from_ymd_opt(2024, 6, 14).unwrap());
        board.settle();
        App::new(Config::default(), board).unwrap()
    }

    fn press(app: &mut App, code: KeyCode) -> bool {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    #[test]
    fn quit_only_from_board_view() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.ui.mode, Mode::TaskForm);
        assert!(!press(&mut app, KeyCode::Char('q')));
        press(&mut app, KeyCode::Esc);
        assert!(press(&mut app, KeyCode::Char('q')));
    }

    #[test]
    fn typing_a_task_and_saving_adds_it_to_the_board() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "Write spec");
        handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));

        assert_eq!(app.ui.mode, Mode::View);
        assert_eq!(app.board.tasks().len(), 1);
        assert_eq!(app.board.tasks()[0].title, "Write spec");
        assert_eq!(app.board.tasks()[0].status, TaskStatus::Todo);
        app.shutdown();
    }

    #[test]
    fn space_moves_selected_task_to_next_column() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "Review");
        handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));

        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.board.tasks()[0].status, TaskStatus::InProgress);
        assert_eq!(app.ui.focused_column, 1);
        app.shutdown();
    }

    #[test]
    fn delete_needs_confirmation() {
        let mut app = app();
        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "Temp");
        handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));

        press(&mut app, KeyCode::Char('d'));
        assert_eq!(app.ui.mode, Mode::ConfirmDelete);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.board.tasks().len(), 1);

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Enter);
        assert!(app.board.tasks().is_empty());
        app.shutdown();
    }

    #[test]
    fn saving_while_the_day_loads_keeps_the_form() {
        let mut app = app();
        app.board.next_day();
        press(&mut app, KeyCode::Char('n'));
        type_text(&mut app, "Early bird");
        handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));

        assert_eq!(app.ui.mode, Mode::TaskForm);
        assert!(app.form.is_some());
        assert_eq!(
            app.status.message.as_deref(),
            Some("Tasks for this day are still loading")
        );

        app.board.settle();
        handle_key_event(&mut app, KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL));
        assert_eq!(app.ui.mode, Mode::View);
        assert_eq!(app.board.tasks()[0].date, "2024-06-15");
        app.shutdown();
    }

    #[test]
    fn report_on_empty_day_shows_alert() {
        let mut app = app();
        press(&mut app, KeyCode::Char('g'));
        assert_eq!(app.ui.mode, Mode::Alert);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.ui.mode, Mode::View);
    }
}
