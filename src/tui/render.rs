use ratatui::layout::Alignment;
use ratatui::widgets::{Block, Borders};
use ratatui::Frame;

use crate::models::TaskStatus;
use crate::tui::app::{Mode, TaskField};
use crate::tui::widgets::{
    alert::render_alert,
    board_columns::render_column,
    confirm_delete::render_confirm_delete,
    header::{render_header, render_progress},
    help::render_help,
    report_view::render_report,
    status_bar::render_status_bar,
    task_form::render_task_form,
};
use crate::tui::{App, Layout};
use crate::utils::format_key_binding_for_display as key;

pub fn render(f: &mut Frame, app: &mut App, layout: &Layout) {
    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title("Worklog")
        .title_alignment(Alignment::Center)
        .style(app.palette.base());
    f.render_widget(outer_block, f.area());

    render_header(f, layout.header_area, &app.board, &app.palette);
    render_progress(f, layout.progress_area, &app.board, &app.palette);

    let loading = app.board.is_loading();
    for (column, status) in TaskStatus::ALL.into_iter().enumerate() {
        let tasks = app.column_tasks(column);
        render_column(
            f,
            layout.columns[column],
            status,
            &tasks,
            app.ui.selected[column],
            app.ui.focused_column == column,
            loading,
            &app.palette,
        );
    }

    // Overlays go on top of the board
    match app.ui.mode {
        Mode::TaskForm => {
            if let Some(form) = app.form.as_mut() {
                render_task_form(f, layout.inner_area, form, &app.palette);
            }
        }
        Mode::Report => {
            if let Some(report) = app.board.report() {
                app.ui.report_scroll =
                    render_report(f, layout.inner_area, report, app.ui.report_scroll, &app.palette);
            }
        }
        Mode::Alert => {
            if let Some(message) = app.alert.as_deref() {
                render_alert(f, layout.inner_area, message, &app.palette);
            }
        }
        Mode::ConfirmDelete => {
            if let Some(task) = app.board.pending_delete() {
                render_confirm_delete(f, layout.inner_area, task, app.ui.delete_selection, &app.palette);
            }
        }
        Mode::Help => render_help(f, layout.inner_area, &app.config, &app.palette),
        Mode::View => {}
    }

    let key_hints = get_key_hints(app);
    render_status_bar(f, layout.status_area, app.status.message.as_ref(), &key_hints, &app.palette);
}

fn get_key_hints(app: &App) -> Vec<String> {
    let k = &app.config.key_bindings;
    match app.ui.mode {
        Mode::Help => vec![format!("Esc or {}: Exit help", key(&k.help))],
        Mode::Alert => vec!["Enter/Esc: Dismiss".to_string()],
        Mode::ConfirmDelete => vec![
            "↑/↓: Select".to_string(),
            "Enter: Confirm".to_string(),
            "Esc: Cancel".to_string(),
        ],
        Mode::Report => vec![
            "↑/↓ PgUp/PgDn: Scroll".to_string(),
            "r: Regenerate".to_string(),
            "y: Copy".to_string(),
            "Esc: Close".to_string(),
        ],
        Mode::TaskForm => {
            let on_links = app
                .form
                .as_ref()
                .map(|form| form.current_field == TaskField::Links && form.link_input.is_none())
                .unwrap_or(false);
            let in_link_input = app.form.as_ref().map(|form| form.link_input.is_some()).unwrap_or(false);

            let mut hints = Vec::new();
            if in_link_input {
                hints.push("Tab: Label/URL".to_string());
                hints.push("Enter: Attach link".to_string());
                hints.push("Esc: Discard link".to_string());
            } else {
                hints.push("Tab: Next field".to_string());
                hints.push("Shift+Tab: Previous field".to_string());
                if on_links {
                    hints.push("a: Add link".to_string());
                    hints.push("x: Remove link".to_string());
                }
                hints.push(format!("{}: Save", key(&k.save)));
                hints.push("Esc: Cancel".to_string());
            }
            hints
        }
        Mode::View => vec![
            format!("{}: Quit", key(&k.quit)),
            format!("{}: New", key(&k.new)),
            format!("{}: Edit", key(&k.edit)),
            format!("{}: Delete", key(&k.delete)),
            format!("{}/{}: Move", key(&k.retreat_status), key(&k.advance_status)),
            format!("{}/{}: Day", key(&k.previous_day), key(&k.next_day)),
            format!("{}: Report", key(&k.generate_report)),
            format!("{}: View report", key(&k.view_report)),
            format!("{}: Help", key(&k.help)),
        ],
    }
}
