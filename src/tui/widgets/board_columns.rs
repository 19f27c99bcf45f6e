use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use ratatui::Frame;

use crate::models::{Task, TaskStatus};
use crate::tui::theme::Palette;

/// Placeholder shown in a column with no tasks
pub fn empty_text(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => "No tasks pending",
        TaskStatus::InProgress => "Nothing in progress",
        TaskStatus::Done => "No completed tasks yet",
    }
}

fn status_marker(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Todo => "○",
        TaskStatus::InProgress => "◐",
        TaskStatus::Done => "✓",
    }
}

fn truncate(text: &str, max_width: usize) -> String {
    if text.chars().count() > max_width {
        text.chars().take(max_width.saturating_sub(3)).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

/// One card: title, first notes line, attachment count, blank spacer
fn task_card<'a>(task: &Task, max_width: usize, palette: &Palette) -> ListItem<'a> {
    let mut lines = vec![Line::from(vec![
        Span::styled(format!("{} ", status_marker(task.status)), palette.status(task.status)),
        Span::styled(
            truncate(&task.title, max_width.saturating_sub(2)),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ])];

    if let Some(first) = task.notes.lines().find(|l| !l.trim().is_empty()) {
        lines.push(Line::from(Span::styled(
            format!("  {}", truncate(first.trim(), max_width.saturating_sub(2))),
            palette.muted(),
        )));
    }

    if !task.links.is_empty() {
        let count = task.links.len();
        let plural = if count == 1 { "" } else { "s" };
        lines.push(Line::from(Span::styled(
            format!("  🔗 {} attachment{}", count, plural),
            palette.muted(),
        )));
    }

    lines.push(Line::from(""));
    ListItem::new(lines)
}

#[allow(clippy::too_many_arguments)]
pub fn render_column(
    f: &mut Frame,
    area: Rect,
    status: TaskStatus,
    tasks: &[&Task],
    selected: usize,
    focused: bool,
    loading: bool,
    palette: &Palette,
) {
    let border_style = if focused { palette.accent() } else { palette.muted() };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Line::from(vec![
            Span::styled(format!(" {} ", status.label()), palette.status(status)),
            Span::styled(format!("({}) ", tasks.len()), palette.muted()),
        ]))
        .style(palette.base());

    if tasks.is_empty() {
        let text = if loading { "Loading tasks..." } else { empty_text(status) };
        let paragraph = Paragraph::new(Span::styled(text, palette.muted()))
            .block(block)
            .alignment(ratatui::layout::Alignment::Center);
        f.render_widget(paragraph, area);
        return;
    }

    let max_width = area.width.saturating_sub(4) as usize; // 2 for borders, 2 for padding
    let items: Vec<ListItem> = tasks.iter().map(|t| task_card(t, max_width, palette)).collect();

    let highlight = if focused { palette.highlight() } else { Style::default() };
    let list = List::new(items).block(block).highlight_style(highlight);

    let mut state = ListState::default();
    if focused {
        state.select(Some(selected.min(tasks.len() - 1)));
    }
    f.render_stateful_widget(list, area, &mut state);
}
