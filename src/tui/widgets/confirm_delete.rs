use ratatui::layout::{Alignment, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::models::Task;
use crate::tui::theme::Palette;
use crate::tui::widgets::popup_area;

pub const OPTIONS: [&str; 2] = ["Delete", "Cancel"];

pub fn render_confirm_delete(f: &mut Frame, area: Rect, task: &Task, selection: usize, palette: &Palette) {
    let popup_area = popup_area(area, 50, 35);
    f.render_widget(Clear, popup_area);

    let mut lines = vec![
        Line::from(Span::styled("Are you sure you want to delete this task?", palette.base())),
        Line::from(""),
        Line::from(Span::styled(task.title.clone(), palette.accent())),
        Line::from(""),
    ];

    for (index, option) in OPTIONS.iter().enumerate() {
        let is_selected = index == selection;
        let prefix = if is_selected { "> " } else { "  " };
        let style = if is_selected { palette.highlight() } else { palette.base() };
        lines.push(Line::from(Span::styled(format!("{}{}", prefix, option), style)));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Use ↑↓ to navigate, Enter to confirm, Esc to cancel",
        palette.muted(),
    )));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Delete Task")
                .title_alignment(Alignment::Center)
                .style(palette.base()),
        )
        .style(palette.base())
        .wrap(ratatui::widgets::Wrap { trim: true })
        .alignment(Alignment::Center);

    f.render_widget(paragraph, popup_area);
}
