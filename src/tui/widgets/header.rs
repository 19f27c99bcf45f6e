use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Gauge, Paragraph};
use ratatui::Frame;

use crate::board::Board;
use crate::tui::theme::Palette;
use crate::utils::{format_long_date, today};

pub fn render_header(f: &mut Frame, area: Rect, board: &Board, palette: &Palette) {
    let date = board.current_date();
    let mut title = vec![
        Span::styled("◀ ", palette.muted()),
        Span::styled(format_long_date(date), palette.accent()),
        Span::styled(" ▶", palette.muted()),
    ];
    if date == today() {
        title.push(Span::styled("  (today)", palette.muted()));
    }
    if board.is_loading() {
        title.push(Span::styled("  syncing...", palette.muted()));
    }
    if board.is_generating_report() {
        title.push(Span::styled("  generating report...", palette.accent()));
    } else if board.report().is_some() {
        title.push(Span::styled("  report available", palette.muted()));
    }

    let counts = board.counts();
    let summary = Line::from(vec![
        Span::styled(format!("{} tasks", counts.total()), palette.base()),
        Span::styled("  •  ", palette.muted()),
        Span::styled(format!("{} to do", counts.todo), palette.base()),
        Span::styled("  •  ", palette.muted()),
        Span::styled(format!("{} in progress", counts.in_progress), palette.base()),
        Span::styled("  •  ", palette.muted()),
        Span::styled(format!("{} completed", counts.done), palette.base()),
    ]);

    let paragraph = Paragraph::new(vec![Line::from(title), summary]).style(palette.base());
    f.render_widget(paragraph, area);
}

pub fn render_progress(f: &mut Frame, area: Rect, board: &Board, palette: &Palette) {
    let percent = board.progress_percent();
    let counts = board.counts();
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(palette.accent).bg(palette.bg))
        .percent(u16::from(percent))
        .label(format!(
            "Daily progress {}% ({}/{} done)",
            percent,
            counts.done,
            counts.total()
        ));
    f.render_widget(gauge, area);
}
