use chrono::{DateTime, Local};
use ratatui::layout::{Alignment, Constraint, Direction, Layout as RatLayout, Rect};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};
use ratatui::Frame;
use ratskin::RatSkin;
use std::cmp;
use termimad::minimad::Text as MinimadText;

use crate::models::DailyReport;
use crate::tui::theme::Palette;
use crate::tui::widgets::popup_area;

/// Local wall-clock time of `generated_at` (epoch millis)
pub fn format_generated_at(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.with_timezone(&Local).format("%b %-d, %Y at %H:%M").to_string())
        .unwrap_or_else(|| "unknown time".to_string())
}

/// Render markdown to owned ratatui lines wrapped at `width`
pub fn markdown_lines(markdown: &str, width: u16) -> Vec<Line<'static>> {
    RatSkin::default()
        .parse(MinimadText::from(markdown), width)
        .into_iter()
        .map(|line| {
            let spans: Vec<Span<'static>> = line
                .spans
                .into_iter()
                .map(|span| Span::styled(span.content.to_string(), span.style))
                .collect();
            Line::from(spans)
        })
        .collect()
}

/// Draw the report popup. Returns the scroll offset actually used.
pub fn render_report(
    f: &mut Frame,
    area: Rect,
    report: &DailyReport,
    scroll_offset: usize,
    palette: &Palette,
) -> usize {
    let popup_area = popup_area(area, 80, 85);
    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Daily Report - {} ", report.date))
        .title_alignment(Alignment::Center)
        .title_bottom(Line::from(Span::styled(
            format!(" Generated on {} ", format_generated_at(report.generated_at)),
            palette.muted(),
        )))
        .style(palette.base());
    let inner = block.inner(popup_area);
    f.render_widget(block, popup_area);

    let horizontal = RatLayout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);
    let content_area = horizontal[0];
    let scrollbar_area = horizontal[1];

    let lines = markdown_lines(&report.summary, content_area.width.saturating_sub(1));
    let total_lines = lines.len();
    let viewport_height = content_area.height as usize;

    let max_scroll = total_lines.saturating_sub(viewport_height);
    let scroll_offset = cmp::min(scroll_offset, max_scroll);
    let end_line = cmp::min(scroll_offset + viewport_height, total_lines);
    let visible = Text::from(lines[scroll_offset.min(end_line)..end_line].to_vec());

    // trim: false keeps list indentation
    let paragraph = Paragraph::new(visible)
        .style(palette.base())
        .wrap(ratatui::widgets::Wrap { trim: false });
    f.render_widget(paragraph, content_area);

    if total_lines > viewport_height {
        let mut scrollbar_state = ScrollbarState::new(total_lines)
            .viewport_content_length(viewport_height)
            .position(scroll_offset);
        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"))
            .track_symbol(Some("│"))
            .thumb_symbol("█");
        f.render_stateful_widget(scrollbar, scrollbar_area, &mut scrollbar_state);
    }

    scroll_offset
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markdown_produces_plain_text_lines() {
        let lines = markdown_lines("# Achievements\n\n- shipped **v1**\n- fixed bug", 40);
        let text: Vec<String> = lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert!(text.iter().any(|l| l.contains("Achievements")));
        assert!(text.iter().any(|l| l.contains("shipped") && l.contains("v1")));
        assert!(!text.iter().any(|l| l.contains("**")));
    }

    #[test]
    fn invalid_timestamp_is_reported_as_unknown() {
        assert_eq!(format_generated_at(i64::MAX), "unknown time");
        assert!(format_generated_at(1_718_000_000_000).contains("2024"));
    }
}
