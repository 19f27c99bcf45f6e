use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::tui::theme::Palette;
use crate::tui::widgets::popup_area;

/// Blocking message box; any of Enter/Esc dismisses it
pub fn render_alert(f: &mut Frame, area: Rect, message: &str, palette: &Palette) {
    let popup_area = popup_area(area, 50, 30);
    f.render_widget(Clear, popup_area);

    let mut lines: Vec<Line> = message
        .lines()
        .map(|l| Line::from(Span::styled(l.to_string(), palette.base())))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("Press Enter to dismiss", palette.muted())));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red))
                .title(Span::styled(
                    " Notice ",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ))
                .title_alignment(Alignment::Center)
                .style(palette.base()),
        )
        .wrap(ratatui::widgets::Wrap { trim: true })
        .alignment(Alignment::Center);

    f.render_widget(paragraph, popup_area);
}
