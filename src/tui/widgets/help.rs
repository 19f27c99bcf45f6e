use ratatui::layout::{Alignment, Rect};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::config::Config;
use crate::tui::theme::Palette;
use crate::tui::widgets::popup_area;
use crate::utils::format_key_binding_for_display as key;

pub fn render_help(f: &mut Frame, area: Rect, config: &Config, palette: &Palette) {
    let popup_area = popup_area(area, 60, 75);
    f.render_widget(Clear, popup_area);

    let paragraph = Paragraph::new(build_help_text(config))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help - Key Bindings")
                .title_alignment(Alignment::Center)
                .style(palette.base()),
        )
        .style(palette.base())
        .wrap(ratatui::widgets::Wrap { trim: false });

    f.render_widget(paragraph, popup_area);
}

fn build_help_text(config: &Config) -> String {
    let k = &config.key_bindings;
    let mut text = String::new();

    text.push_str("Days:\n");
    text.push_str(&format!("  {} / {}: Previous / next day\n", key(&k.previous_day), key(&k.next_day)));
    text.push_str(&format!("  {}: Jump to today\n", key(&k.today)));
    text.push('\n');

    text.push_str("Board:\n");
    text.push_str(&format!("  {} / {} or ←/→: Focus column\n", key(&k.column_left), key(&k.column_right)));
    text.push_str(&format!("  {} / {} or ↑/↓: Select task\n", key(&k.list_up), key(&k.list_down)));
    text.push_str(&format!("  {}: New task in focused column\n", key(&k.new)));
    text.push_str(&format!("  {} or Enter: Edit task\n", key(&k.edit)));
    text.push_str(&format!("  {}: Delete task\n", key(&k.delete)));
    text.push_str(&format!("  {}: Move task to next status\n", key(&k.advance_status)));
    text.push_str(&format!("  {}: Move task to previous status\n", key(&k.retreat_status)));
    text.push('\n');

    text.push_str("Reports:\n");
    text.push_str(&format!("  {}: Generate end-of-day report\n", key(&k.generate_report)));
    text.push_str(&format!("  {}: View report (generates if missing)\n", key(&k.view_report)));
    text.push_str("  In report: r regenerate, y copy, ↑/↓ scroll, Esc close\n");
    text.push('\n');

    text.push_str("Task form:\n");
    text.push_str("  Tab / Shift+Tab: Next / previous field\n");
    text.push_str("  ←/→ on Status: Change status\n");
    text.push_str("  a on Links: Add link, x: Remove link\n");
    text.push_str(&format!("  {}: Save task\n", key(&k.save)));
    text.push_str("  Esc: Cancel\n");
    text.push('\n');

    text.push_str("General:\n");
    text.push_str(&format!("  {}: Show/hide help\n", key(&k.help)));
    text.push_str(&format!("  {}: Quit\n", key(&k.quit)));

    text
}
