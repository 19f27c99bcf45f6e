pub mod alert;
pub mod board_columns;
pub mod confirm_delete;
pub mod editor;
pub mod header;
pub mod help;
pub mod report_view;
pub mod status_bar;
pub mod task_form;

use ratatui::layout::{Constraint, Flex, Layout, Rect};

/// Centered rect taking a percentage of `area`, as in the ratatui popup example
pub fn popup_area(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let vertical = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center);
    let horizontal = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center);
    let [area] = vertical.areas(area);
    let [area] = horizontal.areas(area);
    area
}
