use ratatui::layout::{Constraint, Direction, Layout as RatLayout, Rect};

pub struct Layout {
    pub inner_area: Rect, // Area inside the outer border
    pub header_area: Rect,
    pub progress_area: Rect,
    pub columns: [Rect; 3],
    pub status_area: Rect,
}

impl Layout {
    /// Minimum inner size: three 20-column lists, header, gauge and one card row
    pub const MIN_WIDTH: u16 = 60;
    pub const MIN_HEIGHT: u16 = 12;

    pub fn calculate(size: Rect) -> Self {
        let width = size.width.max(Self::MIN_WIDTH + 2);
        let height = size.height.max(Self::MIN_HEIGHT + 2);
        let size = Rect::new(size.x, size.y, width, height);

        let inner_area = Rect::new(
            size.x + 1,
            size.y + 1,
            size.width.saturating_sub(2),
            size.height.saturating_sub(2),
        );

        let vertical = RatLayout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2), // Date + counts
                Constraint::Length(1), // Progress gauge
                Constraint::Min(3),    // Columns
                Constraint::Length(1), // Status
            ])
            .split(inner_area);

        let horizontal = RatLayout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
                Constraint::Ratio(1, 3),
            ])
            .split(vertical[2]);

        Self {
            inner_area,
            header_area: vertical[0],
            progress_area: vertical[1],
            columns: [horizontal[0], horizontal[1], horizontal[2]],
            status_area: vertical[3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_split_the_board_evenly() {
        let layout = Layout::calculate(Rect::new(0, 0, 92, 30));
        let widths: Vec<u16> = layout.columns.iter().map(|c| c.width).collect();
        assert_eq!(widths.iter().sum::<u16>(), 90);
        assert!(widths.iter().all(|w| *w == 30));
        assert_eq!(layout.status_area.y, 28);
        assert_eq!(layout.header_area.height, 2);
    }

    #[test]
    fn tiny_terminals_are_padded_to_minimum() {
        let layout = Layout::calculate(Rect::new(0, 0, 10, 5));
        assert_eq!(layout.inner_area.width, Layout::MIN_WIDTH);
        assert_eq!(layout.inner_area.height, Layout::MIN_HEIGHT);
    }
}
