use ratatui::layout::Rect;
use ratatui::style::Modifier;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::theme::{get_contrast_text_color, Palette};

const SEPARATOR: &str = " • ";
const ELLIPSIS: &str = "...";

/// Join as many hints as fit in `max_width`, ending with "..." when some are cut
pub fn fit_hints(key_hints: &[String], max_width: usize) -> String {
    let mut text = String::new();
    for (i, hint) in key_hints.iter().enumerate() {
        let current_len = text.chars().count();
        let would_be_len = if i == 0 {
            hint.chars().count()
        } else {
            current_len + SEPARATOR.chars().count() + hint.chars().count()
        };

        if would_be_len > max_width {
            if i == 0 {
                text = hint.chars().take(max_width.saturating_sub(ELLIPSIS.len())).collect();
            } else if current_len + ELLIPSIS.len() > max_width {
                text = text.chars().take(max_width.saturating_sub(ELLIPSIS.len())).collect();
            }
            text.push_str(ELLIPSIS);
            break;
        }

        if i > 0 {
            text.push_str(SEPARATOR);
        }
        text.push_str(hint);
    }
    text
}

pub fn render_status_bar(
    f: &mut Frame,
    area: Rect,
    message: Option<&String>,
    key_hints: &[String],
    palette: &Palette,
) {
    let max_width = area.width as usize;

    let (content, style) = match message {
        Some(msg) => {
            let content = if msg.chars().count() > max_width {
                msg.chars().take(max_width.saturating_sub(3)).collect::<String>() + ELLIPSIS
            } else {
                msg.clone()
            };
            let style = palette
                .base()
                .fg(get_contrast_text_color(palette.highlight_bg))
                .bg(palette.highlight_bg)
                .add_modifier(Modifier::BOLD);
            (content, style)
        }
        None => (fit_hints(key_hints, max_width), palette.base()),
    };

    f.render_widget(Paragraph::new(content).style(style), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hints() -> Vec<String> {
        vec!["q: Quit".to_string(), "n: New".to_string(), "F1: Help".to_string()]
    }

    #[test]
    fn all_hints_fit_on_wide_bar() {
        assert_eq!(fit_hints(&hints(), 80), "q: Quit • n: New • F1: Help");
    }

    #[test]
    fn overflow_is_marked_with_ellipsis() {
        assert_eq!(fit_hints(&hints(), 20), "q: Quit • n: New...");
        assert_eq!(fit_hints(&hints(), 5), "q:...");
    }
}
