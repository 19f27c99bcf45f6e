use ratatui::style::{Color, Modifier, Style};

use crate::config::Theme;
use crate::models::TaskStatus;

/// Resolved colors for one frame
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub fg: Color,
    pub bg: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub accent: Color,
}

impl Palette {
    pub fn from_theme(theme: &Theme) -> Self {
        Self {
            fg: parse_color(&theme.fg),
            bg: parse_color(&theme.bg),
            highlight_fg: parse_color(&theme.highlight_fg),
            highlight_bg: parse_color(&theme.highlight_bg),
            accent: parse_color(&theme.accent),
        }
    }

    pub fn base(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    pub fn highlight(&self) -> Style {
        Style::default()
            .fg(self.highlight_fg)
            .bg(self.highlight_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn accent(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(Color::DarkGray)
    }

    /// Column header color for a status
    pub fn status(&self, status: TaskStatus) -> Style {
        let color = match status {
            TaskStatus::Todo => Color::Gray,
            TaskStatus::InProgress => Color::Yellow,
            TaskStatus::Done => Color::Green,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }
}

/// Parse a color string into a ratatui Color.
///
/// Accepts named colors (`red`, `lightblue`, `darkgray`, ...), `#RRGGBB`,
/// `#RGB` and `rgb(r, g, b)`. Anything else falls back to white.
pub fn parse_color(color_str: &str) -> Color {
    let s = color_str.trim().to_lowercase();

    match s.as_str() {
        "black" => Color::Black,
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "gray" | "grey" | "lightgray" | "lightgrey" => Color::Gray,
        "darkgray" | "darkgrey" => Color::DarkGray,
        "lightred" => Color::LightRed,
        "lightgreen" => Color::LightGreen,
        "lightyellow" => Color::LightYellow,
        "lightblue" => Color::LightBlue,
        "lightmagenta" => Color::LightMagenta,
        "lightcyan" => Color::LightCyan,
        _ if s.starts_with('#') => parse_hex_color(&s).unwrap_or(Color::White),
        _ if s.starts_with("rgb(") => parse_rgb_color(&s).unwrap_or(Color::White),
        _ => Color::White,
    }
}

fn parse_hex_color(s: &str) -> Option<Color> {
    let hex = s.trim_start_matches('#');
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();

    match hex.len() {
        6 => Some(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        // #RGB expands each nibble: 0xF -> 0xFF
        3 => {
            let (r, g, b) = (channel(0..1)?, channel(1..2)?, channel(2..3)?);
            Some(Color::Rgb((r << 4) | r, (g << 4) | g, (b << 4) | b))
        }
        _ => None,
    }
}

fn parse_rgb_color(s: &str) -> Option<Color> {
    let content = s.strip_prefix("rgb(")?.strip_suffix(')')?;
    let parts: Vec<u8> = content
        .split(',')
        .map(|p| p.trim().parse::<u8>().ok())
        .collect::<Option<Vec<_>>>()?;
    match parts.as_slice() {
        [r, g, b] => Some(Color::Rgb(*r, *g, *b)),
        _ => None,
    }
}

/// Format a Color back to string for display
pub fn format_color_for_display(color: &Color) -> String {
    match color {
        Color::Black => "black".to_string(),
        Color::Red => "red".to_string(),
        Color::Green => "green".to_string(),
        Color::Yellow => "yellow".to_string(),
        Color::Blue => "blue".to_string(),
        Color::Magenta => "magenta".to_string(),
        Color::Cyan => "cyan".to_string(),
        Color::White => "white".to_string(),
        Color::Gray => "gray".to_string(),
        Color::DarkGray => "darkgray".to_string(),
        Color::LightRed => "lightred".to_string(),
        Color::LightGreen => "lightgreen".to_string(),
        Color::LightYellow => "lightyellow".to_string(),
        Color::LightBlue => "lightblue".to_string(),
        Color::LightMagenta => "lightmagenta".to_string(),
        Color::LightCyan => "lightcyan".to_string(),
        Color::Rgb(r, g, b) => format!("#{:02X}{:02X}{:02X}", r, g, b),
        Color::Indexed(_) => "indexed".to_string(),
        Color::Reset => "reset".to_string(),
    }
}

/// WCAG relative luminance, 0.0 (dark) to 1.0 (light)
fn relative_luminance(r: u8, g: u8, b: u8) -> f64 {
    let linear = |c: u8| {
        let c = c as f64 / 255.0;
        if c <= 0.03928 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) }
    };
    0.2126 * linear(r) + 0.7152 * linear(g) + 0.0722 * linear(b)
}

/// Black or white text, whichever reads better on `background`
pub fn get_contrast_text_color(background: Color) -> Color {
    match background {
        Color::Rgb(r, g, b) => {
            if relative_luminance(r, g, b) < 0.5 { Color::White } else { Color::Black }
        }
        // Gray renders light in most terminals
        Color::Black | Color::Blue | Color::Magenta | Color::Red | Color::DarkGray => Color::White,
        _ => Color::Black,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_hex_and_rgb() {
        assert_eq!(parse_color(" LightBlue "), Color::LightBlue);
        assert_eq!(parse_color("#6366f1"), Color::Rgb(0x63, 0x66, 0xf1));
        assert_eq!(parse_color("#fa0"), Color::Rgb(0xff, 0xaa, 0x00));
        assert_eq!(parse_color("rgb(1, 2, 3)"), Color::Rgb(1, 2, 3));
        assert_eq!(parse_color("rgb(1,2)"), Color::White);
        assert_eq!(parse_color("chartreuse"), Color::White);
    }

    #[test]
    fn contrast_picks_readable_text() {
        assert_eq!(get_contrast_text_color(Color::Blue), Color::White);
        assert_eq!(get_contrast_text_color(Color::Yellow), Color::Black);
        assert_eq!(get_contrast_text_color(Color::Rgb(250, 250, 250)), Color::Black);
        assert_eq!(get_contrast_text_color(Color::Rgb(20, 20, 60)), Color::White);
    }

    #[test]
    fn hex_display_is_uppercase() {
        assert_eq!(format_color_for_display(&Color::Rgb(0x63, 0x66, 0xf1)), "#6366F1");
    }
}
