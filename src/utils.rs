use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

/// Profile mode for the application (dev or prod), chosen by the `--dev` flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Dev,
    Prod,
}

impl Profile {
    fn app_name(self) -> &'static str {
        match self {
            Profile::Dev => "worklog-dev",
            Profile::Prod => "worklog",
        }
    }
}

fn project_dirs(profile: Profile) -> Option<ProjectDirs> {
    // "com" qualifier keeps macOS paths under ~/Library/Application Support/<app>
    ProjectDirs::from("com", "worklog", profile.app_name())
}

/// Configuration directory for the profile (`worklog` or `worklog-dev`)
pub fn get_config_dir(profile: Profile) -> Option<PathBuf> {
    project_dirs(profile).map(|dirs| dirs.config_dir().to_path_buf())
}

/// Data directory for the profile: local database and log files
pub fn get_data_dir(profile: Profile) -> Option<PathBuf> {
    project_dirs(profile).map(|dirs| dirs.data_dir().to_path_buf())
}

/// Expand `~` in a path string to the user's home directory
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Parse a date string in ISO 8601 format (YYYY-MM-DD)
pub fn parse_date(date_str: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(date_str.trim(), "%Y-%m-%d")
}

/// The current calendar day in the local timezone
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Header form of a day, e.g. "Friday, June 14, 2024"
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

/// Parsed key binding information
#[derive(Debug, Clone)]
pub struct ParsedKeyBinding {
    pub key_code: KeyCode,
    pub requires_ctrl: bool,
}

impl ParsedKeyBinding {
    pub fn matches(&self, key_event: &KeyEvent) -> bool {
        self.requires_ctrl == has_primary_modifier(key_event.modifiers)
            && self.key_code == key_event.code
    }
}

/// Check if a key event has the primary modifier (Ctrl, or Ctrl/Option on macOS)
pub fn has_primary_modifier(modifiers: KeyModifiers) -> bool {
    #[cfg(target_os = "macos")]
    {
        modifiers.contains(KeyModifiers::CONTROL) || modifiers.contains(KeyModifiers::ALT)
    }

    #[cfg(not(target_os = "macos"))]
    {
        modifiers.contains(KeyModifiers::CONTROL)
    }
}

/// Format a key binding string for display; macOS shows "Opt+" for "Ctrl+"
pub fn format_key_binding_for_display(key_binding: &str) -> String {
    #[cfg(target_os = "macos")]
    {
        key_binding.replace("Ctrl+", "Opt+")
    }

    #[cfg(not(target_os = "macos"))]
    {
        key_binding.to_string()
    }
}

/// Parse a key binding string from config into a ParsedKeyBinding
/// Supports single keys ("q", "["), special keys ("Enter", "Space", "F1")
/// and the Ctrl modifier ("Ctrl+s")
pub fn parse_key_binding(key_str: &str) -> Result<ParsedKeyBinding, String> {
    let key_str = key_str.trim();

    if let Some(key_part) = key_str.strip_prefix("Ctrl+") {
        return Ok(ParsedKeyBinding {
            key_code: parse_key_code(key_part)?,
            requires_ctrl: true,
        });
    }

    Ok(ParsedKeyBinding {
        key_code: parse_key_code(key_str)?,
        requires_ctrl: false,
    })
}

/// Parse a key code from a string (without modifiers)
fn parse_key_code(key_str: &str) -> Result<KeyCode, String> {
    match key_str {
        "Enter" => Ok(KeyCode::Enter),
        "Esc" | "Escape" => Ok(KeyCode::Esc),
        "Backspace" => Ok(KeyCode::Backspace),
        "Tab" => Ok(KeyCode::Tab),
        "Space" | " " => Ok(KeyCode::Char(' ')),
        "Left" => Ok(KeyCode::Left),
        "Right" => Ok(KeyCode::Right),
        "Up" => Ok(KeyCode::Up),
        "Down" => Ok(KeyCode::Down),
        "Home" => Ok(KeyCode::Home),
        "End" => Ok(KeyCode::End),
        "PageUp" => Ok(KeyCode::PageUp),
        "PageDown" => Ok(KeyCode::PageDown),
        "Delete" => Ok(KeyCode::Delete),
        _ => {
            if let Some(n) = key_str.strip_prefix('F').and_then(|n| n.parse::<u8>().ok()) {
                if (1..=12).contains(&n) {
                    return Ok(KeyCode::F(n));
                }
            }
            let mut chars = key_str.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(KeyCode::Char(c)),
                _ => Err(format!("Unknown key binding: {}", key_str)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_special_and_ctrl_bindings() {
        assert_eq!(parse_key_binding("q").unwrap().key_code, KeyCode::Char('q'));
        assert_eq!(parse_key_binding("[").unwrap().key_code, KeyCode::Char('['));
        assert_eq!(parse_key_binding("Space").unwrap().key_code, KeyCode::Char(' '));
        assert_eq!(parse_key_binding("F12").unwrap().key_code, KeyCode::F(12));

        let save = parse_key_binding("Ctrl+s").unwrap();
        assert!(save.requires_ctrl);
        assert_eq!(save.key_code, KeyCode::Char('s'));

        assert!(parse_key_binding("F13").is_err());
        assert!(parse_key_binding("Hyper").is_err());
    }

    #[test]
    fn binding_requires_matching_modifier() {
        let save = parse_key_binding("Ctrl+s").unwrap();
        let plain = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::NONE);
        let ctrl = KeyEvent::new(KeyCode::Char('s'), KeyModifiers::CONTROL);
        assert!(!save.matches(&plain));
        assert!(save.matches(&ctrl));
    }

    #[test]
    fn dates_parse_and_format() {
        let day = parse_date(" 2024-06-14 ").unwrap();
        assert_eq!(format_long_date(day), "Friday, June 14, 2024");
        assert!(parse_date("14/06/2024").is_err());
    }

    #[test]
    fn tilde_expands_to_home() {
        let expanded = expand_path("~/worklog.db");
        assert!(expanded.ends_with("worklog.db"));
        assert_eq!(expand_path("/tmp/x.db"), PathBuf::from("/tmp/x.db"));
    }
}
