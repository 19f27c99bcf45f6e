use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::store::FirestoreConfig;
use crate::summary::GeminiConfig;
use crate::utils;

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Where tasks and reports are persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Firestore,
    Local,
}

// Plain values come before tables so the file serializes cleanly
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: Backend,
    /// SQLite file used by the local backend
    #[serde(default)]
    pub database_path: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    /// Absent in files written before versioning; upgraded on load
    #[serde(default)]
    pub config_version: Option<u32>,
    #[serde(default)]
    pub firestore: FirestoreConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub key_bindings: KeyBindings,
    #[serde(default)]
    pub themes: HashMap<String, Theme>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_quit")]
    pub quit: String,
    #[serde(default = "default_new")]
    pub new: String,
    #[serde(default = "default_edit")]
    pub edit: String,
    #[serde(default = "default_save")]
    pub save: String,
    #[serde(default = "default_delete")]
    pub delete: String,
    #[serde(default = "default_list_up")]
    pub list_up: String,
    #[serde(default = "default_list_down")]
    pub list_down: String,
    #[serde(default = "default_column_left")]
    pub column_left: String,
    #[serde(default = "default_column_right")]
    pub column_right: String,
    #[serde(default = "default_advance_status")]
    pub advance_status: String,
    #[serde(default = "default_retreat_status")]
    pub retreat_status: String,
    #[serde(default = "default_previous_day")]
    pub previous_day: String,
    #[serde(default = "default_next_day")]
    pub next_day: String,
    #[serde(default = "default_today")]
    pub today: String,
    #[serde(default = "default_generate_report")]
    pub generate_report: String,
    #[serde(default = "default_view_report")]
    pub view_report: String,
    #[serde(default = "default_help")]
    pub help: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_fg")]
    pub fg: String,
    #[serde(default = "default_bg")]
    pub bg: String,
    #[serde(default = "default_highlight_bg")]
    pub highlight_bg: String,
    #[serde(default = "default_highlight_fg")]
    pub highlight_fg: String,
    #[serde(default = "default_accent")]
    pub accent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            database_path: default_database_path(),
            log_level: default_log_level(),
            theme: default_theme(),
            config_version: Some(CURRENT_CONFIG_VERSION),
            firestore: FirestoreConfig::default(),
            gemini: GeminiConfig::default(),
            key_bindings: KeyBindings::default(),
            themes: HashMap::new(),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: default_quit(),
            new: default_new(),
            edit: default_edit(),
            save: default_save(),
            delete: default_delete(),
            list_up: default_list_up(),
            list_down: default_list_down(),
            column_left: default_column_left(),
            column_right: default_column_right(),
            advance_status: default_advance_status(),
            retreat_status: default_retreat_status(),
            previous_day: default_previous_day(),
            next_day: default_next_day(),
            today: default_today(),
            generate_report: default_generate_report(),
            view_report: default_view_report(),
            help: default_help(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: default_fg(),
            bg: default_bg(),
            highlight_bg: default_highlight_bg(),
            highlight_fg: default_highlight_fg(),
            accent: default_accent(),
        }
    }
}

impl Theme {
    /// Get preset themes that are always available
    pub fn get_preset_themes() -> HashMap<String, Theme> {
        let mut themes = HashMap::new();

        themes.insert("default".to_string(), Theme::default());

        themes.insert("dark".to_string(), Theme {
            fg: "white".to_string(),
            bg: "black".to_string(),
            highlight_bg: "cyan".to_string(),
            highlight_fg: "black".to_string(),
            accent: "magenta".to_string(),
        });

        themes.insert("light".to_string(), Theme {
            fg: "black".to_string(),
            bg: "white".to_string(),
            highlight_bg: "blue".to_string(),
            highlight_fg: "white".to_string(),
            accent: "#4f46e5".to_string(),
        });

        themes.insert("monochrome".to_string(), Theme {
            fg: "white".to_string(),
            bg: "black".to_string(),
            highlight_bg: "white".to_string(),
            highlight_fg: String::new(),
            accent: "gray".to_string(),
        });

        themes
    }
}

// Default value functions
fn default_database_path() -> String {
    Config::default_database_path_for_profile(utils::Profile::Prod)
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_theme() -> String {
    "default".to_string()
}

fn default_quit() -> String {
    "q".to_string()
}

fn default_new() -> String {
    "n".to_string()
}

fn default_edit() -> String {
    "e".to_string()
}

fn default_save() -> String {
    "Ctrl+s".to_string()
}

fn default_delete() -> String {
    "d".to_string()
}

fn default_list_up() -> String {
    "k".to_string()
}

fn default_list_down() -> String {
    "j".to_string()
}

fn default_column_left() -> String {
    "h".to_string()
}

fn default_column_right() -> String {
    "l".to_string()
}

fn default_advance_status() -> String {
    "Space".to_string()
}

fn default_retreat_status() -> String {
    "Backspace".to_string()
}

fn default_previous_day() -> String {
    "[".to_string()
}

fn default_next_day() -> String {
    "]".to_string()
}

fn default_today() -> String {
    "t".to_string()
}

fn default_generate_report() -> String {
    "g".to_string()
}

fn default_view_report() -> String {
    "r".to_string()
}

fn default_help() -> String {
    "F1".to_string()
}

fn default_fg() -> String {
    "white".to_string()
}

fn default_bg() -> String {
    "black".to_string()
}

fn default_highlight_bg() -> String {
    "blue".to_string()
}

fn default_highlight_fg() -> String {
    "white".to_string()
}

fn default_accent() -> String {
    "#6366f1".to_string()
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
}

impl Config {
    /// Load configuration from the profile's config dir, or create default if missing
    pub fn load_with_profile(profile: utils::Profile) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(profile)?;
        Self::load_from(&config_path, profile)
    }

    /// Load configuration from an explicit path, or create default there if missing
    pub fn load_from(config_path: &Path, profile: utils::Profile) -> Result<Self, ConfigError> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)
                .map_err(|e| ConfigError::ReadError(e.to_string()))?;
            let mut config: Config = toml::from_str(&contents)?;

            if config.database_path.trim().is_empty() {
                config.database_path = Self::default_database_path_for_profile(profile);
            }

            // Older files gain any new keys with their defaults
            if config.config_version != Some(CURRENT_CONFIG_VERSION) {
                log::info!(
                    "event=config_upgrade from={:?} to={} path={}",
                    config.config_version,
                    CURRENT_CONFIG_VERSION,
                    config_path.display()
                );
                config.config_version = Some(CURRENT_CONFIG_VERSION);
                config.save_to(config_path)?;
            }

            Ok(config)
        } else {
            let config = Config {
                database_path: Self::default_database_path_for_profile(profile),
                ..Config::default()
            };
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    /// Save configuration to file
    pub fn save_to(&self, config_path: &Path) -> Result<(), ConfigError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;

        fs::write(config_path, toml_string)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile)
            .ok_or_else(|| ConfigError::ConfigDirError("Could not determine config directory".to_string()))?;
        Ok(config_dir.join("config.toml"))
    }

    /// Get default database path for a specific profile
    fn default_database_path_for_profile(profile: utils::Profile) -> String {
        if let Some(data_dir) = utils::get_data_dir(profile) {
            data_dir.join("worklog.db").to_string_lossy().to_string()
        } else {
            match profile {
                utils::Profile::Dev => "~/.local/share/worklog-dev/worklog.db".to_string(),
                utils::Profile::Prod => "~/.local/share/worklog/worklog.db".to_string(),
            }
        }
    }

    /// Get the expanded database path (with ~ expansion)
    pub fn get_database_path(&self) -> PathBuf {
        utils::expand_path(&self.database_path)
    }

    /// Get the currently active theme
    /// If highlight_fg is empty, it is derived from highlight_bg
    pub fn get_active_theme(&self) -> Theme {
        use crate::tui::theme::{format_color_for_display, get_contrast_text_color, parse_color};

        let mut theme = self
            .themes
            .get(&self.theme)
            .cloned()
            .or_else(|| Theme::get_preset_themes().remove(&self.theme))
            .unwrap_or_default();

        if theme.highlight_fg.is_empty() {
            let calculated_fg = get_contrast_text_color(parse_color(&theme.highlight_bg));
            theme.highlight_fg = format_color_for_display(&calculated_fg);
        }

        theme
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_in_defaults() {
        let config: Config = toml::from_str(
            r#"
            backend = "local"

            [firestore]
            project_id = "demo"

            [key_bindings]
            quit = "Ctrl+q"
            "#,
        )
        .unwrap();

        assert_eq!(config.backend, Backend::Local);
        assert_eq!(config.firestore.project_id, "demo");
        assert_eq!(config.firestore.database, "(default)");
        assert_eq!(config.gemini.model, "gemini-3-flash-preview");
        assert_eq!(config.key_bindings.quit, "Ctrl+q");
        assert_eq!(config.key_bindings.new, "n");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn unknown_backend_is_rejected() {
        let parsed: Result<Config, _> = toml::from_str("backend = \"postgres\"");
        assert!(parsed.is_err());
    }

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let created = Config::load_from(&path, utils::Profile::Dev).unwrap();
        assert!(path.exists());
        assert_eq!(created.backend, Backend::Firestore);

        let reloaded = Config::load_from(&path, utils::Profile::Dev).unwrap();
        assert_eq!(reloaded.database_path, created.database_path);
        assert_eq!(reloaded.gemini, created.gemini);
    }

    #[test]
    fn unversioned_file_is_upgraded_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "backend = \"local\"\ndatabase_path = \"/tmp/worklog.db\"\n").unwrap();

        let config = Config::load_from(&path, utils::Profile::Dev).unwrap();
        assert_eq!(config.config_version, Some(CURRENT_CONFIG_VERSION));
        assert_eq!(config.database_path, "/tmp/worklog.db");

        let rewritten = fs::read_to_string(&path).unwrap();
        assert!(rewritten.contains("config_version = 1"));
        assert!(rewritten.contains("[key_bindings]"));
        let reloaded: Config = toml::from_str(&rewritten).unwrap();
        assert_eq!(reloaded.backend, Backend::Local);
    }

    #[test]
    fn current_file_is_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let contents = "config_version = 1\nbackend = \"local\"\n";
        fs::write(&path, contents).unwrap();

        Config::load_from(&path, utils::Profile::Dev).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), contents);
    }

    #[test]
    fn monochrome_theme_derives_highlight_text() {
        let config = Config {
            theme: "monochrome".to_string(),
            ..Config::default()
        };
        let theme = config.get_active_theme();
        assert!(!theme.highlight_fg.is_empty());
        assert_eq!(theme.highlight_bg, "white");
    }

    #[test]
    fn unknown_theme_falls_back_to_default() {
        let config = Config {
            theme: "nope".to_string(),
            ..Config::default()
        };
        assert_eq!(config.get_active_theme().highlight_bg, "blue");
    }
}
