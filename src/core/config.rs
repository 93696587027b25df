//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::Project;

/// Days before a deadline at which a process counts as approaching it
pub const DEFAULT_DEADLINE_WARNING_DAYS: i64 = 3;

/// Shop configuration with layered hierarchy
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default author for new processes and sign-offs
    pub author: Option<String>,

    /// Editor command for `shop proc edit`
    pub editor: Option<String>,

    /// Default output format
    pub default_format: Option<String>,

    /// Look-ahead window for `shop status` deadline warnings
    pub deadline_warning_days: Option<i64>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load_for(project: Option<&Project>) -> Self {
        let mut config = Config::default();

        // 1. Global user config (~/.config/shop/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 2. Project config (.shop/config.yaml)
        if let Some(project) = project {
            if let Some(project_config) = Self::read_file(&project.config_path()) {
                config.merge(project_config);
            }
        }

        // 3. Environment variables
        if let Ok(author) = std::env::var("SHOP_AUTHOR") {
            config.author = Some(author);
        }
        if let Ok(editor) = std::env::var("SHOP_EDITOR") {
            config.editor = Some(editor);
        }

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        // A file of comments only (as written by `shop init`) is an empty config
        let has_settings = contents.lines().any(|line| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        });
        if !has_settings {
            return Some(Config::default());
        }
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                None
            }
        }
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "shop")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.author.is_some() {
            self.author = other.author;
        }
        if other.editor.is_some() {
            self.editor = other.editor;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.deadline_warning_days.is_some() {
            self.deadline_warning_days = other.deadline_warning_days;
        }
    }

    /// Get the author name, falling back to git config or username
    pub fn author(&self) -> String {
        if let Some(ref author) = self.author {
            return author.clone();
        }

        // Try git config
        if let Ok(output) = std::process::Command::new("git")
            .args(["config", "user.name"])
            .output()
        {
            if output.status.success() {
                let name = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !name.is_empty() {
                    return name;
                }
            }
        }

        std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string())
    }

    pub fn deadline_warning_days(&self) -> i64 {
        self.deadline_warning_days
            .filter(|days| *days >= 0)
            .unwrap_or(DEFAULT_DEADLINE_WARNING_DAYS)
    }

    /// Get the editor command
    pub fn editor(&self) -> String {
        self.editor
            .clone()
            .or_else(|| std::env::var("EDITOR").ok())
            .or_else(|| std::env::var("VISUAL").ok())
            .unwrap_or_else(|| "vi".to_string())
    }

    /// Run the editor on a file, handling commands with arguments
    /// (e.g., "code --wait")
    pub fn run_editor(&self, file_path: &Path) -> std::io::Result<std::process::ExitStatus> {
        let editor = self.editor();
        let mut parts = editor.split_whitespace();
        let cmd = parts.next().unwrap_or("vi");

        std::process::Command::new(cmd)
            .args(parts)
            .arg(file_path)
            .status()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_later_layer() {
        let mut config = Config {
            author: Some("global".to_string()),
            deadline_warning_days: Some(7),
            ..Default::default()
        };
        config.merge(Config {
            author: Some("project".to_string()),
            ..Default::default()
        });
        assert_eq!(config.author.as_deref(), Some("project"));
        assert_eq!(config.deadline_warning_days(), 7);
    }

    #[test]
    fn test_deadline_warning_default() {
        let config = Config::default();
        assert_eq!(config.deadline_warning_days(), DEFAULT_DEADLINE_WARNING_DAYS);

        let negative = Config {
            deadline_warning_days: Some(-2),
            ..Default::default()
        };
        assert_eq!(negative.deadline_warning_days(), DEFAULT_DEADLINE_WARNING_DAYS);
    }

    #[test]
    fn test_comment_only_file_is_empty_config() {
        let tmp = tempfile::tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();

        let config = Config::read_file(&project.config_path()).unwrap();
        assert!(config.author.is_none());
        assert_eq!(config.deadline_warning_days(), DEFAULT_DEADLINE_WARNING_DAYS);
    }

    #[test]
    fn test_load_for_reads_given_project() {
        let tmp = tempfile::tempdir().unwrap();
        let project = Project::init(tmp.path()).unwrap();
        std::fs::write(project.config_path(), "deadline_warning_days: 9\neditor: nano\n").unwrap();

        let config = Config::load_for(Some(&project));
        assert_eq!(config.deadline_warning_days(), 9);
        if std::env::var("SHOP_EDITOR").is_err() {
            assert_eq!(config.editor.as_deref(), Some("nano"));
        }
    }

    #[test]
    fn test_parse_yaml() {
        let config: Config =
            serde_yml::from_str("author: coach\ndeadline_warning_days: 5\n").unwrap();
        assert_eq!(config.author.as_deref(), Some("coach"));
        assert_eq!(config.deadline_warning_days(), 5);
        assert!(config.editor.is_none());
    }
}
