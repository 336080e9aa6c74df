//! Configuration handling for mgraph
//!
//! Settings are layered: the global `config.toml` under the user's config
//! directory, then the nearest `mgraph.toml` found walking up from the
//! current directory. Keys in the project file win. An explicit `--config`
//! file replaces discovery entirely.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::EngineOptions;

/// File name of the project-level configuration
pub const PROJECT_FILE: &str = "mgraph.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Log line format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Output format for commands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// `[log]` section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset (e.g. `warn`, `model_graph=debug`)
    pub level: String,

    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Text,
        }
    }
}

/// `[output]` section
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format (text or json)
    pub format: OutputFormat,
}

/// Contents of a configuration file
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub engine: EngineOptions,
    pub log: LogConfig,
    pub output: OutputConfig,
}

impl Settings {
    fn validate(self) -> Result<Self, ConfigError> {
        if self.engine.max_depth == 0 {
            return Err(ConfigError::Invalid(
                "engine.max_depth must be at least 1".to_string(),
            ));
        }
        Ok(self)
    }
}

/// Effective configuration and the files it came from
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub settings: Settings,
    pub sources: Vec<PathBuf>,
}

impl Config {
    /// Loads configuration, from `explicit` alone when given
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_files(vec![path.to_path_buf()]);
        }

        let mut files = Vec::new();
        if let Some(dir) = Self::global_config_dir() {
            let global = dir.join("config.toml");
            if global.is_file() {
                files.push(global);
            }
        }
        if let Some(project) = std::env::current_dir()
            .ok()
            .and_then(|cwd| Self::find_project_file(&cwd))
        {
            files.push(project);
        }

        Self::from_files(files)
    }

    /// Layers the given files in order, later files overriding earlier ones
    pub fn from_files(files: Vec<PathBuf>) -> Result<Self> {
        let mut merged = toml::Table::new();
        for path in &files {
            overlay(&mut merged, read_table(path)?);
        }

        let settings: Settings = toml::Value::Table(merged)
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::Parse(e.to_string()))
            .context("Failed to parse configuration")?;
        let settings = settings.validate()?;

        tracing::debug!(sources = ?files, "configuration loaded");
        Ok(Self {
            settings,
            sources: files,
        })
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "model-graph", "mgraph").map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Finds the nearest `mgraph.toml` at or above `start`
    pub fn find_project_file(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            let candidate = current.join(PROJECT_FILE);
            if candidate.is_file() {
                return Some(candidate);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    pub fn engine_options(&self) -> EngineOptions {
        self.settings.engine
    }

    /// Writes settings to `path` as TOML
    pub fn save(settings: &Settings, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(settings).context("Failed to serialize configuration")?;

        fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))
    }
}

fn read_table(path: &Path) -> Result<toml::Table> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;

    toml::from_str(&content)
        .map_err(|e| ConfigError::Parse(e.to_string()))
        .with_context(|| format!("Failed to parse config: {}", path.display()))
}

/// Deep-merges `top` into `base`; tables merge key-wise, other values replace
fn overlay(base: &mut toml::Table, top: toml::Table) {
    for (key, value) in top {
        match value {
            toml::Value::Table(table) => match base.get_mut(&key) {
                Some(toml::Value::Table(existing)) => overlay(existing, table),
                _ => {
                    base.insert(key, toml::Value::Table(table));
                }
            },
            value => {
                base.insert(key, value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_settings() {
        let config = Config::default();

        assert_eq!(config.settings.engine.max_depth, 256);
        assert_eq!(config.settings.log.level, "warn");
        assert_eq!(config.settings.output.format, OutputFormat::Text);
        assert!(config.sources.is_empty());
    }

    #[test]
    fn parse_settings() {
        let toml = r#"
[engine]
max_depth = 32
strict_copy = true

[log]
format = "json"
"#;

        let settings: Settings = toml::from_str(toml).unwrap();
        assert_eq!(settings.engine.max_depth, 32);
        assert!(settings.engine.strict_copy);
        assert_eq!(settings.log.format, LogFormat::Json);
        assert_eq!(settings.log.level, "warn");
    }

    #[test]
    fn later_files_override_earlier_keys() {
        let dir = TempDir::new().unwrap();
        let global = dir.path().join("global.toml");
        let project = dir.path().join(PROJECT_FILE);
        fs::write(&global, "[engine]\nmax_depth = 10\nstrict_copy = true\n[output]\nformat = \"json\"\n").unwrap();
        fs::write(&project, "[engine]\nmax_depth = 20\n").unwrap();

        let config = Config::from_files(vec![global, project]).unwrap();

        assert_eq!(config.settings.engine.max_depth, 20);
        assert!(config.settings.engine.strict_copy);
        assert_eq!(config.settings.output.format, OutputFormat::Json);
        assert_eq!(config.sources.len(), 2);
    }

    #[test]
    fn find_project_file_walks_up() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(PROJECT_FILE), "").unwrap();
        let sub_dir = dir.path().join("sub").join("dir");
        fs::create_dir_all(&sub_dir).unwrap();

        let found = Config::find_project_file(&sub_dir);
        assert_eq!(found, Some(dir.path().join(PROJECT_FILE)));
    }

    #[test]
    fn explicit_file_is_used_alone() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[log]\nlevel = \"debug\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.settings.log.level, "debug");
        assert_eq!(config.sources, vec![path]);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");

        fs::write(&path, "[engine]\nmax_depth = 0\n").unwrap();
        assert!(Config::from_files(vec![path.clone()]).is_err());

        fs::write(&path, "[engine\n").unwrap();
        let err = Config::from_files(vec![path]).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config"));
    }

    #[test]
    fn save_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(PROJECT_FILE);
        let mut settings = Settings::default();
        settings.engine.strict_copy = true;

        Config::save(&settings, &path).unwrap();
        let loaded = Config::from_files(vec![path]).unwrap();
        assert_eq!(loaded.settings, settings);
    }
}
