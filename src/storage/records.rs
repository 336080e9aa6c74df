//! Record files
//!
//! A record lives in a single JSON, YAML or TOML document; the format follows
//! the file extension. Reads take a shared lock, writes go to a locked temp
//! file that is renamed over the original.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Unsupported record file '{0}': expected .json, .yaml, .yml or .toml")]
    UnknownFormat(PathBuf),

    #[error("Invalid {format} document: {message}")]
    Decode {
        format: RecordFormat,
        message: String,
    },

    #[error("Cannot encode record as {format}: {message}")]
    Encode {
        format: RecordFormat,
        message: String,
    },
}

/// Document format of a record file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Json,
    Yaml,
    Toml,
}

impl RecordFormat {
    pub fn from_path(path: &Path) -> Result<Self, RecordError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("json") => Ok(RecordFormat::Json),
            Some("yaml") | Some("yml") => Ok(RecordFormat::Yaml),
            Some("toml") => Ok(RecordFormat::Toml),
            _ => Err(RecordError::UnknownFormat(path.to_path_buf())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordFormat::Json => "json",
            RecordFormat::Yaml => "yaml",
            RecordFormat::Toml => "toml",
        }
    }

    pub fn decode<R: DeserializeOwned>(&self, content: &str) -> Result<R, RecordError> {
        let decoded = match self {
            RecordFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            RecordFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
            RecordFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
        };
        decoded.map_err(|message| RecordError::Decode {
            format: *self,
            message,
        })
    }

    pub fn encode<R: Serialize>(&self, record: &R) -> Result<String, RecordError> {
        let encoded = match self {
            RecordFormat::Json => serde_json::to_string_pretty(record)
                .map(|json| json + "\n")
                .map_err(|e| e.to_string()),
            RecordFormat::Yaml => serde_yaml::to_string(record).map_err(|e| e.to_string()),
            RecordFormat::Toml => toml::to_string_pretty(record).map_err(|e| e.to_string()),
        };
        encoded.map_err(|message| RecordError::Encode {
            format: *self,
            message,
        })
    }
}

impl fmt::Display for RecordFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One record stored in one file
#[derive(Debug, Clone)]
pub struct RecordFile {
    path: PathBuf,
    format: RecordFormat,
}

impl RecordFile {
    /// Opens a record file, choosing the format from its extension
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, RecordError> {
        let path = path.into();
        let format = RecordFormat::from_path(&path)?;
        Ok(Self { path, format })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> RecordFormat {
        self.format
    }

    /// Reads and decodes the record
    pub fn load<R: DeserializeOwned>(&self) -> Result<R> {
        let mut file = File::open(&self.path)
            .with_context(|| format!("Failed to open record: {}", self.path.display()))?;

        // Acquire shared lock for reading
        file.lock_shared()
            .context("Failed to acquire read lock on record")?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .with_context(|| format!("Failed to read record: {}", self.path.display()))?;

        let record = self
            .format
            .decode(&content)
            .with_context(|| format!("Failed to parse record: {}", self.path.display()))?;

        tracing::debug!(path = %self.path.display(), format = %self.format, "record loaded");
        Ok(record)
    }

    /// Encodes and atomically replaces the record
    pub fn save<R: Serialize>(&self, record: &R) -> Result<()> {
        let content = self
            .format
            .encode(record)
            .with_context(|| format!("Failed to serialize record: {}", self.path.display()))?;

        // Ensure parent directory exists
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let temp_path = self.temp_path();
        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            // Acquire exclusive lock
            file.lock_exclusive()
                .context("Failed to acquire write lock on record")?;

            let mut writer = BufWriter::new(&file);
            writer
                .write_all(content.as_bytes())
                .context("Failed to write record")?;
            writer.flush().context("Failed to flush record")?;
        }

        // Atomic rename
        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        tracing::debug!(path = %self.path.display(), format = %self.format, "record saved");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::SecretText;
    use crate::model::{Address, Person, User};
    use tempfile::TempDir;

    #[test]
    fn format_from_extension() {
        assert_eq!(
            RecordFormat::from_path(Path::new("a.JSON")).unwrap(),
            RecordFormat::Json
        );
        assert_eq!(
            RecordFormat::from_path(Path::new("a.yml")).unwrap(),
            RecordFormat::Yaml
        );
        assert_eq!(
            RecordFormat::from_path(Path::new("dir/a.toml")).unwrap(),
            RecordFormat::Toml
        );
        assert!(matches!(
            RecordFormat::from_path(Path::new("a.txt")),
            Err(RecordError::UnknownFormat(_))
        ));
        assert!(RecordFile::new("noext").is_err());
    }

    #[test]
    fn save_and_load_in_every_format() {
        let dir = TempDir::new().unwrap();
        let address = Address::new("Hauptplatz 1", "Linz", "4020").with_country("AT");

        for name in ["a.json", "a.yaml", "a.toml"] {
            let file = RecordFile::new(dir.path().join(name)).unwrap();
            file.save(&address).unwrap();

            let loaded: Address = file.load().unwrap();
            assert_eq!(loaded, address, "format {}", file.format());
        }
    }

    #[test]
    fn nested_records_round_trip() {
        let dir = TempDir::new().unwrap();
        let file = RecordFile::new(dir.path().join("user.yaml")).unwrap();
        let mut person = Person::new("Ann", 30).with_tags(["admin"]);
        person.phones.insert("home".to_string(), "555-1234".to_string());
        let user = User::new("ann", "hunter2", person);

        file.save(&user).unwrap();
        let loaded: User = file.load().unwrap();

        assert_eq!(loaded, user);
        assert_eq!(loaded.password, SecretText::new("hunter2"));
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let file = RecordFile::new(dir.path().join("nested").join("p.json")).unwrap();

        file.save(&Person::new("Ann", 30)).unwrap();

        assert!(file.path().exists());
        assert!(!dir.path().join("nested").join("p.json.tmp").exists());
    }

    #[test]
    fn load_reports_parse_errors_with_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();

        let err = RecordFile::new(&path)
            .unwrap()
            .load::<Person>()
            .unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("Failed to parse record"));
        assert!(message.contains("Invalid json document"));
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let file = RecordFile::new(dir.path().join("missing.json")).unwrap();
        assert!(file.load::<Person>().is_err());
    }
}
