//! Small key-value store for state that outlives a run: the chosen theme and
//! the recently opened files. Stored as one JSON object in `state.json`.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::fs::try_exists;

use crate::config::Theme;
use crate::paths::normalize_path;

pub const THEME_KEY: &str = "theme";
pub const RECENT_FILES_KEY: &str = "recentFiles";
pub const MAX_RECENT_FILES: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentFile {
    pub path: PathBuf,
    pub opened_at: DateTime<Utc>,
}

pub struct PreferenceStore {
    file: Option<PathBuf>,
    values: Map<String, Value>,
}

impl PreferenceStore {
    /// A store that is never written to disk.
    pub fn in_memory() -> Self {
        Self {
            file: None,
            values: Map::new(),
        }
    }

    pub fn default_path() -> Result<PathBuf> {
        if let Ok(dir) = std::env::var("MDREADER_DATA_DIR") {
            return Ok(PathBuf::from(dir).join("state.json"));
        }
        let dirs = directories::ProjectDirs::from("com", "mdreader", "mdreader")
            .ok_or_else(|| anyhow::anyhow!("Could not determine the data directory"))?;
        Ok(dirs.data_dir().join("state.json"))
    }

    /// Read the store from `file`. A missing or unreadable file yields an
    /// empty store bound to the same path.
    pub async fn load(file: PathBuf) -> Self {
        let values = match Self::read_values(&file).await {
            Ok(values) => values,
            Err(e) => {
                log::warn!("Ignoring preferences at {}: {}", file.display(), e);
                Map::new()
            }
        };
        Self {
            file: Some(file),
            values,
        }
    }

    async fn read_values(file: &Path) -> Result<Map<String, Value>> {
        if !try_exists(file).await? {
            return Ok(Map::new());
        }
        let json = fs::read_to_string(file).await?;
        if json.trim().is_empty() {
            return Ok(Map::new());
        }
        match serde_json::from_str::<Value>(&json)? {
            Value::Object(map) => Ok(map),
            _ => Err(anyhow::anyhow!("expected a JSON object")),
        }
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    pub async fn flush(&self) -> Result<()> {
        let Some(file) = &self.file else {
            return Ok(());
        };
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        fs::write(file, json).await?;
        log::debug!("Preferences written to {}", file.display());
        Ok(())
    }

    pub fn theme(&self) -> Option<Theme> {
        self.get(THEME_KEY).and_then(Value::as_str).and_then(Theme::parse)
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.set(THEME_KEY, Value::String(theme.as_str().to_string()));
    }

    /// Recent files, most recently opened first. Malformed entries are skipped.
    pub fn recent_files(&self) -> Vec<RecentFile> {
        match self.get(RECENT_FILES_KEY) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Move `path` to the front of the recent list, dropping older duplicates
    /// and anything past the cap.
    pub fn add_recent_file(&mut self, path: &Path, opened_at: DateTime<Utc>) {
        let path = normalize_path(path);
        let mut recent = self.recent_files();
        recent.retain(|entry| normalize_path(&entry.path) != path);
        recent.insert(0, RecentFile { path, opened_at });
        recent.truncate(MAX_RECENT_FILES);

        match serde_json::to_value(&recent) {
            Ok(value) => self.set(RECENT_FILES_KEY, value),
            Err(e) => log::error!("Failed to serialize recent files: {}", e),
        }
    }
}

impl Default for PreferenceStore {
    fn default() -> Self {
        Self::in_memory()
    }
}
