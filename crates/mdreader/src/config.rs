use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs::try_exists;

pub const MIN_AUTOSAVE_INTERVAL_MS: u64 = 1_000;
pub const MAX_AUTOSAVE_INTERVAL_MS: u64 = 3_600_000;
pub const DEFAULT_AUTOSAVE_INTERVAL_MS: u64 = 30_000;

const DEFAULT_DARK_SYNTAX_THEME: &str = "base16-ocean.dark";
const DEFAULT_LIGHT_SYNTAX_THEME: &str = "InspiredGitHub";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub autosave: AutosaveConfig,
    pub preview: PreviewConfig,
    #[serde(default)]
    pub view_mode: ViewMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutosaveConfig {
    pub enabled: bool,
    pub interval_ms: u64,
}

impl AutosaveConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    pub dark_syntax_theme: String,
    pub light_syntax_theme: String,
}

impl PreviewConfig {
    pub fn syntax_theme(&self, theme: Theme) -> &str {
        match theme {
            Theme::Dark => &self.dark_syntax_theme,
            Theme::Light => &self.light_syntax_theme,
        }
    }
}

/// Color scheme of the whole window; persisted as `"dark"` / `"light"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Dark => "Dark",
            Theme::Light => "Light",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }
}

/// Which panes are visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewMode {
    #[default]
    Split,
    Editor,
    Preview,
}

impl ViewMode {
    pub fn next(self) -> Self {
        match self {
            ViewMode::Split => ViewMode::Editor,
            ViewMode::Editor => ViewMode::Preview,
            ViewMode::Preview => ViewMode::Split,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewMode::Split => "Split",
            ViewMode::Editor => "Editor Only",
            ViewMode::Preview => "Preview Only",
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            autosave: AutosaveConfig {
                enabled: true,
                interval_ms: DEFAULT_AUTOSAVE_INTERVAL_MS,
            },
            preview: PreviewConfig {
                dark_syntax_theme: String::from(DEFAULT_DARK_SYNTAX_THEME),
                light_syntax_theme: String::from(DEFAULT_LIGHT_SYNTAX_THEME),
            },
            view_mode: ViewMode::Split,
        }
    }
}

impl Config {
    pub async fn load() -> Result<Self> {
        Self::load_from(Self::config_path()).await
    }

    pub async fn save(&self) -> Result<()> {
        self.save_to(Self::config_path()).await
    }

    pub async fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        if let Some(config_path) = config_path.clone() {
            if try_exists(&config_path).await? {
                match tokio::fs::read_to_string(&config_path).await {
                    Ok(content) => {
                        if content.trim().is_empty() {
                            log::warn!("Config file is empty, creating new one");
                            let default_config = Self::default();
                            let _ = default_config.save_to(Some(config_path)).await;
                            return Ok(default_config);
                        }

                        match serde_json::from_str::<Self>(&content) {
                            Ok(mut config) => {
                                config.validate()?;
                                log::info!(
                                    "Successfully loaded config from: {}",
                                    config_path.display()
                                );
                                return Ok(config);
                            }
                            Err(json_err) => {
                                log::error!("Failed to parse config file: {}", json_err);

                                let backup_path = config_path.with_extension("bak");
                                if let Err(e) = tokio::fs::copy(&config_path, &backup_path).await {
                                    log::warn!("Failed to backup broken config: {}", e);
                                } else {
                                    log::info!(
                                        "Backed up broken config to: {}",
                                        backup_path.display()
                                    );
                                }

                                let default_config = Self::default();
                                let _ = default_config.save_to(Some(config_path)).await;
                                return Ok(default_config);
                            }
                        }
                    }
                    Err(io_err) => {
                        log::error!("Failed to read config file: {}", io_err);
                    }
                }
            } else {
                log::info!("Config file does not exist, creating default");
            }
        }

        let default_config = Self::default();
        let _ = default_config.save_to(config_path).await;
        Ok(default_config)
    }

    pub async fn save_to(&self, config_path: Option<PathBuf>) -> Result<()> {
        if let Some(config_path) = config_path {
            let mut config_to_save = self.clone();
            config_to_save.validate()?;

            if let Some(parent) = config_path.parent() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    anyhow::anyhow!(
                        "Failed to create config directory: {} - {}",
                        parent.display(),
                        e
                    )
                })?;
            }

            let content = serde_json::to_string_pretty(&config_to_save)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            tokio::fs::write(&config_path, content).await.map_err(|e| {
                anyhow::anyhow!(
                    "Failed to write config file: {} - {}",
                    config_path.display(),
                    e
                )
            })?;
            log::info!("Successfully saved config to: {}", config_path.display());
        }
        Ok(())
    }

    /// Validate configuration values and fix invalid ones
    pub fn validate(&mut self) -> Result<()> {
        let mut has_issues = false;

        let interval = self.autosave.interval_ms;
        if !(MIN_AUTOSAVE_INTERVAL_MS..=MAX_AUTOSAVE_INTERVAL_MS).contains(&interval) {
            let clamped = interval.clamp(MIN_AUTOSAVE_INTERVAL_MS, MAX_AUTOSAVE_INTERVAL_MS);
            log::warn!(
                "Autosave interval {}ms out of range, using {}ms",
                interval,
                clamped
            );
            self.autosave.interval_ms = clamped;
            has_issues = true;
        }

        if self.preview.dark_syntax_theme.trim().is_empty() {
            log::warn!("Empty dark syntax theme, using default");
            self.preview.dark_syntax_theme = DEFAULT_DARK_SYNTAX_THEME.to_string();
            has_issues = true;
        }

        if self.preview.light_syntax_theme.trim().is_empty() {
            log::warn!("Empty light syntax theme, using default");
            self.preview.light_syntax_theme = DEFAULT_LIGHT_SYNTAX_THEME.to_string();
            has_issues = true;
        }

        if has_issues {
            log::info!("Configuration validation completed with corrections");
        }

        Ok(())
    }

    fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("MDREADER_CONFIG_PATH") {
            return Some(PathBuf::from(path));
        }

        if let Ok(dir) = std::env::var("MDREADER_CONFIG_DIR") {
            return Some(PathBuf::from(dir).join("config.json"));
        }

        ProjectDirs::from("com", "mdreader", "mdreader")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }
}
