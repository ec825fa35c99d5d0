use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    Condensed,
    #[default]
    Comfy,
    Expanded,
}

impl DisplayMode {
    /// Upper bound on preview lines shown under the title.
    pub fn max_preview_lines(self) -> u32 {
        match self {
            Self::Condensed => 0,
            Self::Comfy => 1,
            Self::Expanded => 4,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Condensed => "condensed",
            Self::Comfy => "comfy",
            Self::Expanded => "expanded",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "condensed" => Some(Self::Condensed),
            "comfy" => Some(Self::Comfy),
            "expanded" => Some(Self::Expanded),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListMetrics {
    pub title_line_height: f32,
    pub vertical_padding: f32,
    pub line_height: f32,
    pub horizontal_padding: f32,
    pub glyph_width: f32,
    pub header_height: f32,
    pub tag_suggestion_height: f32,
    pub max_visible_tag_suggestions: usize,
}

impl ListMetrics {
    /// Height of a row with no preview lines: the title line plus padding.
    pub fn base_height(&self) -> f32 {
        self.title_line_height + self.vertical_padding
    }
}

impl Default for ListMetrics {
    fn default() -> Self {
        Self {
            title_line_height: 24.0,
            vertical_padding: 18.0,
            line_height: 21.0,
            horizontal_padding: 32.0,
            glyph_width: 8.0,
            header_height: 36.0,
            tag_suggestion_height: 32.0,
            max_visible_tag_suggestions: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebounceSettings {
    pub delay_ms: u64,
    pub max_wait_ms: u64,
}

impl DebounceSettings {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms.max(self.delay_ms))
    }
}

impl Default for DebounceSettings {
    fn default() -> Self {
        Self {
            delay_ms: 50,
            max_wait_ms: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub display_mode: DisplayMode,
    pub list: ListMetrics,
    pub debounce: DebounceSettings,
    pub poll_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            display_mode: DisplayMode::Comfy,
            list: ListMetrics::default(),
            debounce: DebounceSettings::default(),
            poll_interval_ms: 16,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read settings from {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write settings to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl Settings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// Loads settings from a JSON file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }

        let body = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, body).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}
