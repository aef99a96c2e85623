//! TOML-based quiz configuration.
//!
//! Stores the presentation and behaviour settings an author picks:
//! - Appearance (classic or chat), animation, progress bar
//! - Review, title screen and delegation flags
//! - Result screen content and animation
//!
//! Configuration is stored at `~/.config/profilequiz/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::error::ConfigError;
use crate::quiz::Appearance;

/// How the result screen is revealed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResultAnimation {
    #[default]
    None,
    FadeIn,
    /// Wheel of fortune spinning to the winner.
    Wheel,
}

/// Visual configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisualConfig {
    #[serde(default)]
    pub appearance: Appearance,
    #[serde(default = "default_true")]
    pub is_animation_on: bool,
    #[serde(default = "default_true")]
    pub show_progress_bar: bool,
}

/// Behaviour configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BehaviourConfig {
    /// Offer "previous" and "review" (classic appearance only).
    #[serde(default)]
    pub allow_review: bool,
    /// A parent content shows the result; the quiz stops after resolving.
    #[serde(default)]
    pub delegate_results: bool,
    /// A parent content calls `run` itself; construction does not reset.
    #[serde(default)]
    pub delegate_run: bool,
    #[serde(default)]
    pub show_title_screen: bool,
    /// Seed for reproducible tie-breaks.
    #[serde(default)]
    pub tie_break_seed: Option<u64>,
}

/// Result screen configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultScreenConfig {
    #[serde(default)]
    pub animation: ResultAnimation,
    #[serde(default = "default_true")]
    pub display_title: bool,
    #[serde(default = "default_true")]
    pub display_description: bool,
    #[serde(default)]
    pub display_options_chosen: bool,
    #[serde(default = "default_export_title")]
    pub export_title: String,
}

/// Quiz configuration.
///
/// Serialized to/from TOML at `~/.config/profilequiz/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizConfig {
    #[serde(default)]
    pub visual: VisualConfig,
    #[serde(default)]
    pub behaviour: BehaviourConfig,
    #[serde(default)]
    pub result_screen: ResultScreenConfig,
}

// Default functions
fn default_true() -> bool {
    true
}
fn default_export_title() -> String {
    "Profile configurator results".into()
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            appearance: Appearance::Classic,
            is_animation_on: true,
            show_progress_bar: true,
        }
    }
}

impl Default for ResultScreenConfig {
    fn default() -> Self {
        Self {
            animation: ResultAnimation::None,
            display_title: true,
            display_description: true,
            display_options_chosen: false,
            export_title: default_export_title(),
        }
    }
}

impl QuizConfig {
    pub fn appearance(&self) -> Appearance {
        self.visual.appearance
    }

    /// Review needs free back-and-forth movement, so chat never allows it.
    pub fn allow_review(&self) -> bool {
        self.behaviour.allow_review && self.visual.appearance == Appearance::Classic
    }

    /// Result animation, forced to `None` when animation is switched off.
    pub fn result_animation(&self) -> ResultAnimation {
        if self.visual.is_animation_on {
            self.result_screen.animation
        } else {
            ResultAnimation::None
        }
    }

    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map(|part| part.is_empty()).unwrap_or(true) {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current
                    .as_object_mut()
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
                let existing = obj
                    .get(part)
                    .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

                let clears = value.is_empty() || value == "none";
                let new_value = match existing {
                    // Non-optional fields reject null when deserialized
                    serde_json::Value::Bool(_) | serde_json::Value::Number(_) if clears => {
                        serde_json::Value::Null
                    }
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| invalid(format!("cannot parse '{value}' as number")))?,
                    // Unset optionals take whatever the text looks like
                    serde_json::Value::Null => {
                        if clears {
                            serde_json::Value::Null
                        } else if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(b) = value.parse::<bool>() {
                            serde_json::Value::Bool(b)
                        } else {
                            serde_json::Value::String(value.into())
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    serde_json::Value::String(_) => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current
                .get_mut(part)
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        }

        Err(ConfigError::UnknownKey(key.to_string()))
    }

    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from a specific file, writing defaults there if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit it.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.apply(key, value)?;
        self.save()
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
