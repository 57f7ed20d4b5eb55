use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::form::FieldId;

/// Hex colour overrides, e.g. `accent = "#FFC107"`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ThemeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub danger: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_dim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inactive: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bg_selected: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Prefix for draft keys in the local store
    pub draft_prefix: String,

    /// Below this viewport width (logical px) the panel toggles stack
    pub breakpoint_px: u32,

    /// Logical px per terminal column
    pub cell_width_px: u32,

    /// How long a notification stays up
    pub notification_secs: u64,

    /// Delay before the first create field takes focus
    pub focus_delay_ms: u64,

    /// Delay before drafts are dropped after a create submission
    pub draft_clear_delay_ms: u64,

    /// Also raise the post-create notice as a desktop notification
    pub desktop_notifications: bool,

    /// Character counters: field id -> maximum length
    pub counters: BTreeMap<String, usize>,

    /// Draft store file (defaults to the user data dir)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<PathBuf>,

    pub theme: ThemeConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let counters = [("itemName", 100), ("quantity", 50), ("contact", 200)]
            .into_iter()
            .map(|(id, max)| (id.to_string(), max))
            .collect();

        Self {
            draft_prefix: "foodbridge_".to_string(),
            breakpoint_px: 768,
            cell_width_px: 8,
            notification_secs: 5,
            focus_delay_ms: 100,
            draft_clear_delay_ms: 1000,
            desktop_notifications: false,
            counters,
            storage_path: None,
            theme: ThemeConfig::default(),
        }
    }
}

impl AppConfig {
    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("foodbridge");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from the default location, or create it with defaults
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Ok(path) => Self::load_from(&path),
            Err(_) => Ok(AppConfig::default()),
        }
    }

    /// Load config from a file. A missing file is created with defaults,
    /// an unreadable or invalid one falls back to defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str::<AppConfig>(&content) {
                    Ok(mut config) => {
                        config.drop_invalid_counters();
                        return Ok(config);
                    }
                    Err(e) => tracing::warn!("Failed to parse config {}: {}", path.display(), e),
                },
                Err(e) => tracing::warn!("Failed to read config {}: {}", path.display(), e),
            }
            return Ok(AppConfig::default());
        }

        let config = AppConfig::default();
        if let Err(e) = config.save_to(path) {
            tracing::warn!("Could not write default config: {}", e);
        }
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let mut clean_config = self.clone();
        clean_config.drop_invalid_counters();

        let content = toml::to_string_pretty(&clean_config)?;
        std::fs::write(path, content)
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    /// Counters with no matching field or a zero maximum can never attach
    fn drop_invalid_counters(&mut self) {
        self.counters.retain(|id, max| {
            let keep = *max > 0 && FieldId::from_element_id(id).is_some();
            if !keep {
                tracing::warn!("Ignoring character counter {} = {}", id, max);
            }
            keep
        });
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_secs(self.notification_secs)
    }

    pub fn focus_delay(&self) -> Duration {
        Duration::from_millis(self.focus_delay_ms)
    }

    pub fn draft_clear_delay(&self) -> Duration {
        Duration::from_millis(self.draft_clear_delay_ms)
    }

    /// Viewport width in logical px for a terminal width in columns
    pub fn viewport_px(&self, columns: u16) -> u32 {
        u32::from(columns) * self.cell_width_px
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let mut config = AppConfig::default();
        config.desktop_notifications = true;
        config.theme.accent = Some("#FFC107".to_string());

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&serialized).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: AppConfig = toml::from_str("breakpoint_px = 1024\n").unwrap();
        assert_eq!(config.breakpoint_px, 1024);
        assert_eq!(config.draft_prefix, "foodbridge_");
        assert_eq!(config.counters.get("itemName"), Some(&100));
    }

    #[test]
    fn test_missing_file_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "breakpoint_px = \"wide\"").unwrap();

        assert_eq!(AppConfig::load_from(&path).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_save_drops_unknown_counters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = AppConfig::default();
        config.counters.insert("notes".to_string(), 500);
        config.counters.insert("quantity".to_string(), 0);

        config.save_to(&path).unwrap();
        let saved = AppConfig::load_from(&path).unwrap();
        assert!(!saved.counters.contains_key("notes"));
        assert!(!saved.counters.contains_key("quantity"));
        assert_eq!(saved.counters.get("contact"), Some(&200));
    }

    #[test]
    fn test_load_drops_invalid_counters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[counters]\nitemName = 9223372036854775807\nquantity = 0\nnotes = 40\n",
        )
        .unwrap();

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.counters.get("itemName"), Some(&9223372036854775807));
        assert!(!config.counters.contains_key("quantity"));
        assert!(!config.counters.contains_key("notes"));
    }

    #[test]
    fn test_viewport_px() {
        let config = AppConfig::default();
        assert_eq!(config.viewport_px(95), 760);
        assert_eq!(config.viewport_px(96), 768);
    }
}
