use super::models::Settings;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

pub struct SettingsManager {
    config_path: PathBuf,
    settings: Arc<RwLock<Settings>>,
}

impl SettingsManager {
    pub fn new() -> Result<Self> {
        Ok(Self::with_path(Self::get_config_path()?))
    }

    /// Use a settings file at a custom location (`--config`).
    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            settings: Arc::new(RwLock::new(Settings::default())),
        }
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not find config directory")?;
        Ok(config_dir.join("xamin").join("settings.yaml"))
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub async fn load(&self) -> Result<()> {
        if !self.config_path.exists() {
            info!("No existing settings file found, using defaults");
            return Ok(());
        }

        let contents = tokio::fs::read_to_string(&self.config_path)
            .await
            .context("Failed to read settings file")?;

        let settings: Settings = if contents.trim().is_empty() {
            Settings::default()
        } else {
            serde_yaml::from_str(&contents).context("Failed to parse YAML settings")?
        };

        Self::validate(&settings);

        let mut current = self.settings.write().await;
        *current = settings;

        info!("Settings loaded from {:?}", self.config_path);
        Ok(())
    }

    pub async fn save(&self, settings: Settings) -> Result<()> {
        let yaml_string =
            serde_yaml::to_string(&settings).context("Failed to serialize settings to YAML")?;

        if let Some(parent) = self.config_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("Failed to create xamin config directory")?;
        }

        tokio::fs::write(&self.config_path, yaml_string)
            .await
            .context("Failed to write settings file")?;

        let mut current = self.settings.write().await;
        *current = settings;

        info!("Settings saved to {:?}", self.config_path);
        Ok(())
    }

    pub async fn get(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Warn about values that load fine but cannot take effect.
    fn validate(settings: &Settings) {
        if settings.entries.hint_size == 0 {
            warn!("entries.hint_size is 0: content sniffing will never match");
        }

        if settings.entries.delimiter_bytes().is_empty() {
            warn!(
                "entries.csv_delimiters '{}' has no usable delimiter, falling back to ','",
                settings.entries.csv_delimiters
            );
        }

        for (ext, kind) in &settings.entries.extensions {
            if ext.starts_with('.') {
                warn!(
                    "Extension override '{}' -> {} starts with a dot and will never match; write it as '{}'",
                    ext,
                    kind,
                    ext.trim_start_matches('.')
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn missing_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let manager = SettingsManager::with_path(dir.path().join("settings.yaml"));
        manager.load().await.unwrap();
        assert_eq!(manager.get().await.entries.hint_size, 2048);
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("settings.yaml");

        let manager = SettingsManager::with_path(&path);
        let mut settings = Settings::default();
        settings.entries.sniff_content = true;
        settings.activities.disabled.insert("hex-view".to_string());
        manager.save(settings).await.unwrap();

        let reloaded = SettingsManager::with_path(&path);
        reloaded.load().await.unwrap();
        let settings = reloaded.get().await;
        assert!(settings.entries.sniff_content);
        assert!(settings.activities.disabled.contains("hex-view"));
    }

    #[tokio::test]
    async fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(&path, "entries: [not, a, mapping]\n").unwrap();

        let manager = SettingsManager::with_path(&path);
        assert!(manager.load().await.is_err());
    }
}
