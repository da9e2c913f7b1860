//! Configuration manager for loading app configuration

use std::path::{Path, PathBuf};

use super::AppConfig;

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error while reading the file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Error during deserialization
    #[error("Deserialization error: {0}")]
    Deserialize(#[from] ron::error::SpannedError),
}

/// Configuration manager handles loading and accessing app configuration
pub struct ConfigManager {
    config: AppConfig,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a configuration manager, loading from the OS config directory
    pub fn new() -> Self {
        Self::with_path(Self::default_config_path())
    }

    /// Create a configuration manager reading `config_path`.
    /// Missing or invalid files fall back to defaults.
    pub fn with_path(config_path: PathBuf) -> Self {
        let config = match Self::load_from_path(&config_path) {
            Ok(config) => {
                tracing::info!("Loaded config from {:?}", config_path);
                config
            }
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file found, using defaults");
                AppConfig::new()
            }
            Err(e) => {
                tracing::warn!("Failed to load config file {:?}: {}", config_path, e);
                AppConfig::new()
            }
        };

        Self {
            config,
            config_path,
        }
    }

    /// Get the OS-standard configuration directory
    fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("model-viewer")
    }

    /// Get the default configuration file path
    pub fn default_config_path() -> PathBuf {
        Self::config_dir().join("config.ron")
    }

    /// Load configuration from a file path
    pub fn load_from_path(path: &Path) -> Result<AppConfig, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(ron::from_str(&content)?)
    }

    /// Get a reference to the current configuration
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get the config file path (for display purposes)
    pub fn config_file_path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_config(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "model-viewer-config-{}-{}",
            name,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.ron");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let manager = ConfigManager::with_path(PathBuf::from("/nonexistent/model-viewer/config.ron"));
        assert_eq!(manager.config(), &AppConfig::new());
        assert_eq!(manager.config().viewer.surface_fraction, 0.7);
        assert_eq!(manager.config().viewer.fov_degrees, 5.0);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let path = temp_config(
            "partial",
            r#"(version: 1, viewer: (asset: "models/card.glb", user_agent: Some("iPhone")))"#,
        );
        let manager = ConfigManager::with_path(path.clone());
        let viewer = &manager.config().viewer;
        assert_eq!(viewer.asset, "models/card.glb");
        assert_eq!(viewer.user_agent.as_deref(), Some("iPhone"));
        assert_eq!(viewer.far, 1000.0);
        assert_eq!(manager.config_file_path(), path.as_path());
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let path = temp_config("invalid", "(viewer: (surface_fraction: \"wide\"))");
        assert!(matches!(
            ConfigManager::load_from_path(&path),
            Err(ConfigError::Deserialize(_))
        ));
        let manager = ConfigManager::with_path(path);
        assert_eq!(manager.config(), &AppConfig::new());
    }
}
