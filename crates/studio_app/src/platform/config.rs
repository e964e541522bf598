use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const CONFIG_FILENAME: &str = "studio.ron";
/// Environment variable that overrides `base_url`.
pub const BASE_URL_ENV: &str = "STUDIO_BASE_URL";

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";
const FALLBACK_DOWNLOAD_DIR: &str = "./downloads";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StudioConfig {
    pub base_url: String,
    pub request_timeout_ms: u64,
    pub download_dir: Option<PathBuf>,
    pub log_to_terminal: bool,
    pub preserve_partial_alpha: bool,
    pub sync: bool,
    pub content_moderation: bool,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_ms: 60_000,
            download_dir: None,
            log_to_terminal: false,
            preserve_partial_alpha: true,
            sync: true,
            content_moderation: false,
        }
    }
}

impl StudioConfig {
    /// Replaces `base_url` with a non-blank override.
    pub fn with_base_url_override(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url.filter(|url| !url.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
        self
    }

    /// Configured directory, else the platform download folder, else `./downloads`.
    pub fn resolved_download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from(FALLBACK_DOWNLOAD_DIR))
    }
}

/// Result of reading the config file. The warning is logged once a logger exists.
pub struct LoadedConfig {
    pub config: StudioConfig,
    pub warning: Option<String>,
}

pub fn load_config(dir: &Path) -> LoadedConfig {
    let path = dir.join(CONFIG_FILENAME);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return LoadedConfig {
                config: StudioConfig::default(),
                warning: None,
            };
        }
        Err(err) => {
            return LoadedConfig {
                config: StudioConfig::default(),
                warning: Some(format!("Failed to read config from {:?}: {}", path, err)),
            };
        }
    };

    match ron::from_str::<StudioConfig>(&content) {
        Ok(config) => LoadedConfig {
            config,
            warning: None,
        },
        Err(err) => LoadedConfig {
            config: StudioConfig::default(),
            warning: Some(format!("Failed to parse config from {:?}: {}", path, err)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults_silently() {
        let temp = TempDir::new().unwrap();
        let loaded = load_config(temp.path());
        assert_eq!(loaded.config, StudioConfig::default());
        assert!(loaded.warning.is_none());
    }

    #[test]
    fn partial_file_keeps_defaults_for_missing_fields() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILENAME),
            "(base_url: \"http://studio.local:8080\", content_moderation: true)",
        )
        .unwrap();

        let loaded = load_config(temp.path());
        assert!(loaded.warning.is_none());
        assert_eq!(loaded.config.base_url, "http://studio.local:8080");
        assert!(loaded.config.content_moderation);
        assert_eq!(loaded.config.request_timeout_ms, 60_000);
        assert!(loaded.config.preserve_partial_alpha);
    }

    #[test]
    fn malformed_file_falls_back_with_warning() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILENAME), "(base_url: 42").unwrap();

        let loaded = load_config(temp.path());
        assert_eq!(loaded.config, StudioConfig::default());
        assert!(loaded.warning.unwrap().contains("Failed to parse config"));
    }

    #[test]
    fn env_override_replaces_base_url() {
        let config = StudioConfig::default()
            .with_base_url_override(Some(" http://10.0.0.2:5000 ".to_string()));
        assert_eq!(config.base_url, "http://10.0.0.2:5000");

        let unchanged = StudioConfig::default().with_base_url_override(Some("  ".to_string()));
        assert_eq!(unchanged.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn explicit_download_dir_wins() {
        let config = StudioConfig {
            download_dir: Some(PathBuf::from("/tmp/studio-out")),
            ..StudioConfig::default()
        };
        assert_eq!(config.resolved_download_dir(), PathBuf::from("/tmp/studio-out"));
    }

    #[test]
    fn round_trips_through_pretty_ron() {
        let config = StudioConfig {
            sync: false,
            ..StudioConfig::default()
        };
        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new()).unwrap();
        let parsed: StudioConfig = ron::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
