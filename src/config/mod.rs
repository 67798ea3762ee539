use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Configuration file format (~/.stratus/stratus.toml).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub login: LoginConfig,
    #[serde(default)]
    pub endpoints: EndpointConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Default identifiers applied when neither a flag nor an env var names one.
/// The client secret is deliberately not a config-file field; pass it via
/// `--client-secret` or `STRATUS_CLIENT_SECRET`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LoginConfig {
    pub tenant_id: Option<String>,
    pub subscription_id: Option<String>,
    pub resource_group: Option<String>,
    pub app_name: Option<String>,
    pub client_id: Option<String>,
    /// Cache credentials across invocations (default true).
    pub use_keychain: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Identity service base URL.
    #[serde(default = "default_identity_url")]
    pub identity_url: String,
    /// Management API base URL.
    #[serde(default = "default_management_url")]
    pub management_url: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            identity_url: default_identity_url(),
            management_url: default_management_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_identity_url() -> String {
    "https://login.stratus.cloud".to_string()
}

fn default_management_url() -> String {
    "https://api.stratus.cloud".to_string()
}

fn default_true() -> bool {
    true
}

/// Get the default stratus directory path (~/.stratus).
pub fn stratus_dir() -> PathBuf {
    dirs::home_dir()
        .expect("Could not determine home directory")
        .join(".stratus")
}

/// Get the config file path.
pub fn config_path() -> PathBuf {
    stratus_dir().join("stratus.toml")
}

impl Config {
    /// Load config from a path. Returns default config if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::error::StratusError::Config(e.to_string()))?;
        Ok(config)
    }

    /// Save config to a path.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::StratusError::Config(e.to_string()))?;
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_returns_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(&dir.path().join("stratus.toml")).unwrap();
        assert_eq!(config.endpoints.identity_url, "https://login.stratus.cloud");
        assert_eq!(config.endpoints.management_url, "https://api.stratus.cloud");
        assert!(config.telemetry.enabled);
        assert!(config.login.tenant_id.is_none());
    }

    #[test]
    fn test_load_partial_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stratus.toml");
        fs::write(
            &path,
            r#"
[login]
tenant_id = "12345678-abcd-0123-4567-abcdef012345"
use_keychain = false
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(
            config.login.tenant_id.as_deref(),
            Some("12345678-abcd-0123-4567-abcdef012345")
        );
        assert_eq!(config.login.use_keychain, Some(false));
        // Untouched sections keep their defaults
        assert_eq!(config.endpoints.identity_url, "https://login.stratus.cloud");
    }

    #[test]
    fn test_save_and_reload_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("stratus.toml");

        let mut config = Config::default();
        config.login.app_name = Some("my-site".to_string());
        config.save(&path).unwrap();

        let reloaded = Config::load(&path).unwrap();
        assert_eq!(reloaded.login.app_name.as_deref(), Some("my-site"));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stratus.toml");
        fs::write(&path, "login = 42").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
