use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default connect/read/write timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 8000;

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

fn default_true() -> bool {
    true
}

/// Client configuration
///
/// Every field has a default, so a config file only needs to list what it overrides.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClientConfig {
    #[serde(default = "default_timeout_ms")]
    pub connect_timeout_ms: u64,

    #[serde(default = "default_timeout_ms")]
    pub read_timeout_ms: u64,

    #[serde(default = "default_timeout_ms")]
    pub write_timeout_ms: u64,

    /// Re-send a request once when the connection could not be established
    #[serde(default = "default_true")]
    pub retry_on_connection_failure: bool,

    /// Accept any certificate chain and any hostname.
    ///
    /// This turns off transport security entirely. It exists for talking to
    /// internal hosts with self-signed certificates and must be opted into.
    #[serde(default)]
    pub insecure_skip_verify: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: DEFAULT_TIMEOUT_MS,
            read_timeout_ms: DEFAULT_TIMEOUT_MS,
            write_timeout_ms: DEFAULT_TIMEOUT_MS,
            retry_on_connection_failure: true,
            insecure_skip_verify: false,
        }
    }
}

impl ClientConfig {
    /// Defaults plus the trust-all TLS policy
    pub fn trust_all() -> Self {
        Self {
            insecure_skip_verify: true,
            ..Self::default()
        }
    }

    /// Set connect, read and write timeouts to the same value, saturating at `u64::MAX` ms
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        let ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self.connect_timeout_ms = ms;
        self.read_timeout_ms = ms;
        self.write_timeout_ms = ms;
        self
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .context("Could not determine config directory")
            .map(|d| d.join("http-facade"))
    }

    /// Get the TOML config file path
    pub fn config_path() -> Result<PathBuf> {
        Self::config_dir().map(|d| d.join("client.toml"))
    }

    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse client config")
    }

    /// Load config from file, or return default if not exists
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Load from the default location under the user config directory
    pub fn load_default() -> Result<Self> {
        Self::load(&Self::config_path()?)
    }

    /// Save config as TOML
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.connect_timeout(), Duration::from_millis(8000));
        assert_eq!(config.read_timeout(), Duration::from_millis(8000));
        assert_eq!(config.write_timeout(), Duration::from_millis(8000));
        assert!(config.retry_on_connection_failure);
        // Verification stays on unless asked otherwise
        assert!(!config.insecure_skip_verify);
    }

    #[test]
    fn test_trust_all_preset() {
        let config = ClientConfig::trust_all();
        assert!(config.insecure_skip_verify);
        assert_eq!(config.read_timeout_ms, DEFAULT_TIMEOUT_MS);
        assert!(config.retry_on_connection_failure);
    }

    #[test]
    fn test_with_timeout() {
        let config = ClientConfig::default().with_timeout(Duration::from_millis(250));
        assert_eq!(config.connect_timeout_ms, 250);
        assert_eq!(config.read_timeout_ms, 250);
        assert_eq!(config.write_timeout_ms, 250);
    }

    #[test]
    fn test_with_timeout_saturates() {
        let config = ClientConfig::default().with_timeout(Duration::MAX);
        assert_eq!(config.connect_timeout_ms, u64::MAX);
        assert_eq!(config.read_timeout_ms, u64::MAX);
        assert_eq!(config.write_timeout_ms, u64::MAX);
    }

    #[test]
    fn test_toml_partial() {
        let config = ClientConfig::from_toml_str(
            r#"
            read_timeout_ms = 1500
            insecure_skip_verify = true
            "#,
        )
        .unwrap();
        assert_eq!(config.read_timeout_ms, 1500);
        assert_eq!(config.connect_timeout_ms, DEFAULT_TIMEOUT_MS);
        assert!(config.insecure_skip_verify);
        assert!(config.retry_on_connection_failure);
    }

    #[test]
    fn test_toml_empty_is_default() {
        assert_eq!(ClientConfig::from_toml_str("").unwrap(), ClientConfig::default());
    }

    #[test]
    fn test_toml_invalid() {
        assert!(ClientConfig::from_toml_str("read_timeout_ms = \"soon\"").is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = ClientConfig::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, ClientConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("client.toml");

        let config = ClientConfig {
            retry_on_connection_failure: false,
            ..ClientConfig::trust_all().with_timeout(Duration::from_secs(2))
        };
        config.save(&path).unwrap();

        assert_eq!(ClientConfig::load(&path).unwrap(), config);
    }
}
