//! Configuration management for Lumen.
//!
//! Provides TOML-based configuration with XDG-compliant paths and
//! environment variable overrides. Defaults reproduce the scan timings the
//! service has always used, so an empty or missing file is a valid setup.

use crate::error::{ConfigError, ConfigResult, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Main application configuration.
///
/// Loaded from `$LUMEN_CONFIG` if set, else `~/.config/lumen/config.toml`
/// (or platform equivalent). If neither exists, default values are used.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener settings
    pub server: ServerConfig,
    /// Browser launch and page settings
    pub browser: BrowserConfig,
    /// Per-page scan timing
    pub scanning: ScanningConfig,
    /// Accessibility audit engine settings
    pub audit: AuditConfig,
}

impl AppConfig {
    /// Load configuration from disk, falling back to defaults if not found.
    ///
    /// An explicit `LUMEN_CONFIG` path that does not exist is an error;
    /// a missing default path is not.
    pub fn load() -> ConfigResult<Self> {
        Self::locate_and_load(std::env::var("LUMEN_CONFIG").ok())
    }

    fn locate_and_load(explicit: Option<String>) -> ConfigResult<Self> {
        if let Some(explicit) = explicit {
            let path = PathBuf::from(explicit);
            if !path.exists() {
                return Err(ConfigError::NotFound {
                    path: path.display().to_string(),
                });
            }
            return Self::load_from(&path);
        }

        let config_path = Self::config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::debug!("Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific TOML file.
    pub fn load_from(path: &std::path::Path) -> ConfigResult<Self> {
        tracing::debug!("Loading config from {}", path.display());
        let contents = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides.
    ///
    /// Supports the following environment variables:
    /// - `PORT` / `LUMEN_PORT`: listener port (`LUMEN_PORT` wins)
    /// - `LUMEN_HOST`: listener address
    /// - `LUMEN_HEADLESS`: browser headless mode (true/false)
    /// - `LUMEN_CHROMIUM_PATH` / `PLAYWRIGHT_CHROMIUM_EXECUTABLE_PATH`: browser binary
    /// - `LUMEN_AXE_SCRIPT`: path to an axe-core bundle
    pub fn load_with_env() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::load_with_env`], reading variables (including
    /// `LUMEN_CONFIG`) through `lookup`.
    pub fn load_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::locate_and_load(lookup("LUMEN_CONFIG"))?;
        config.apply_env_overrides(&lookup);
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup.
    ///
    /// Unparseable values are ignored and the configured value kept.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for key in ["PORT", "LUMEN_PORT"] {
            if let Some(port) = lookup(key).and_then(|v| v.trim().parse().ok()) {
                self.server.port = port;
                tracing::debug!("Override server.port from {}: {}", key, port);
            }
        }

        if let Some(host) = lookup("LUMEN_HOST") {
            tracing::debug!("Override server.host from env: {}", host);
            self.server.host = host;
        }

        if let Some(headless) = lookup("LUMEN_HEADLESS").and_then(|v| v.trim().parse().ok()) {
            self.browser.headless = headless;
            tracing::debug!("Override browser.headless from env: {}", headless);
        }

        let executable = lookup("LUMEN_CHROMIUM_PATH")
            .or_else(|| lookup("PLAYWRIGHT_CHROMIUM_EXECUTABLE_PATH"))
            .filter(|p| !p.trim().is_empty());
        if let Some(path) = executable {
            tracing::debug!("Override browser.executable from env: {}", path);
            self.browser.executable = Some(PathBuf::from(path));
        }

        if let Some(path) = lookup("LUMEN_AXE_SCRIPT").filter(|p| !p.trim().is_empty()) {
            self.audit.axe_script_path = Some(PathBuf::from(path));
        }
    }

    /// Reject values that would make scanning impossible.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.browser.viewport_width == 0 || self.browser.viewport_height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "browser.viewport".to_string(),
                reason: "viewport dimensions must be non-zero".to_string(),
            });
        }
        if self.scanning.scroll_step_px == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scanning.scroll_step_px".to_string(),
                reason: "scroll step must be non-zero".to_string(),
            });
        }
        if self.scanning.pass_delays_ms.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "scanning.pass_delays_ms".to_string(),
                reason: "at least one dismissal pass is required".to_string(),
            });
        }
        Ok(())
    }

    /// Get the path to the configuration file.
    ///
    /// Uses XDG base directories: `~/.config/lumen/config.toml`
    pub fn config_path() -> ConfigResult<PathBuf> {
        let dirs = ProjectDirs::from("dev", "lumen", "lumen").ok_or(ConfigError::NoConfigDir)?;
        Ok(dirs.config_dir().join("config.toml"))
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Browser launch and page settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run browser in headless mode
    pub headless: bool,
    /// Explicit browser binary; auto-detected when unset
    pub executable: Option<PathBuf>,
    /// Launch with `--no-sandbox --disable-setuid-sandbox`
    pub no_sandbox: bool,
    /// Page viewport width (also the reported page width)
    pub viewport_width: u32,
    /// Page viewport height
    pub viewport_height: u32,
    /// Navigation timeout in seconds
    pub navigation_timeout_secs: u64,
}

impl BrowserConfig {
    /// Navigation timeout as a `Duration`.
    #[must_use]
    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            executable: None,
            no_sandbox: true,
            viewport_width: 1440,
            viewport_height: 900,
            navigation_timeout_secs: 45,
        }
    }
}

/// Per-page scan timing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanningConfig {
    /// Wait after navigation for script-driven banners to mount
    pub mount_settle_ms: u64,
    /// Delay before each dismissal pass; one entry per pass
    pub pass_delays_ms: Vec<u64>,
    /// Wait after a successful dismissal for exit animations
    pub click_settle_ms: u64,
    /// Bounded wait for accept-button visibility checks
    pub visibility_timeout_ms: u64,
    /// Auto-scroll increment in pixels
    pub scroll_step_px: u32,
    /// Delay between auto-scroll increments
    pub scroll_interval_ms: u64,
    /// Maximum total auto-scroll distance in pixels
    pub scroll_cap_px: u32,
    /// Wait after scrolling back to the top
    pub post_scroll_settle_ms: u64,
}

impl Default for ScanningConfig {
    fn default() -> Self {
        Self {
            mount_settle_ms: 1500,
            pass_delays_ms: vec![0, 2500, 2000],
            click_settle_ms: 500,
            visibility_timeout_ms: 400,
            scroll_step_px: 400,
            scroll_interval_ms: 80,
            scroll_cap_px: 30_000,
            post_scroll_settle_ms: 1000,
        }
    }
}

/// Accessibility audit engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Local axe-core bundle; takes precedence over the download URL
    pub axe_script_path: Option<PathBuf>,
    /// Where to download axe-core from when no local bundle is configured
    pub axe_script_url: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            axe_script_path: None,
            axe_script_url: "https://cdn.jsdelivr.net/npm/axe-core@4.10.2/axe.min.js".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use std::collections::HashMap;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.browser.viewport_width, 1440);
        assert_eq!(config.browser.viewport_height, 900);
        assert_eq!(config.browser.navigation_timeout(), Duration::from_secs(45));
        assert_eq!(config.scanning.pass_delays_ms, vec![0, 2500, 2000]);
        assert_eq!(config.scanning.scroll_cap_px, 30_000);
        assert!(config.browser.headless);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_load_from_file() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("config.toml");
        fs::write(
            &config_path,
            "[server]\nport = 8080\n\n[scanning]\nmount_settle_ms = 250\n",
        )
        .expect("write config file");

        let loaded = AppConfig::load_from(&config_path).expect("load config");
        assert_eq!(loaded.server.port, 8080);
        assert_eq!(loaded.scanning.mount_settle_ms, 250);
        // Untouched sections keep their defaults
        assert_eq!(loaded.browser.viewport_width, 1440);
        assert_eq!(loaded.scanning.scroll_step_px, 400);
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("PORT", "4000"),
            ("LUMEN_HEADLESS", "false"),
            ("PLAYWRIGHT_CHROMIUM_EXECUTABLE_PATH", "/usr/bin/chromium"),
            ("LUMEN_AXE_SCRIPT", "/opt/axe.min.js"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| vars.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.server.port, 4000);
        assert!(!config.browser.headless);
        assert_eq!(
            config.browser.executable,
            Some(PathBuf::from("/usr/bin/chromium"))
        );
        assert_eq!(
            config.audit.axe_script_path,
            Some(PathBuf::from("/opt/axe.min.js"))
        );
    }

    #[test]
    fn test_lumen_port_wins_over_port() {
        let vars: HashMap<&str, &str> = [("PORT", "4000"), ("LUMEN_PORT", "5000")]
            .into_iter()
            .collect();
        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| vars.get(key).map(|v| (*v).to_string()));
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_unparseable_override_is_ignored() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(|key| (key == "PORT").then(|| "not-a-port".to_string()));
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn test_load_with_reports_config_errors() {
        let missing =
            |key: &str| (key == "LUMEN_CONFIG").then(|| "/nonexistent/lumen.toml".to_string());
        let err = AppConfig::load_with(missing).unwrap_err();
        assert!(matches!(err, CoreError::Config(ConfigError::NotFound { .. })));
        assert!(!err.is_client_error());

        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("config.toml");
        fs::write(&config_path, "[browser]\nviewport_width = 0\n").expect("write config file");
        let path = config_path.display().to_string();
        let err = AppConfig::load_with(|key| (key == "LUMEN_CONFIG").then(|| path.clone()))
            .unwrap_err();
        assert!(matches!(err, CoreError::Config(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_load_with_applies_overrides() {
        let tmp = TempDir::new().expect("create temp dir");
        let config_path = tmp.path().join("config.toml");
        fs::write(&config_path, "[server]\nport = 8080\n").expect("write config file");
        let path = config_path.display().to_string();

        let config = AppConfig::load_with(|key| match key {
            "LUMEN_CONFIG" => Some(path.clone()),
            "LUMEN_PORT" => Some("9000".to_string()),
            _ => None,
        })
        .expect("load config");
        assert_eq!(config.server.port, 9000);
    }

    #[test]
    fn test_validate_rejects_empty_schedule() {
        let mut config = AppConfig::default();
        config.scanning.pass_delays_ms.clear();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("pass_delays_ms"));
    }
}
