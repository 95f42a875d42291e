//! Proxy configuration: listen address, mapping file, upstream fetch limits,
//! link base path, and the status notifier.
//!
//! Values come from built-in defaults, then an optional TOML file named by
//! `WAYBACK_PROXY_CONFIG_FILE`, then `WAYBACK_PROXY_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Which status notifier the server wires in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotifierKind {
    /// Discard every phase change.
    None,
    /// Emit phase changes as tracing events.
    Log,
    /// Blink LEDs through the sysfs GPIO interface.
    Gpio,
}

/// Runtime settings for the proxy server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Socket address the proxy listens on.
    ///
    /// Set via WAYBACK_PROXY_BIND_ADDR environment variable.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Path to the JSON domain mapping list.
    ///
    /// Set via WAYBACK_PROXY_MAPPINGS_PATH environment variable.
    #[serde(default = "default_mappings_path")]
    pub mappings_path: PathBuf,

    /// User-Agent string for upstream requests.
    ///
    /// Set via WAYBACK_PROXY_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per upstream request.
    ///
    /// Set via WAYBACK_PROXY_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Upstream request timeout in milliseconds.
    ///
    /// Set via WAYBACK_PROXY_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum number of upstream redirects to follow.
    ///
    /// Set via WAYBACK_PROXY_MAX_REDIRECTS environment variable.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Base path stripped from inbound paths and prefixed onto rewritten
    /// links, e.g. `http://localhost:5271` when browsing the proxy directly.
    ///
    /// Set via WAYBACK_PROXY_BASE_PATH environment variable.
    #[serde(default)]
    pub base_path: Option<String>,

    /// Status notifier implementation.
    ///
    /// Set via WAYBACK_PROXY_NOTIFIER environment variable (none, log, gpio).
    #[serde(default = "default_notifier")]
    pub notifier: NotifierKind,

    /// Root of the sysfs GPIO tree.
    #[serde(default = "default_gpio_root")]
    pub gpio_root: PathBuf,

    /// GPIO line of the success LED.
    #[serde(default = "default_success_pin")]
    pub success_pin: u32,

    /// GPIO line of the error LED.
    #[serde(default = "default_error_pin")]
    pub error_pin: u32,
}

fn default_bind_addr() -> String {
    "0.0.0.0:5271".into()
}

fn default_mappings_path() -> PathBuf {
    PathBuf::from("./domainMappings.json")
}

fn default_user_agent() -> String {
    "wayback-proxy/0.1".into()
}

fn default_max_bytes() -> usize {
    20 * 1024 * 1024
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_redirects() -> usize {
    10
}

fn default_notifier() -> NotifierKind {
    NotifierKind::Log
}

fn default_gpio_root() -> PathBuf {
    PathBuf::from("/sys/class/gpio")
}

fn default_success_pin() -> u32 {
    27
}

fn default_error_pin() -> u32 {
    17
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            mappings_path: default_mappings_path(),
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
            max_redirects: default_max_redirects(),
            base_path: None,
            notifier: default_notifier(),
            gpio_root: default_gpio_root(),
            success_pin: default_success_pin(),
            error_pin: default_error_pin(),
        }
    }
}

impl AppConfig {
    /// Upstream request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Base path with any trailing slash removed, if configured.
    pub fn base_path(&self) -> Option<&str> {
        self.base_path
            .as_deref()
            .map(|p| p.trim().trim_end_matches('/'))
            .filter(|p| !p.is_empty())
    }

    /// Load and validate. Environment variables override the TOML file,
    /// which overrides defaults; nested keys use `__` as separator.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("WAYBACK_PROXY_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("WAYBACK_PROXY_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.bind_addr, "0.0.0.0:5271");
        assert_eq!(config.mappings_path, PathBuf::from("./domainMappings.json"));
        assert_eq!(config.user_agent, "wayback-proxy/0.1");
        assert_eq!(config.max_bytes, 20 * 1024 * 1024);
        assert_eq!(config.timeout_ms, 30_000);
        assert_eq!(config.notifier, NotifierKind::Log);
        assert_eq!(config.success_pin, 27);
        assert_eq!(config.error_pin, 17);
        assert!(config.base_path.is_none());
    }

    #[test]
    fn test_timeout_duration() {
        let config = AppConfig::default();
        assert_eq!(config.timeout(), Duration::from_millis(30_000));
    }

    #[test]
    fn test_base_path_trims_trailing_slash() {
        let config = AppConfig { base_path: Some("http://localhost:5271/".into()), ..Default::default() };
        assert_eq!(config.base_path(), Some("http://localhost:5271"));

        let blank = AppConfig { base_path: Some("  ".into()), ..Default::default() };
        assert_eq!(blank.base_path(), None);
    }

    #[test]
    fn test_load_from_env() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("WAYBACK_PROXY_TIMEOUT_MS", "5000");
            jail.set_env("WAYBACK_PROXY_NOTIFIER", "gpio");
            jail.set_env("WAYBACK_PROXY_BASE_PATH", "http://localhost:5271");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.timeout_ms, 5000);
            assert_eq!(config.notifier, NotifierKind::Gpio);
            assert_eq!(config.base_path(), Some("http://localhost:5271"));
            Ok(())
        });
    }

    #[test]
    fn test_load_from_toml_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "proxy.toml",
                r#"
                    bind_addr = "127.0.0.1:8080"
                    mappings_path = "/etc/wayback/mappings.json"
                    notifier = "none"
                "#,
            )?;
            jail.set_env("WAYBACK_PROXY_CONFIG_FILE", "proxy.toml");
            jail.set_env("WAYBACK_PROXY_BIND_ADDR", "127.0.0.1:9090");

            let config = AppConfig::load().map_err(|e| e.to_string())?;
            assert_eq!(config.bind_addr, "127.0.0.1:9090");
            assert_eq!(config.mappings_path, PathBuf::from("/etc/wayback/mappings.json"));
            assert_eq!(config.notifier, NotifierKind::None);
            Ok(())
        });
    }
}
