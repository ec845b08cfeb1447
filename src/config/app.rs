//! Application configuration loading from config.toml
//!
//! Every section is optional: a missing file or a missing key falls back to the
//! defaults below. After the file is read, `DATABASE_URL`, `LUNCH_BIND` and
//! `ADMIN_PIN` from the environment take precedence.

use super::menu::MenuItemConfig;
use crate::{
    core::{report::DEFAULT_TOP_N, validation::validate_pin},
    errors::{Error, Result},
};
use chrono::FixedOffset;
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Environment variable naming the configuration file.
pub const CONFIG_PATH_VAR: &str = "LUNCH_CONFIG";

/// Configuration file used when [`CONFIG_PATH_VAR`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// The whole config.toml file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP listener
    pub server: ServerConfig,
    /// Storage
    pub database: DatabaseConfig,
    /// Admin login
    pub auth: AuthConfig,
    /// Dashboard defaults
    pub report: ReportConfig,
    /// Menu items seeded into an empty food-item table
    pub menu: Vec<MenuItemConfig>,
}

/// `[server]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

/// `[database]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// sea-orm connection URL
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://data/lunch_ledger.sqlite?mode=rwc".to_string(),
        }
    }
}

/// `[auth]` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Six-digit admin PIN; without one every login fails
    pub admin_pin: Option<String>,
}

/// `[report]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Length of the top debtors / collectors lists
    pub top_n: usize,
    /// Business timezone, in whole hours east of UTC, for daily totals
    pub utc_offset_hours: i32,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
            utc_offset_hours: 7,
        }
    }
}

impl ReportConfig {
    /// The configured business offset.
    ///
    /// # Errors
    /// Returns `Error::Config` when the offset is outside ±23 hours.
    pub fn offset(&self) -> Result<FixedOffset> {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).ok_or_else(|| Error::Config {
            message: format!("utc_offset_hours {} is out of range", self.utc_offset_hours),
        })
    }
}

impl AppConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    /// Returns `Error::Config` when the TOML is invalid.
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| Error::Config {
            message: format!("Failed to parse config.toml: {e}"),
        })
    }

    /// Applies environment overrides, looked up through `lookup` so callers can pass
    /// the real environment or a fixed map.
    #[must_use]
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(bind) = lookup("LUNCH_BIND") {
            self.server.bind = bind;
        }
        if let Some(pin) = lookup("ADMIN_PIN") {
            self.auth.admin_pin = Some(pin);
        }
        self
    }

    /// Checks values that would otherwise only fail at first use.
    ///
    /// # Errors
    /// Returns `Error::Config` for a malformed PIN, a zero `top_n` or an out-of-range
    /// offset.
    pub fn validate(&self) -> Result<()> {
        if let Some(pin) = &self.auth.admin_pin {
            validate_pin(pin).map_err(|e| Error::Config {
                message: format!("admin_pin: {e}"),
            })?;
        }
        if self.report.top_n == 0 {
            return Err(Error::Config {
                message: "report.top_n must be at least 1".to_string(),
            });
        }
        self.report.offset()?;
        Ok(())
    }
}

/// Loads configuration from `path`, falling back to defaults when the file is absent.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    if !path.exists() {
        info!(path = %path.display(), "No configuration file, using defaults");
        return Ok(AppConfig::default());
    }

    debug!(path = %path.display(), "Loading configuration");
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.display()),
    })?;
    AppConfig::from_toml(&contents)
}

/// Loads the application configuration the binary runs with: the file named by
/// `LUNCH_CONFIG` (or `./config.toml`) plus environment overrides, validated.
///
/// # Errors
/// Returns an error if the file cannot be parsed or a value is invalid.
pub fn load_app_configuration() -> Result<AppConfig> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = load_config(&path)?.with_overrides(|key| std::env::var(key).ok());
    config.validate()?;

    if config.auth.admin_pin.is_none() {
        warn!("No admin PIN configured; PIN login is disabled");
    }
    info!(
        bind = %config.server.bind,
        menu_items = config.menu.len(),
        "Loaded application configuration"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::entities::FoodKind;
    use std::collections::HashMap;

    #[test]
    fn test_parse_app_config() {
        let toml_str = r#"
            [server]
            bind = "0.0.0.0:8080"

            [auth]
            admin_pin = "123456"

            [report]
            top_n = 3

            [[menu]]
            name = "Cơm gà"
            type = "main"
            price = 35000

            [[menu]]
            name = "Trứng ốp la"
            type = "side"
            price = 5000
        "#;

        let config = AppConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:8080");
        assert_eq!(config.auth.admin_pin.as_deref(), Some("123456"));
        assert_eq!(config.report.top_n, 3);
        assert_eq!(config.report.utc_offset_hours, 7);
        assert_eq!(config.database.url, DatabaseConfig::default().url);
        assert_eq!(config.menu.len(), 2);
        assert_eq!(config.menu[1].kind, FoodKind::Side);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:3000");
        assert_eq!(config.report.top_n, DEFAULT_TOP_N);
        assert!(config.menu.is_empty());
        assert_eq!(config.report.offset().unwrap().local_minus_utc(), 7 * 3600);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = load_config("/definitely/not/here/config.toml").unwrap();
        assert!(config.auth.admin_pin.is_none());
    }

    #[test]
    fn test_environment_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("DATABASE_URL", "sqlite::memory:"),
            ("ADMIN_PIN", "654321"),
        ]);
        let config = AppConfig::default()
            .with_overrides(|key| env.get(key).map(|v| (*v).to_string()));

        assert_eq!(config.database.url, "sqlite::memory:");
        assert_eq!(config.auth.admin_pin.as_deref(), Some("654321"));
        assert_eq!(config.server.bind, "127.0.0.1:3000");
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = AppConfig::default();
        config.auth.admin_pin = Some("12ab".to_string());
        assert!(matches!(config.validate(), Err(Error::Config { .. })));

        let mut config = AppConfig::default();
        config.report.top_n = 0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.report.utc_offset_hours = 30;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let result = AppConfig::from_toml("[server\nbind = 1");
        assert!(matches!(result, Err(Error::Config { .. })));
    }
}
