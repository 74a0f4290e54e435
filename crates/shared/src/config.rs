//! Application configuration management.

use std::path::PathBuf;

use serde::Deserialize;

use crate::types::CurrencyCode;

/// Environment variable read when `rates.app_id` is not configured.
pub const OPEN_EXCHANGE_APP_ID_VAR: &str = "OPEN_EXCHANGE_APP_ID";

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Ledger engine configuration.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Document storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
    /// Exchange rate provider configuration.
    #[serde(default)]
    pub rates: RatesConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Ledger engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// Currency all statistics are normalized to, for newly created documents.
    #[serde(default = "default_base_currency")]
    pub base_currency: CurrencyCode,
    /// Maximum number of exchange rate fetches in flight.
    #[serde(default = "default_fetch_concurrency")]
    pub fetch_concurrency: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            base_currency: default_base_currency(),
            fetch_concurrency: default_fetch_concurrency(),
        }
    }
}

fn default_base_currency() -> CurrencyCode {
    CurrencyCode::eur()
}

fn default_fetch_concurrency() -> usize {
    10
}

/// Document storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Directory holding the document file.
    #[serde(default = "default_storage_root")]
    pub root: PathBuf,
    /// Document file name inside `root`.
    #[serde(default = "default_document_name")]
    pub document: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            document: default_document_name(),
        }
    }
}

fn default_storage_root() -> PathBuf {
    PathBuf::from("data")
}

fn default_document_name() -> String {
    "apunta.json".to_string()
}

/// Exchange rate provider configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RatesConfig {
    /// Open Exchange Rates application id.
    #[serde(default)]
    pub app_id: Option<String>,
    /// Base URL of the Open Exchange Rates API.
    #[serde(default = "default_rates_base_url")]
    pub base_url: String,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            app_id: None,
            base_url: default_rates_base_url(),
        }
    }
}

fn default_rates_base_url() -> String {
    "https://openexchangerates.org/api".to_string()
}

impl RatesConfig {
    /// Returns the configured app id, falling back to `OPEN_EXCHANGE_APP_ID`.
    ///
    /// Empty values count as missing.
    #[must_use]
    pub fn resolved_app_id(&self) -> Option<String> {
        self.app_id
            .clone()
            .or_else(|| std::env::var(OPEN_EXCHANGE_APP_ID_VAR).ok())
            .filter(|id| !id.trim().is_empty())
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("APUNTA").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Full path of the document file.
    #[must_use]
    pub fn document_path(&self) -> PathBuf {
        self.storage.root.join(&self.storage.document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.ledger.base_currency.as_str(), "EUR");
        assert_eq!(config.ledger.fetch_concurrency, 10);
        assert_eq!(config.document_path(), PathBuf::from("data/apunta.json"));
        assert_eq!(config.rates.base_url, "https://openexchangerates.org/api");
    }

    #[test]
    fn test_load_without_sources_uses_defaults() {
        temp_env::with_vars_unset(
            ["APUNTA__SERVER__PORT", "APUNTA__LEDGER__BASE_CURRENCY", "RUN_MODE"],
            || {
                let config = AppConfig::load().expect("config should load");
                assert_eq!(config.server.port, 3000);
                assert_eq!(config.ledger.base_currency.as_str(), "EUR");
            },
        );
    }

    #[test]
    fn test_load_environment_overrides() {
        temp_env::with_vars(
            [
                ("APUNTA__SERVER__PORT", Some("9000")),
                ("APUNTA__LEDGER__BASE_CURRENCY", Some("chf")),
                ("APUNTA__LEDGER__FETCH_CONCURRENCY", Some("4")),
            ],
            || {
                let config = AppConfig::load().expect("config should load");
                assert_eq!(config.server.port, 9000);
                assert_eq!(config.ledger.base_currency.as_str(), "CHF");
                assert_eq!(config.ledger.fetch_concurrency, 4);
            },
        );
    }

    #[test]
    fn test_app_id_falls_back_to_environment() {
        temp_env::with_var(OPEN_EXCHANGE_APP_ID_VAR, Some("from-env"), || {
            let rates = RatesConfig::default();
            assert_eq!(rates.resolved_app_id().as_deref(), Some("from-env"));

            let configured = RatesConfig {
                app_id: Some("configured".to_string()),
                ..RatesConfig::default()
            };
            assert_eq!(configured.resolved_app_id().as_deref(), Some("configured"));
        });
    }

    #[test]
    fn test_blank_app_id_is_missing() {
        temp_env::with_var_unset(OPEN_EXCHANGE_APP_ID_VAR, || {
            let rates = RatesConfig {
                app_id: Some("   ".to_string()),
                ..RatesConfig::default()
            };
            assert!(rates.resolved_app_id().is_none());
        });
    }
}
