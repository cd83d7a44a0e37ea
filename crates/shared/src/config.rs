//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration. When absent the server runs on the
    /// in-memory store (development only).
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    /// Identity provider configuration. When absent, account creation
    /// falls back to the sentinel email without a lookup.
    #[serde(default)]
    pub identity: Option<IdentityConfig>,
    /// Wallet business-rule configuration.
    #[serde(default)]
    pub wallet: WalletConfig,
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
    /// CORS origins allowed to call the API. Empty means any origin
    /// (development only).
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allowed_origins: Vec::new(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// Identity provider configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
    /// Base URL of the identity provider's user lookup API.
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_identity_timeout")]
    pub timeout_secs: u64,
}

fn default_identity_timeout() -> u64 {
    5
}

/// Wallet business-rule configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct WalletConfig {
    /// Fraction of each offer credit retained as operator commission.
    #[serde(default = "default_commission_rate")]
    pub commission_rate: Decimal,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            commission_rate: default_commission_rate(),
        }
    }
}

fn default_commission_rate() -> Decimal {
    // 20%
    Decimal::new(20, 2)
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
            .add_source(config::Environment::with_prefix("WALLET").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults() {
        let server = ServerConfig::default();
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 3000);
        assert!(server.allowed_origins.is_empty());

        let wallet = WalletConfig::default();
        assert_eq!(wallet.commission_rate, dec!(0.20));
    }

    #[test]
    fn test_load_from_env() {
        temp_env::with_vars(
            [
                ("WALLET__SERVER__PORT", Some("8080")),
                ("WALLET__WALLET__COMMISSION_RATE", Some("0.25")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.server.port, 8080);
                assert_eq!(config.wallet.commission_rate, dec!(0.25));
                assert!(config.database.is_none());
            },
        );
    }
}
