//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration file (config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;
use std::{net::IpAddr, path::PathBuf};
use url::Url;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub activitypub: ActivityPubConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 8080)
    pub port: u16,
    /// Public domain (e.g., "orb.example.com")
    pub domain: String,
    /// Protocol ("http" or "https")
    pub protocol: String,
}

impl ServerConfig {
    /// Get the base URL for the instance
    ///
    /// # Returns
    /// Full URL like "https://orb.example.com"
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.protocol, self.domain)
    }
}

/// Store backend selector
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Memory,
    Sqlite,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Path to SQLite database file (sqlite backend only)
    pub path: PathBuf,
}

/// ActivityPub endpoint configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityPubConfig {
    /// Path of the service actor; outbox, inbox and acceptlist live below it
    /// (e.g. "/services/orb")
    pub service_path: String,
    /// Path under which shared/liked objects are addressed by id
    /// (e.g. "/transactions")
    pub objects_path: String,
    /// Number of items per collection page
    pub page_size: usize,
    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,
}

impl ActivityPubConfig {
    /// IRI of the service actor, e.g. "https://orb.example.com/services/orb"
    pub fn service_iri(&self, server: &ServerConfig) -> Result<Url, url::ParseError> {
        Url::parse(&format!("{}{}", server.base_url(), self.service_path))
    }

    /// IRI under which objects are addressed, e.g. "https://orb.example.com/transactions"
    pub fn objects_iri(&self, server: &ServerConfig) -> Result<Url, url::ParseError> {
        Url::parse(&format!("{}{}", server.base_url(), self.objects_path))
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (APCOLLECTIONS__*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.domain", "localhost:8080")?
            .set_default("server.protocol", "http")?
            .set_default("database.backend", "memory")?
            .set_default("database.path", "data/apcollections.db")?
            .set_default("activitypub.service_path", "/services/orb")?
            .set_default("activitypub.objects_path", "/transactions")?
            .set_default("activitypub.page_size", 50)?
            .set_default("activitypub.max_body_bytes", 1024 * 1024)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // Load from config/default.toml if it exists
            .add_source(File::with_name("config/default").required(false))
            // Load from config/local.toml if it exists (overrides default)
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables (APCOLLECTIONS__*)
            .add_source(
                Environment::with_prefix("APCOLLECTIONS")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    pub fn validate(&self) -> Result<(), crate::error::AppError> {
        if self.activitypub.page_size == 0 {
            return Err(crate::error::AppError::Config(
                "activitypub.page_size must be greater than 0".to_string(),
            ));
        }

        for (key, path) in [
            ("activitypub.service_path", &self.activitypub.service_path),
            ("activitypub.objects_path", &self.activitypub.objects_path),
        ] {
            if !path.starts_with('/') || path.ends_with('/') {
                return Err(crate::error::AppError::Config(format!(
                    "{key} must start with '/' and must not end with '/'"
                )));
            }
        }

        if let Err(e) = self.activitypub.service_iri(&self.server) {
            return Err(crate::error::AppError::Config(format!(
                "server.domain does not form a valid IRI: {e}"
            )));
        }

        if is_local_server_domain(&self.server.domain) {
            if !self.server.protocol.eq_ignore_ascii_case("https") {
                tracing::warn!(
                    domain = %self.server.domain,
                    protocol = %self.server.protocol,
                    "Serving collection IRIs over plain http for local development"
                );
            }
        } else if !self.server.protocol.eq_ignore_ascii_case("https") {
            return Err(crate::error::AppError::Config(
                "server.protocol must be https for non-local server domains".to_string(),
            ));
        }

        Ok(())
    }
}

fn normalized_server_host(domain: &str) -> String {
    let trimmed = domain.trim();
    let parsed_host = url::Url::parse(&format!("http://{trimmed}"))
        .ok()
        .and_then(|url| url.host_str().map(|host| host.to_string()));
    let host = parsed_host.unwrap_or_else(|| trimmed.to_string());
    host.trim_end_matches('.').to_ascii_lowercase()
}

fn is_local_server_domain(domain: &str) -> bool {
    let host = normalized_server_host(domain);
    if host == "localhost" || host.ends_with(".localhost") {
        return true;
    }

    let host = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = host.parse::<IpAddr>() {
        return ip.is_loopback() || ip.is_unspecified();
    }

    false
}

/// Configuration used by unit tests: https://example1.com, page size 4
#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            domain: "example1.com".to_string(),
            protocol: "https".to_string(),
        },
        database: DatabaseConfig {
            backend: StoreBackend::Memory,
            path: PathBuf::from("unused.db"),
        },
        activitypub: ActivityPubConfig {
            service_path: "/services/orb".to_string(),
            objects_path: "/transactions".to_string(),
            page_size: 4,
            max_body_bytes: 64 * 1024,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                domain: "localhost".to_string(),
                protocol: "http".to_string(),
            },
            database: DatabaseConfig {
                backend: StoreBackend::Memory,
                path: PathBuf::from("/tmp/apcollections-test.db"),
            },
            activitypub: ActivityPubConfig {
                service_path: "/services/orb".to_string(),
                objects_path: "/transactions".to_string(),
                page_size: 4,
                max_body_bytes: 1024,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }

    #[test]
    fn validate_accepts_http_on_localhost() {
        let config = valid_config();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_page_size() {
        let mut config = valid_config();
        config.activitypub.page_size = 0;

        let error = config
            .validate()
            .expect_err("zero page size must fail");
        assert!(matches!(
            error,
            crate::error::AppError::Config(message)
                if message.contains("activitypub.page_size")
        ));
    }

    #[test]
    fn validate_rejects_trailing_slash_in_paths() {
        let mut config = valid_config();
        config.activitypub.objects_path = "/transactions/".to_string();

        let error = config
            .validate()
            .expect_err("trailing slash must fail");
        assert!(matches!(
            error,
            crate::error::AppError::Config(message)
                if message.contains("activitypub.objects_path")
        ));
    }

    #[test]
    fn validate_rejects_http_for_non_local_domain() {
        let mut config = valid_config();
        config.server.domain = "orb.example.com".to_string();
        config.server.protocol = "http".to_string();

        let error = config
            .validate()
            .expect_err("public domains must require https");
        assert!(matches!(
            error,
            crate::error::AppError::Config(message)
                if message.contains("server.protocol must be https")
        ));
    }

    #[test]
    fn service_and_objects_iris_are_derived_from_server() {
        let mut config = valid_config();
        config.server.domain = "example1.com".to_string();
        config.server.protocol = "https".to_string();

        assert_eq!(
            config
                .activitypub
                .service_iri(&config.server)
                .unwrap()
                .as_str(),
            "https://example1.com/services/orb"
        );
        assert_eq!(
            config
                .activitypub
                .objects_iri(&config.server)
                .unwrap()
                .as_str(),
            "https://example1.com/transactions"
        );
    }
}
