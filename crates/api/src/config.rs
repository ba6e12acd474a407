use std::env;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
    #[error("{name} is required when {reason}")]
    Missing {
        name: &'static str,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// In-process maps; data is lost on restart.
    Memory,
    Postgres { url: String },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Server host to bind to.
    pub host: String,
    /// Server port to bind to.
    pub port: u16,
    pub storage: StorageBackend,
    /// Maximum database connections in the pool.
    pub db_max_connections: u32,
    /// Minimum database connections in the pool.
    pub db_min_connections: u32,
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Lifetime of admin tokens, in seconds.
    pub jwt_ttl_secs: i64,
    /// Dashboard login.
    pub admin_email: String,
    /// Argon2 PHC string. Admin login is disabled when unset.
    pub admin_password_hash: Option<String>,
    /// Delay before an abandoned contact form is pushed to the CRM.
    pub partial_lead_delay_secs: u64,
    /// CRM webhook receiving abandoned leads. Leads are only logged when unset.
    pub crm_endpoint: Option<String>,
    pub crm_token: Option<String>,
    /// Request header carrying the visitor's ISO country code.
    pub geo_country_header: String,
    /// Language used when SEO queries omit one.
    pub default_language: String,
    /// Event bus channel capacity.
    pub event_bus_capacity: usize,
    /// Maximum accepted request body size.
    pub body_limit_bytes: usize,
    /// Log level (e.g., "info", "debug", "trace").
    pub log_level: String,
}

fn parse<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
    expected: &'static str,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value,
        }),
    }
}

impl AppConfig {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from any key/value source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").filter(|v| !v.is_empty());
        let backend = lookup("STORAGE_BACKEND").map(|v| v.to_lowercase());
        let storage = match (backend.as_deref(), database_url) {
            (Some("memory"), _) | (None, None) => StorageBackend::Memory,
            (Some("postgres") | Some("postgresql") | None, Some(url)) => {
                StorageBackend::Postgres { url }
            }
            (Some("postgres") | Some("postgresql"), None) => {
                return Err(ConfigError::Missing {
                    name: "DATABASE_URL",
                    reason: "STORAGE_BACKEND=postgres",
                })
            }
            (Some(_), _) => {
                return Err(ConfigError::Invalid {
                    name: "STORAGE_BACKEND",
                    expected: "'memory' or 'postgres'",
                    value: backend.clone().unwrap_or_default(),
                })
            }
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse(&lookup, "PORT", 3030, "a valid u16")?,
            storage,
            db_max_connections: parse(&lookup, "DB_MAX_CONNECTIONS", 20, "a valid u32")?,
            db_min_connections: parse(&lookup, "DB_MIN_CONNECTIONS", 5, "a valid u32")?,
            jwt_secret: lookup("JWT_SECRET")
                .unwrap_or_else(|| "dev-secret-change-me-in-production".to_string()),
            jwt_ttl_secs: parse(&lookup, "JWT_TTL_SECS", 8 * 60 * 60, "a number of seconds")?,
            admin_email: lookup("ADMIN_EMAIL").unwrap_or_else(|| "admin@localhost".to_string()),
            admin_password_hash: lookup("ADMIN_PASSWORD_HASH").filter(|v| !v.is_empty()),
            partial_lead_delay_secs: parse(
                &lookup,
                "PARTIAL_LEAD_DELAY_SECS",
                2 * 60 * 60,
                "a number of seconds",
            )?,
            crm_endpoint: lookup("CRM_ENDPOINT").filter(|v| !v.is_empty()),
            crm_token: lookup("CRM_TOKEN").filter(|v| !v.is_empty()),
            geo_country_header: lookup("GEO_COUNTRY_HEADER")
                .unwrap_or_else(|| "cf-ipcountry".to_string())
                .to_lowercase(),
            default_language: lookup("DEFAULT_LANGUAGE")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| "fr".to_string()),
            event_bus_capacity: parse(&lookup, "EVENT_BUS_CAPACITY", 1024, "a valid usize")?,
            body_limit_bytes: parse(&lookup, "BODY_LIMIT_BYTES", 1024 * 1024, "a valid usize")?,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Build the socket address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn partial_lead_delay(&self) -> Duration {
        Duration::from_secs(self.partial_lead_delay_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.addr(), "0.0.0.0:3030");
        assert_eq!(config.partial_lead_delay(), Duration::from_secs(7200));
        assert_eq!(config.default_language, "fr");
        assert_eq!(config.geo_country_header, "cf-ipcountry");
        assert!(config.admin_password_hash.is_none());
        assert!(config.crm_endpoint.is_none());
    }

    #[test]
    fn database_url_selects_postgres() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/site")]).unwrap();
        assert_eq!(
            config.storage,
            StorageBackend::Postgres {
                url: "postgres://localhost/site".into()
            }
        );

        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/site"),
            ("STORAGE_BACKEND", "memory"),
        ])
        .unwrap();
        assert_eq!(config.storage, StorageBackend::Memory);
    }

    #[test]
    fn postgres_without_url_is_an_error() {
        let err = load(&[("STORAGE_BACKEND", "postgres")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { name: "DATABASE_URL", .. }));
    }

    #[test]
    fn malformed_numbers_are_reported() {
        let err = load(&[("PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));

        let err = load(&[("STORAGE_BACKEND", "mongo")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "STORAGE_BACKEND", .. }));
    }

    #[test]
    fn overrides() {
        let config = load(&[
            ("PORT", "8080"),
            ("PARTIAL_LEAD_DELAY_SECS", "60"),
            ("GEO_COUNTRY_HEADER", "X-Vercel-IP-Country"),
            ("CRM_ENDPOINT", "https://crm.example.com/hooks/leads"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.partial_lead_delay(), Duration::from_secs(60));
        assert_eq!(config.geo_country_header, "x-vercel-ip-country");
        assert!(config.crm_endpoint.is_some());
    }
}
