// Process configuration loaded from environment variables
// Everything the services need is read once at startup and injected at construction

use chrono::Duration;
use std::fmt;
use thiserror::Error;

use crate::auth::password::HashAlgorithm;

/// Default bcrypt work factor, kept at 10 so digests stay compatible with existing accounts
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Default session token lifetime in days
pub const DEFAULT_TOKEN_TTL_DAYS: i64 = 30;

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Which persistence layer backs the repositories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// Application configuration
#[derive(Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    /// Only required when `storage` is `Postgres`
    pub database_url: Option<String>,
    pub jwt_secret: String,
    /// Session token lifetime, built from `TOKEN_TTL_DAYS`
    pub token_ttl: Duration,
    pub hash_algorithm: HashAlgorithm,
    pub bcrypt_cost: u32,
}

// Hand-written so the signing secret and connection string never reach the logs
impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("storage", &self.storage)
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_days", &self.token_ttl.num_days())
            .field("hash_algorithm", &self.hash_algorithm)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// `from_env` delegates here; tests pass a map instead of mutating the
    /// process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let jwt_secret = non_empty("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let storage = match non_empty("STORAGE_BACKEND").as_deref() {
            None | Some("postgres") => StorageBackend::Postgres,
            Some("memory") => StorageBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "STORAGE_BACKEND",
                    reason: format!("expected 'postgres' or 'memory', got '{}'", other),
                })
            }
        };

        let database_url = non_empty("DATABASE_URL");
        if storage == StorageBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let host = non_empty("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or("PORT", non_empty("PORT"), 4000u16)?;

        let token_ttl_days = parse_or("TOKEN_TTL_DAYS", non_empty("TOKEN_TTL_DAYS"), DEFAULT_TOKEN_TTL_DAYS)?;
        if token_ttl_days <= 0 {
            return Err(ConfigError::Invalid {
                name: "TOKEN_TTL_DAYS",
                reason: "must be a positive number of days".to_string(),
            });
        }
        let token_ttl = Duration::try_days(token_ttl_days).ok_or_else(|| ConfigError::Invalid {
            name: "TOKEN_TTL_DAYS",
            reason: format!("{} days is too large to represent", token_ttl_days),
        })?;

        let hash_algorithm = match non_empty("PASSWORD_HASH_ALGORITHM") {
            None => HashAlgorithm::Bcrypt,
            Some(value) => value.parse().map_err(|reason| ConfigError::Invalid {
                name: "PASSWORD_HASH_ALGORITHM",
                reason,
            })?,
        };

        let bcrypt_cost = parse_or("BCRYPT_COST", non_empty("BCRYPT_COST"), DEFAULT_BCRYPT_COST)?;
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid {
                name: "BCRYPT_COST",
                reason: format!("{} is outside the supported range 4..=31", bcrypt_cost),
            });
        }

        Ok(Self {
            host,
            port,
            storage,
            database_url,
            jwt_secret,
            token_ttl,
            hash_algorithm,
            bcrypt_cost,
        })
    }

    /// Socket address string the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_missing_secret_fails_fast() {
        let err = load(&[("DATABASE_URL", "postgres://localhost/shop")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn test_blank_secret_is_treated_as_missing() {
        let err = load(&[("JWT_SECRET", "   "), ("STORAGE_BACKEND", "memory")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn test_postgres_backend_requires_database_url() {
        let err = load(&[("JWT_SECRET", "s3cret")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("JWT_SECRET", "s3cret"), ("DATABASE_URL", "postgres://db/shop")]).unwrap();
        assert_eq!(config.port, 4000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.storage, StorageBackend::Postgres);
        assert_eq!(config.token_ttl, Duration::days(30));
        assert_eq!(config.bcrypt_cost, 10);
        assert_eq!(config.hash_algorithm, HashAlgorithm::Bcrypt);
        assert_eq!(config.bind_addr(), "0.0.0.0:4000");
    }

    #[test]
    fn test_memory_backend_without_database_url() {
        let config = load(&[
            ("JWT_SECRET", "s3cret"),
            ("STORAGE_BACKEND", "memory"),
            ("PORT", "8081"),
            ("PASSWORD_HASH_ALGORITHM", "argon2"),
        ])
        .unwrap();
        assert_eq!(config.storage, StorageBackend::Memory);
        assert!(config.database_url.is_none());
        assert_eq!(config.port, 8081);
        assert_eq!(config.hash_algorithm, HashAlgorithm::Argon2);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let base = [("JWT_SECRET", "s3cret"), ("STORAGE_BACKEND", "memory")];

        let err = load(&[base[0], base[1], ("PORT", "not-a-port")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));

        let err = load(&[base[0], base[1], ("BCRYPT_COST", "3")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "BCRYPT_COST", .. }));

        let err = load(&[base[0], base[1], ("TOKEN_TTL_DAYS", "0")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "TOKEN_TTL_DAYS", .. }));

        let err = load(&[base[0], base[1], ("TOKEN_TTL_DAYS", "200000000000000")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "TOKEN_TTL_DAYS", .. }));

        let err = load(&[base[0], ("STORAGE_BACKEND", "mongo")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "STORAGE_BACKEND", .. }));
    }

    #[test]
    fn test_debug_redacts_secret() {
        let config = load(&[("JWT_SECRET", "super-secret-value"), ("DATABASE_URL", "postgres://u:p@db/shop")]).unwrap();
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret-value"));
        assert!(!rendered.contains("u:p@db"));
    }
}
