// Runtime configuration loaded from the environment (and `.env` via dotenv)

use std::time::Duration;

/// Minimum accepted length for the JWT signing secret
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Errors raised while reading configuration
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },

    #[error("JWT_SECRET must be at least 32 characters long")]
    WeakJwtSecret,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: String,
    /// Access token lifetime in seconds
    pub jwt_expires_in_secs: i64,
    pub host: String,
    pub port: u16,
    pub request_timeout: Duration,
    /// Optional bootstrap manager account created on first start
    pub bootstrap_manager: Option<BootstrapManager>,
}

/// Credentials for the first manager account
#[derive(Debug, Clone)]
pub struct BootstrapManager {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl AppConfig {
    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let jwt_secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            return Err(ConfigError::WeakJwtSecret);
        }

        let bootstrap_manager = match (
            lookup("BOOTSTRAP_MANAGER_EMAIL"),
            lookup("BOOTSTRAP_MANAGER_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(BootstrapManager {
                email,
                password,
                name: lookup("BOOTSTRAP_MANAGER_NAME").unwrap_or_else(|| "Hotel Manager".to_string()),
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            database_max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            jwt_secret,
            jwt_expires_in_secs: parse_or(&lookup, "JWT_EXPIRES_IN_SECS", 604_800)?,
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 3001)?,
            request_timeout: Duration::from_secs(parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?),
            bootstrap_manager,
        })
    }

    /// Socket address string the server binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "an_adequately_long_secret_for_signing_tokens";

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/hotel"),
            ("JWT_SECRET", SECRET),
        ]))
        .unwrap();

        assert_eq!(config.port, 3001);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.jwt_expires_in_secs, 604_800);
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.bootstrap_manager.is_none());
        assert_eq!(config.bind_addr(), "0.0.0.0:3001");
    }

    #[test]
    fn test_missing_database_url() {
        let result = AppConfig::from_lookup(lookup_from(&[("JWT_SECRET", SECRET)]));
        assert_eq!(result.unwrap_err(), ConfigError::Missing("DATABASE_URL"));
    }

    #[test]
    fn test_short_secret_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/hotel"),
            ("JWT_SECRET", "short"),
        ]));
        assert_eq!(result.unwrap_err(), ConfigError::WeakJwtSecret);
    }

    #[test]
    fn test_invalid_port() {
        let result = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/hotel"),
            ("JWT_SECRET", SECRET),
            ("PORT", "not-a-port"),
        ]));
        assert!(matches!(result, Err(ConfigError::Invalid { name: "PORT", .. })));
    }

    #[test]
    fn test_bootstrap_manager_requires_both_fields() {
        let partial = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/hotel"),
            ("JWT_SECRET", SECRET),
            ("BOOTSTRAP_MANAGER_EMAIL", "manager@hotel.test"),
        ]))
        .unwrap();
        assert!(partial.bootstrap_manager.is_none());

        let full = AppConfig::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/hotel"),
            ("JWT_SECRET", SECRET),
            ("BOOTSTRAP_MANAGER_EMAIL", "manager@hotel.test"),
            ("BOOTSTRAP_MANAGER_PASSWORD", "manager-password"),
        ]))
        .unwrap();
        let manager = full.bootstrap_manager.unwrap();
        assert_eq!(manager.email, "manager@hotel.test");
        assert_eq!(manager.name, "Hotel Manager");
    }
}
