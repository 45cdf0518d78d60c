use std::{env, str::FromStr};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres { database_url: String, max_connections: u32 },
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub jwt_access_secret: String,
}

impl Config {
    /// Reads `.env` (if present) and then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        load_dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Only the token signing secret. Storage settings are not read.
    pub fn jwt_secret_from_env() -> Result<String, ConfigError> {
        load_dotenv();
        jwt_secret(&|name: &str| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = parse_or(&lookup, "PORT", 8080)?;

        let storage = match lookup("STORAGE").as_deref().unwrap_or("postgres") {
            "postgres" => StorageBackend::Postgres {
                database_url: lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
                max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?,
            },
            "memory" => StorageBackend::Memory,
            other => {
                return Err(ConfigError::Invalid { name: "STORAGE", value: other.to_string() });
            }
        };

        let jwt_access_secret = jwt_secret(&lookup)?;

        Ok(Self { host, port, storage, jwt_access_secret })
    }
}

fn load_dotenv() {
    dotenv::from_filename(".env")
        .or_else(|_| dotenv::dotenv())
        .ok();
}

fn jwt_secret<F>(lookup: &F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup("JWT_ACCESS_SECRET")
        .filter(|s| !s.is_empty())
        .ok_or(ConfigError::Missing("JWT_ACCESS_SECRET"))
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_to_postgres_on_localhost() {
        let config = Config::from_lookup(lookup_from(&[
            ("DATABASE_URL", "postgres://localhost/snippets"),
            ("JWT_ACCESS_SECRET", "s3cret"),
        ]))
        .unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(
            config.storage,
            StorageBackend::Postgres {
                database_url: "postgres://localhost/snippets".to_string(),
                max_connections: 5
            }
        );
    }

    #[test]
    fn memory_storage_needs_no_database_url() {
        let config = Config::from_lookup(lookup_from(&[
            ("STORAGE", "memory"),
            ("PORT", "9000"),
            ("JWT_ACCESS_SECRET", "s3cret"),
        ]))
        .unwrap();

        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn secret_is_read_without_storage_settings() {
        let lookup = lookup_from(&[("JWT_ACCESS_SECRET", "s3cret")]);
        assert_eq!(jwt_secret(&lookup).unwrap(), "s3cret");
        assert!(matches!(Config::from_lookup(lookup), Err(ConfigError::Missing("DATABASE_URL"))));

        let err = jwt_secret(&lookup_from(&[("JWT_ACCESS_SECRET", "")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_ACCESS_SECRET")));
    }

    #[test]
    fn reports_missing_and_invalid_values() {
        let err = Config::from_lookup(lookup_from(&[("STORAGE", "memory")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("JWT_ACCESS_SECRET")));

        let err = Config::from_lookup(lookup_from(&[
            ("STORAGE", "memory"),
            ("PORT", "eighty"),
            ("JWT_ACCESS_SECRET", "s3cret"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "PORT", .. }));

        let err = Config::from_lookup(lookup_from(&[("STORAGE", "redis"), ("JWT_ACCESS_SECRET", "x")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "STORAGE", .. }));
    }
}
