use std::env;

use chrono::FixedOffset;

use crate::crypto::{CryptoError, JournalKey};

/// Most extreme real-world UTC offset, in minutes.
const MAX_DAY_OFFSET_MINUTES: i32 = 14 * 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} is invalid: {reason}")]
    Invalid { var: &'static str, reason: String },

    #[error("ENCRYPTION_KEY is unusable: {0}")]
    Key(#[from] CryptoError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Clone)]
pub struct Config {
    pub store: StoreBackend,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,

    pub jwt_secret: String,
    pub journal_key: JournalKey,
    pub day_offset: FixedOffset,
}

impl Config {
    /// Reads the process environment. A missing or weak `ENCRYPTION_KEY` is a
    /// startup failure.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let store = match var("CHECKIN_STORE").as_deref() {
            None | Some("postgres") => StoreBackend::Postgres,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "CHECKIN_STORE",
                    reason: format!("unknown backend {other:?}, expected postgres or memory"),
                })
            }
        };

        let database_url = var("DATABASE_URL");
        if store == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let secret = var("ENCRYPTION_KEY").ok_or(ConfigError::Missing("ENCRYPTION_KEY"))?;
        let journal_key = JournalKey::from_secret(&secret)?;

        let offset_minutes: i32 = parse_or(var("CHECKIN_DAY_OFFSET_MINUTES"), "CHECKIN_DAY_OFFSET_MINUTES", 0)?;
        if !(-MAX_DAY_OFFSET_MINUTES..=MAX_DAY_OFFSET_MINUTES).contains(&offset_minutes) {
            return Err(ConfigError::Invalid {
                var: "CHECKIN_DAY_OFFSET_MINUTES",
                reason: format!("must be within ±{MAX_DAY_OFFSET_MINUTES}"),
            });
        }
        let day_offset = FixedOffset::east_opt(offset_minutes * 60).ok_or_else(|| ConfigError::Invalid {
            var: "CHECKIN_DAY_OFFSET_MINUTES",
            reason: "out of range".into(),
        })?;

        Ok(Self {
            store,
            database_url,
            db_max_connections: parse_or(var("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", 20)?,
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(var("PORT"), "PORT", 8080)?,
            jwt_secret: var("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?,
            journal_key,
            day_offset,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T>(raw: Option<String>, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    const BASE: [(&str, &str); 3] = [
        ("DATABASE_URL", "postgres://localhost/checkins"),
        ("JWT_SECRET", "jwt-secret"),
        ("ENCRYPTION_KEY", "a-long-enough-journal-secret"),
    ];

    #[test]
    fn defaults_apply() {
        let config = load(&BASE).unwrap();
        assert_eq!(config.store, StoreBackend::Postgres);
        assert_eq!(config.listen_addr(), "0.0.0.0:8080");
        assert_eq!(config.day_offset.local_minus_utc(), 0);
        assert_eq!(config.db_max_connections, 20);
    }

    #[test]
    fn missing_encryption_key_is_fatal() {
        let err = load(&BASE[..2]).err().unwrap();
        assert!(matches!(err, ConfigError::Missing("ENCRYPTION_KEY")));
    }

    #[test]
    fn weak_encryption_key_is_fatal() {
        let mut pairs = BASE.to_vec();
        pairs[2] = ("ENCRYPTION_KEY", "short");
        assert!(matches!(load(&pairs).err().unwrap(), ConfigError::Key(_)));
    }

    #[test]
    fn memory_store_does_not_need_database_url() {
        let config = load(&[
            ("CHECKIN_STORE", "memory"),
            ("JWT_SECRET", "jwt-secret"),
            ("ENCRYPTION_KEY", "a-long-enough-journal-secret"),
        ])
        .unwrap();
        assert_eq!(config.store, StoreBackend::Memory);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn postgres_store_requires_database_url() {
        let err = load(&BASE[1..]).err().unwrap();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));
    }

    #[test]
    fn day_offset_is_parsed_and_bounded() {
        let mut pairs = BASE.to_vec();
        pairs.push(("CHECKIN_DAY_OFFSET_MINUTES", "-300"));
        assert_eq!(load(&pairs).unwrap().day_offset.local_minus_utc(), -300 * 60);

        let mut pairs = BASE.to_vec();
        pairs.push(("CHECKIN_DAY_OFFSET_MINUTES", "1000"));
        assert!(matches!(load(&pairs).err().unwrap(), ConfigError::Invalid { .. }));
    }

    #[test]
    fn extreme_day_offsets_are_rejected_not_panicking() {
        for raw in ["-2147483648", "2147483647", "-841", "841"] {
            let mut pairs = BASE.to_vec();
            pairs.push(("CHECKIN_DAY_OFFSET_MINUTES", raw));
            assert!(
                matches!(load(&pairs).err().unwrap(), ConfigError::Invalid { .. }),
                "offset {raw}"
            );
        }

        let mut pairs = BASE.to_vec();
        pairs.push(("CHECKIN_DAY_OFFSET_MINUTES", "-840"));
        assert_eq!(load(&pairs).unwrap().day_offset.local_minus_utc(), -840 * 60);
    }

    #[test]
    fn bad_port_is_reported() {
        let mut pairs = BASE.to_vec();
        pairs.push(("PORT", "eighty"));
        let err = load(&pairs).err().unwrap();
        assert!(err.to_string().starts_with("PORT is invalid"));
    }
}
