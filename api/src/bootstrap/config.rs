use std::env;
use std::fmt;

use crate::application::use_cases::auth::SessionPolicy;
use crate::infrastructure::db::StoreTarget;

const DEFAULT_DATABASE_URL: &str = "sqlite://./data/tracker.db";
/// Ten years; keeps expiry arithmetic far from `chrono`'s range limits.
pub const MAX_SESSION_EXPIRES_SECS: i64 = 10 * 365 * 24 * 60 * 60;

#[derive(Clone)]
pub struct Config {
    pub api_port: u16,
    pub database_url: String,
    pub database_auth_token: Option<String>,
    pub db_max_connections: u32,
    pub cors_origins: Vec<String>,
    pub session_expires_secs: i64,
    pub session_update_age_secs: i64,
    pub session_purge_interval_secs: u64,
    pub is_production: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_port", &self.api_port)
            .field("store", &self.store_target())
            .field("db_max_connections", &self.db_max_connections)
            .field("cors_origins", &self.cors_origins)
            .field("session_expires_secs", &self.session_expires_secs)
            .field("session_update_age_secs", &self.session_update_age_secs)
            .field("session_purge_interval_secs", &self.session_purge_interval_secs)
            .field("is_production", &self.is_production)
            .finish()
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|s| s.trim().parse().ok()).unwrap_or(default)
}

fn normalize_origin(origin: &str) -> String {
    origin.trim().trim_end_matches('/').to_string()
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let api_port = parse_or(lookup("API_PORT"), 3000);
        let database_url = lookup("DATABASE_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.into());
        let database_auth_token = lookup("DATABASE_AUTH_TOKEN")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let db_max_connections = parse_or(lookup("DB_MAX_CONNECTIONS"), 10);
        let cors_origins: Vec<String> = lookup("CORS_ORIGIN")
            .unwrap_or_default()
            .split(',')
            .map(normalize_origin)
            .filter(|o| !o.is_empty())
            .collect();
        let session_expires_secs = parse_or(lookup("SESSION_EXPIRES_SECS"), 60 * 60 * 24 * 7);
        let session_update_age_secs = parse_or(lookup("SESSION_UPDATE_AGE_SECS"), 60 * 60 * 24);
        let session_purge_interval_secs = parse_or(lookup("SESSION_PURGE_INTERVAL_SECS"), 60 * 60);
        let is_production = matches!(
            lookup("RUST_ENV").as_deref(),
            Some("production") | Some("prod")
        );

        if session_expires_secs <= 0 || session_expires_secs > MAX_SESSION_EXPIRES_SECS {
            anyhow::bail!(
                "SESSION_EXPIRES_SECS must be between 1 and {MAX_SESSION_EXPIRES_SECS}"
            );
        }
        if session_update_age_secs <= 0 || session_update_age_secs > session_expires_secs {
            anyhow::bail!("SESSION_UPDATE_AGE_SECS must be positive and not exceed SESSION_EXPIRES_SECS");
        }

        // Production hardening: the origin allow-list must be explicit
        if is_production {
            if cors_origins.is_empty() {
                anyhow::bail!(
                    "CORS_ORIGIN must list the allowed origins in production (e.g., https://app.example.com)"
                );
            }
            if let Some(bad) = cors_origins.iter().find(|o| !o.contains("://")) {
                anyhow::bail!("CORS_ORIGIN entry {bad:?} is not a full origin");
            }
        }

        Ok(Self {
            api_port,
            database_url,
            database_auth_token,
            db_max_connections,
            cors_origins,
            session_expires_secs,
            session_update_age_secs,
            session_purge_interval_secs,
            is_production,
        })
    }

    pub fn store_target(&self) -> StoreTarget {
        StoreTarget::parse(&self.database_url, self.database_auth_token.as_deref())
    }

    pub fn session_policy(&self) -> SessionPolicy {
        SessionPolicy {
            expires_in: chrono::Duration::seconds(self.session_expires_secs),
            update_age: chrono::Duration::seconds(self.session_update_age_secs),
        }
    }

    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        let origin = normalize_origin(origin);
        self.cors_origins.iter().any(|o| *o == origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::StoreRuntime;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> anyhow::Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_use_the_embedded_store() {
        let cfg = config_from(&[]).unwrap();
        assert_eq!(cfg.api_port, 3000);
        assert_eq!(cfg.store_target().runtime(), StoreRuntime::Embedded);
        assert_eq!(cfg.session_policy().expires_in, chrono::Duration::days(7));
        assert_eq!(cfg.session_policy().update_age, chrono::Duration::days(1));
        assert!(cfg.cors_origins.is_empty());
    }

    #[test]
    fn origins_are_split_and_normalized() {
        let cfg = config_from(&[(
            "CORS_ORIGIN",
            "https://app.example.com/, tracker://, ,http://localhost:8081",
        )])
        .unwrap();
        assert_eq!(
            cfg.cors_origins,
            vec!["https://app.example.com", "tracker://", "http://localhost:8081"]
        );
        assert!(cfg.is_origin_allowed("https://app.example.com"));
        assert!(cfg.is_origin_allowed("http://localhost:8081/"));
        assert!(!cfg.is_origin_allowed("https://evil.example.com"));
    }

    #[test]
    fn server_store_carries_the_auth_token() {
        let cfg = config_from(&[
            ("DATABASE_URL", "postgres://tracker@db.internal/tracker"),
            ("DATABASE_AUTH_TOKEN", "tok"),
        ])
        .unwrap();
        assert_eq!(
            cfg.store_target(),
            StoreTarget::Server {
                url: "postgres://tracker@db.internal/tracker".into(),
                auth_token: Some("tok".into()),
            }
        );
        assert!(!format!("{cfg:?}").contains("\"tok\""));
    }

    #[test]
    fn production_requires_origins() {
        assert!(config_from(&[("RUST_ENV", "production")]).is_err());
        assert!(
            config_from(&[("RUST_ENV", "production"), ("CORS_ORIGIN", "app.example.com")])
                .is_err()
        );
        let cfg = config_from(&[
            ("RUST_ENV", "prod"),
            ("CORS_ORIGIN", "https://app.example.com"),
        ])
        .unwrap();
        assert!(cfg.is_production);
    }

    #[test]
    fn session_expiry_is_capped() {
        let too_long = (MAX_SESSION_EXPIRES_SECS + 1).to_string();
        assert!(config_from(&[("SESSION_EXPIRES_SECS", too_long.as_str())]).is_err());
        assert!(config_from(&[("SESSION_EXPIRES_SECS", "9223372036854775807")]).is_err());
        assert!(config_from(&[("SESSION_EXPIRES_SECS", "0")]).is_err());

        let max = MAX_SESSION_EXPIRES_SECS.to_string();
        let cfg = config_from(&[("SESSION_EXPIRES_SECS", max.as_str())]).unwrap();
        assert_eq!(
            cfg.session_policy().expires_in,
            chrono::Duration::seconds(MAX_SESSION_EXPIRES_SECS)
        );
    }

    #[test]
    fn update_age_cannot_exceed_expiry() {
        assert!(
            config_from(&[
                ("SESSION_EXPIRES_SECS", "3600"),
                ("SESSION_UPDATE_AGE_SECS", "7200"),
            ])
            .is_err()
        );
    }
}
