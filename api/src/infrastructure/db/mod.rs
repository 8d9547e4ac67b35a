use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sqlx::AnyPool;
use sqlx::any::AnyPoolOptions;

use crate::application::error::{AppError, AppResult};

pub type DbPool = AnyPool;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreRuntime {
    /// Long-lived server process talking to a remote database.
    Server,
    /// Local database file owned by a native runtime.
    Embedded,
}

/// Where the store lives, resolved from `DATABASE_URL` / `DATABASE_AUTH_TOKEN`.
#[derive(Clone, PartialEq, Eq)]
pub enum StoreTarget {
    Server {
        url: String,
        auth_token: Option<String>,
    },
    Embedded {
        path: PathBuf,
    },
}

impl fmt::Debug for StoreTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreTarget::Server { url, auth_token } => f
                .debug_struct("Server")
                .field("url", &redact_url(url))
                .field("auth_token", &auth_token.as_ref().map(|_| "<redacted>"))
                .finish(),
            StoreTarget::Embedded { path } => {
                f.debug_struct("Embedded").field("path", path).finish()
            }
        }
    }
}

impl StoreTarget {
    /// `postgres://` URLs select the server path; `sqlite:`/`file:` URLs and
    /// bare paths select the embedded path.
    pub fn parse(database_url: &str, auth_token: Option<&str>) -> Self {
        let raw = database_url.trim();
        let auth_token = auth_token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        if raw.starts_with("postgres://") || raw.starts_with("postgresql://") {
            return StoreTarget::Server {
                url: raw.to_string(),
                auth_token,
            };
        }
        let path = raw
            .strip_prefix("sqlite://")
            .or_else(|| raw.strip_prefix("sqlite:"))
            .or_else(|| raw.strip_prefix("file://"))
            .or_else(|| raw.strip_prefix("file:"))
            .unwrap_or(raw);
        let path = path.split('?').next().unwrap_or(path);
        StoreTarget::Embedded {
            path: PathBuf::from(path),
        }
    }

    pub fn runtime(&self) -> StoreRuntime {
        match self {
            StoreTarget::Server { .. } => StoreRuntime::Server,
            StoreTarget::Embedded { .. } => StoreRuntime::Embedded,
        }
    }
}

/// One pool per runtime instance. Both construction paths yield the same
/// driver-agnostic pool, so repositories never know which backend they use.
#[derive(Clone)]
pub struct Store {
    pool: DbPool,
    runtime: StoreRuntime,
}

impl Store {
    pub async fn connect(target: &StoreTarget, max_connections: u32) -> AppResult<Self> {
        match target {
            StoreTarget::Server { url, auth_token } => {
                Self::connect_server(url, auth_token.as_deref(), max_connections).await
            }
            StoreTarget::Embedded { path } => Self::connect_embedded(path).await,
        }
    }

    pub async fn connect_server(
        url: &str,
        auth_token: Option<&str>,
        max_connections: u32,
    ) -> AppResult<Self> {
        sqlx::any::install_default_drivers();
        let url = with_auth_token(url, auth_token)?;
        let pool = AnyPoolOptions::new()
            .max_connections(max_connections.max(1))
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(&url)
            .await
            .map_err(|e| AppError::Connection(e.to_string()))?;
        tracing::info!(url = %redact_url(&url), "store_connected_server");
        Ok(Self {
            pool,
            runtime: StoreRuntime::Server,
        })
    }

    /// Opens (creating when missing) a local database file.
    pub async fn connect_embedded(path: impl AsRef<Path>) -> AppResult<Self> {
        sqlx::any::install_default_drivers();
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Connection(e.to_string()))?;
        }
        let url = format!("sqlite://{}?mode=rwc", path.display());
        // A native runtime owns a single connection.
        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .connect(&url)
            .await
            .map_err(|e| AppError::Connection(e.to_string()))?;
        tracing::info!(path = %path.display(), "store_connected_embedded");
        Ok(Self {
            pool,
            runtime: StoreRuntime::Embedded,
        })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        // Uses compile-time embedded migrations under ./migrations
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn runtime(&self) -> StoreRuntime {
        self.runtime
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn with_auth_token(url: &str, auth_token: Option<&str>) -> AppResult<String> {
    let Some(token) = auth_token.filter(|t| !t.is_empty()) else {
        return Ok(url.to_string());
    };
    let mut parsed = url::Url::parse(url)
        .map_err(|e| AppError::Connection(format!("invalid DATABASE_URL: {e}")))?;
    parsed
        .set_password(Some(token))
        .map_err(|_| AppError::Connection("DATABASE_URL cannot carry credentials".into()))?;
    Ok(parsed.to_string())
}

fn redact_url(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("redacted"));
            }
            parsed.to_string()
        }
        Err(_) => "<invalid url>".to_string(),
    }
}

pub mod repositories;
