//! Shared fixtures for unit tests: throwaway embedded stores and seed rows.

use axum::body::to_bytes;
use axum::response::Response;
use serde::de::DeserializeOwned;
use tempfile::TempDir;
use uuid::Uuid;

use crate::application::ports::user_repository::UserRepository;
use crate::bootstrap::app_context::{AppContext, AppServices};
use crate::bootstrap::config::Config;
use crate::domain::finance::account::{Account, AccountKind};
use crate::domain::time::{from_millis, now_millis};
use crate::domain::users::user::User;
use crate::infrastructure::db::Store;
use crate::infrastructure::db::repositories::user_repository_sqlx::SqlxUserRepository;

/// The returned directory must outlive the store.
pub(crate) async fn embedded_store() -> (Store, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = Store::connect_embedded(dir.path().join("test.db"))
        .await
        .expect("open embedded store");
    store.migrate().await.expect("migrate");
    (store, dir)
}

pub(crate) fn sample_user(email: &str) -> User {
    let now = from_millis(now_millis());
    User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        name: email.split('@').next().unwrap_or("user").to_string(),
        image: None,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) async fn seed_user(store: &Store, email: &str) -> User {
    let user = sample_user(email);
    SqlxUserRepository::new(store.pool().clone())
        .create_user(&user, "$argon2id$not-a-real-hash")
        .await
        .expect("seed user");
    user
}

pub(crate) fn sample_account(user_id: Uuid, name: &str) -> Account {
    let now = from_millis(now_millis());
    Account {
        id: Uuid::new_v4(),
        user_id,
        name: name.to_string(),
        kind: AccountKind::Checking,
        currency: "USD".into(),
        balance_minor: 12_345,
        created_at: now,
        updated_at: now,
    }
}

pub(crate) const TRUSTED_ORIGIN: &str = "https://app.example.com";

/// Application context over a fresh embedded store, trusting [`TRUSTED_ORIGIN`].
pub(crate) async fn test_context() -> (AppContext, TempDir) {
    let (store, dir) = embedded_store().await;
    let cfg = Config::from_lookup(|key| match key {
        "CORS_ORIGIN" => Some(TRUSTED_ORIGIN.to_string()),
        _ => None,
    })
    .expect("test config");
    (AppContext::new(cfg, AppServices::from_store(store)), dir)
}

pub(crate) async fn read_json<T: DeserializeOwned>(res: Response) -> T {
    let bytes = to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("json body")
}
