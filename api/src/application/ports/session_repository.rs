use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::auth::session::Session;

/// Sessions are looked up by the SHA-256 of their token; the token itself is never stored.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create_session(&self, session: &Session, token_hash: &str) -> anyhow::Result<()>;
    async fn find_by_token_hash(&self, token_hash: &str) -> anyhow::Result<Option<Session>>;
    async fn touch_session(
        &self,
        id: Uuid,
        expires_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> anyhow::Result<()>;
    async fn delete_by_token_hash(&self, token_hash: &str) -> anyhow::Result<bool>;
    async fn delete_by_id(&self, id: Uuid) -> anyhow::Result<bool>;
    async fn delete_for_user(&self, user_id: Uuid) -> anyhow::Result<u64>;
    async fn purge_expired(&self, now: DateTime<Utc>) -> anyhow::Result<u64>;
}
