use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::any::AnyRow;
use uuid::Uuid;

use crate::application::ports::session_repository::SessionRepository;
use crate::domain::auth::session::Session;
use crate::domain::time::to_millis;
use crate::infrastructure::db::DbPool;
use crate::infrastructure::db::repositories::{opt_text_col, time_col, uuid_col};

pub struct SqlxSessionRepository {
    pub pool: DbPool,
}

impl SqlxSessionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn session_from_row(r: &AnyRow) -> anyhow::Result<Session> {
    Ok(Session {
        id: uuid_col(r, "id")?,
        user_id: uuid_col(r, "user_id")?,
        expires_at: time_col(r, "expires_at")?,
        ip_address: opt_text_col(r, "ip_address")?,
        user_agent: opt_text_col(r, "user_agent")?,
        created_at: time_col(r, "created_at")?,
        updated_at: time_col(r, "updated_at")?,
    })
}

#[async_trait]
impl SessionRepository for SqlxSessionRepository {
    async fn create_session(&self, session: &Session, token_hash: &str) -> anyhow::Result<()> {
        sqlx::query(
            r#"INSERT INTO sessions
                 (id, user_id, token_hash, expires_at, ip_address, user_agent, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
        )
        .bind(session.id.to_string())
        .bind(session.user_id.to_string())
        .bind(token_hash)
        .bind(to_millis(session.expires_at))
        .bind(session.ip_address.as_deref())
        .bind(session.user_agent.as_deref())
        .bind(to_millis(session.created_at))
        .bind(to_millis(session.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_token_hash(&self, token_hash: &str) -> anyhow::Result<Option<Session>> {
        let row = sqlx::query(
            r#"SELECT id, user_id, expires_at, ip_address, user_agent, created_at, updated_at
               FROM sessions WHERE token_hash = $1"#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(session_from_row).transpose()
    }

    async fn touch_session(
        &self,
        id: Uuid,
        expires_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        sqlx::query("UPDATE sessions SET expires_at = $2, updated_at = $3 WHERE id = $1")
            .bind(id.to_string())
            .bind(to_millis(expires_at))
            .bind(to_millis(updated_at))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_by_token_hash(&self, token_hash: &str) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_by_id(&self, id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_for_user(&self, user_id: Uuid) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(to_millis(now))
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected())
    }
}
