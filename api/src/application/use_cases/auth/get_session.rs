use chrono::{DateTime, Utc};

use crate::application::error::{AppError, AppResult};
use crate::application::ports::session_repository::SessionRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::credentials::hash_session_token;
use crate::application::use_cases::auth::SessionPolicy;
use crate::domain::auth::session::Session;
use crate::domain::time::{from_millis, to_millis};
use crate::domain::users::user::User;

#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub session: Session,
    pub user: User,
    /// Set when this lookup extended the expiry; the cookie should be re-issued.
    pub refreshed: bool,
}

pub struct GetSession<'a, U, S>
where
    U: UserRepository + ?Sized,
    S: SessionRepository + ?Sized,
{
    pub users: &'a U,
    pub sessions: &'a S,
    pub policy: SessionPolicy,
}

impl<'a, U, S> GetSession<'a, U, S>
where
    U: UserRepository + ?Sized,
    S: SessionRepository + ?Sized,
{
    pub async fn execute(&self, token: &str) -> AppResult<Option<ActiveSession>> {
        self.execute_at(token, Utc::now()).await
    }

    pub async fn require(&self, token: Option<&str>) -> AppResult<ActiveSession> {
        let token = token.ok_or_else(AppError::unauthorized)?;
        self.execute(token).await?.ok_or_else(AppError::unauthorized)
    }

    pub async fn execute_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> AppResult<Option<ActiveSession>> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(None);
        }
        let Some(mut session) = self
            .sessions
            .find_by_token_hash(&hash_session_token(token))
            .await?
        else {
            return Ok(None);
        };
        if session.is_expired(now) {
            tracing::debug!(session_id = %session.id, "session_expired");
            self.sessions.delete_by_id(session.id).await?;
            return Ok(None);
        }
        let Some(user) = self.users.find_by_id(session.user_id).await? else {
            self.sessions.delete_by_id(session.id).await?;
            return Ok(None);
        };

        let mut refreshed = false;
        if session.needs_refresh(now, self.policy.update_age) {
            let now = from_millis(to_millis(now));
            session.expires_at = now + self.policy.expires_in;
            session.updated_at = now;
            self.sessions
                .touch_session(session.id, session.expires_at, session.updated_at)
                .await?;
            refreshed = true;
        }
        Ok(Some(ActiveSession {
            session,
            user,
            refreshed,
        }))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::application::dto::auth::ClientInfo;
    use crate::application::use_cases::auth::{IssuedSession, issue_session};
    use crate::infrastructure::db::Store;
    use crate::infrastructure::db::repositories::session_repository_sqlx::SqlxSessionRepository;
    use crate::infrastructure::db::repositories::user_repository_sqlx::SqlxUserRepository;
    use crate::test_support::{embedded_store, seed_user};

    struct Fixture {
        users: SqlxUserRepository,
        sessions: SqlxSessionRepository,
        issued: IssuedSession,
    }

    async fn fixture(store: &Store) -> Fixture {
        let users = SqlxUserRepository::new(store.pool().clone());
        let sessions = SqlxSessionRepository::new(store.pool().clone());
        let user = seed_user(store, "ada@example.com").await;
        let issued = issue_session(
            &sessions,
            SessionPolicy::default(),
            user,
            &ClientInfo::default(),
        )
        .await
        .unwrap();
        Fixture {
            users,
            sessions,
            issued,
        }
    }

    impl Fixture {
        fn use_case(&self) -> GetSession<'_, SqlxUserRepository, SqlxSessionRepository> {
            GetSession {
                users: &self.users,
                sessions: &self.sessions,
                policy: SessionPolicy::default(),
            }
        }

        async fn stored(&self) -> Option<Session> {
            self.sessions
                .find_by_token_hash(&hash_session_token(&self.issued.token))
                .await
                .unwrap()
        }
    }

    #[tokio::test]
    async fn fresh_session_is_returned_untouched() {
        let (store, _dir) = embedded_store().await;
        let f = fixture(&store).await;
        let now = f.issued.session.created_at + Duration::hours(1);

        let active = f
            .use_case()
            .execute_at(&f.issued.token, now)
            .await
            .unwrap()
            .expect("active session");
        assert!(!active.refreshed);
        assert_eq!(active.user.id, f.issued.user.id);
        assert_eq!(active.session, f.issued.session);
    }

    #[tokio::test]
    async fn expired_session_is_rejected_and_deleted() {
        let (store, _dir) = embedded_store().await;
        let f = fixture(&store).await;
        let now = f.issued.session.expires_at + Duration::seconds(1);

        let found = f.use_case().execute_at(&f.issued.token, now).await.unwrap();
        assert!(found.is_none());
        assert!(f.stored().await.is_none());

        let err = f.use_case().require(Some(&f.issued.token)).await.unwrap_err();
        assert!(matches!(err, AppError::Authentication(_)));
    }

    #[tokio::test]
    async fn session_past_update_age_is_extended() {
        let (store, _dir) = embedded_store().await;
        let f = fixture(&store).await;
        let policy = SessionPolicy::default();
        let now = f.issued.session.updated_at + policy.update_age + Duration::minutes(5);

        let active = f
            .use_case()
            .execute_at(&f.issued.token, now)
            .await
            .unwrap()
            .expect("active session");
        assert!(active.refreshed);
        assert_eq!(active.session.expires_at, now + policy.expires_in);
        assert_eq!(active.session.updated_at, now);
        assert!(active.session.expires_at > f.issued.session.expires_at);

        let stored = f.stored().await.expect("stored session");
        assert_eq!(stored.expires_at, active.session.expires_at);
        assert_eq!(stored.updated_at, now);
    }

    #[tokio::test]
    async fn unknown_or_blank_tokens_find_nothing() {
        let (store, _dir) = embedded_store().await;
        let f = fixture(&store).await;
        let now = Utc::now();
        assert!(f.use_case().execute_at("  ", now).await.unwrap().is_none());
        assert!(f.use_case().execute_at("not-a-token", now).await.unwrap().is_none());
        assert!(f.stored().await.is_some());
    }
}
