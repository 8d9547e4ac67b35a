use chrono::Duration;
use uuid::Uuid;

use crate::application::dto::auth::ClientInfo;
use crate::application::error::AppResult;
use crate::application::ports::session_repository::SessionRepository;
use crate::application::services::credentials::{generate_session_token, hash_session_token};
use crate::domain::auth::session::Session;
use crate::domain::time::{from_millis, now_millis};
use crate::domain::users::user::User;

pub mod delete_account;
pub mod get_session;
pub mod sign_in;
pub mod sign_out;
pub mod sign_up;

#[derive(Debug, Clone, Copy)]
pub struct SessionPolicy {
    pub expires_in: Duration,
    pub update_age: Duration,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            expires_in: Duration::days(7),
            update_age: Duration::days(1),
        }
    }
}

/// A freshly created session; `token` is the only copy of the plaintext token.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub session: Session,
    pub user: User,
}

pub(crate) async fn issue_session<S: SessionRepository + ?Sized>(
    sessions: &S,
    policy: SessionPolicy,
    user: User,
    client: &ClientInfo,
) -> AppResult<IssuedSession> {
    let token = generate_session_token();
    let now = from_millis(now_millis());
    let session = Session {
        id: Uuid::new_v4(),
        user_id: user.id,
        expires_at: now + policy.expires_in,
        ip_address: client.ip_address.clone(),
        user_agent: client.user_agent.clone(),
        created_at: now,
        updated_at: now,
    };
    sessions
        .create_session(&session, &hash_session_token(&token))
        .await?;
    Ok(IssuedSession {
        token,
        session,
        user,
    })
}
