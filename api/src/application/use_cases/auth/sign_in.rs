use crate::application::dto::auth::{ClientInfo, SignInRequest};
use crate::application::error::{AppError, AppResult};
use crate::application::ports::session_repository::SessionRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::credentials::verify_password;
use crate::application::use_cases::auth::{IssuedSession, SessionPolicy, issue_session};

pub struct SignIn<'a, U, S>
where
    U: UserRepository + ?Sized,
    S: SessionRepository + ?Sized,
{
    pub users: &'a U,
    pub sessions: &'a S,
    pub policy: SessionPolicy,
}

impl<'a, U, S> SignIn<'a, U, S>
where
    U: UserRepository + ?Sized,
    S: SessionRepository + ?Sized,
{
    pub async fn execute(
        &self,
        req: &SignInRequest,
        client: &ClientInfo,
    ) -> AppResult<IssuedSession> {
        let email = req.validate()?;
        let Some(record) = self.users.find_by_email(&email).await? else {
            return Err(AppError::invalid_credentials());
        };
        if !verify_password(&req.password, &record.password_hash)? {
            tracing::debug!(user_id = %record.user.id, "password_mismatch");
            return Err(AppError::invalid_credentials());
        }
        issue_session(self.sessions, self.policy, record.user, client).await
    }
}
