use uuid::Uuid;

use crate::application::dto::auth::{ClientInfo, SignUpRequest};
use crate::application::error::{AppError, AppResult};
use crate::application::ports::session_repository::SessionRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::credentials::hash_password;
use crate::application::use_cases::auth::{IssuedSession, SessionPolicy, issue_session};
use crate::domain::time::{from_millis, now_millis};
use crate::domain::users::user::User;

pub struct SignUp<'a, U, S>
where
    U: UserRepository + ?Sized,
    S: SessionRepository + ?Sized,
{
    pub users: &'a U,
    pub sessions: &'a S,
    pub policy: SessionPolicy,
}

impl<'a, U, S> SignUp<'a, U, S>
where
    U: UserRepository + ?Sized,
    S: SessionRepository + ?Sized,
{
    pub async fn execute(
        &self,
        req: &SignUpRequest,
        client: &ClientInfo,
    ) -> AppResult<IssuedSession> {
        let (email, name, image) = req.validate()?;
        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("user already exists".into()));
        }
        let hash = hash_password(&req.password)?;
        let now = from_millis(now_millis());
        let user = User {
            id: Uuid::new_v4(),
            email,
            name,
            image,
            created_at: now,
            updated_at: now,
        };
        // A concurrent sign-up can still win the race on the unique index.
        self.users
            .create_user(&user, &hash)
            .await
            .map_err(|e| match AppError::from(e) {
                AppError::Conflict(_) => AppError::Conflict("user already exists".into()),
                other => other,
            })?;
        tracing::info!(user_id = %user.id, "user_registered");
        issue_session(self.sessions, self.policy, user, client).await
    }
}
