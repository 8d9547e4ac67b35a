use uuid::Uuid;

use crate::application::error::{AppError, AppResult};
use crate::application::ports::session_repository::SessionRepository;
use crate::application::ports::user_repository::UserRepository;

/// Removes a user with every session they hold. Habits, accounts,
/// transactions and budgets go with the user row.
pub struct DeleteAccount<'a, U, S>
where
    U: UserRepository + ?Sized,
    S: SessionRepository + ?Sized,
{
    pub users: &'a U,
    pub sessions: &'a S,
}

impl<'a, U, S> DeleteAccount<'a, U, S>
where
    U: UserRepository + ?Sized,
    S: SessionRepository + ?Sized,
{
    pub async fn execute(&self, user_id: Uuid) -> AppResult<()> {
        let revoked = self.sessions.delete_for_user(user_id).await?;
        if !self.users.delete_user(user_id).await? {
            return Err(AppError::NotFound("user"));
        }
        tracing::info!(%user_id, revoked_sessions = revoked, "account_deleted");
        Ok(())
    }
}
