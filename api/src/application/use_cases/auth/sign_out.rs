use crate::application::error::AppResult;
use crate::application::ports::session_repository::SessionRepository;
use crate::application::services::credentials::hash_session_token;

pub struct SignOut<'a, S: SessionRepository + ?Sized> {
    pub sessions: &'a S,
}

impl<'a, S: SessionRepository + ?Sized> SignOut<'a, S> {
    /// Returns whether a live session was revoked.
    pub async fn execute(&self, token: &str) -> AppResult<bool> {
        Ok(self
            .sessions
            .delete_by_token_hash(&hash_session_token(token))
            .await?)
    }
}
