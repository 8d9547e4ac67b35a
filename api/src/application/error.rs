/// Failure kinds surfaced across the data-access boundary.
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Authentication(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("store unavailable: {0}")]
    Connection(String),
    #[error(transparent)]
    Internal(anyhow::Error),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn unauthorized() -> Self {
        AppError::Authentication("invalid or missing session".into())
    }

    pub fn invalid_credentials() -> Self {
        AppError::Authentication("invalid email or password".into())
    }

    /// Message safe to hand to clients; internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Internal(_) => "internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => AppError::Connection(err.to_string()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("record already exists".into())
            }
            _ => AppError::Internal(err.into()),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<sqlx::Error>() {
            Ok(sql) => sql.into(),
            Err(other) => match other.downcast::<AppError>() {
                Ok(app) => app,
                Err(other) => AppError::Internal(other),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_timeouts_are_connection_errors() {
        let err: AppError = anyhow::Error::from(sqlx::Error::PoolTimedOut).into();
        assert!(matches!(err, AppError::Connection(_)));
    }

    #[test]
    fn internal_details_are_hidden() {
        let err: AppError = anyhow::anyhow!("secret column missing").into();
        assert!(matches!(err, AppError::Internal(_)));
        assert_eq!(err.public_message(), "internal server error");
    }

    #[test]
    fn wrapped_app_errors_are_preserved() {
        let err: AppError = anyhow::Error::from(AppError::NotFound("habit")).into();
        assert_eq!(err.public_message(), "habit not found");
    }
}
