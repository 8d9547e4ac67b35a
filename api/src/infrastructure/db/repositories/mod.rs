use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::any::AnyRow;
use uuid::Uuid;

use crate::domain::time::from_millis;

pub mod account_repository_sqlx;
pub mod budget_repository_sqlx;
pub mod habit_repository_sqlx;
pub mod session_repository_sqlx;
pub mod transaction_repository_sqlx;
pub mod user_repository_sqlx;

// Ids travel as TEXT and timestamps as BIGINT millis so the same SQL runs on
// both the server and the embedded store.

pub(crate) fn uuid_col(row: &AnyRow, col: &str) -> anyhow::Result<Uuid> {
    let raw: String = row.try_get(col)?;
    Ok(Uuid::parse_str(&raw)?)
}

pub(crate) fn time_col(row: &AnyRow, col: &str) -> anyhow::Result<DateTime<Utc>> {
    let ms: i64 = row.try_get(col)?;
    Ok(from_millis(ms))
}

pub(crate) fn opt_text_col(row: &AnyRow, col: &str) -> anyhow::Result<Option<String>> {
    Ok(row.try_get::<Option<String>, _>(col)?)
}
