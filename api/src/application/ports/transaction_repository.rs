use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::finance::transaction::Transaction;

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub account_id: Option<Uuid>,
    pub category: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

#[async_trait]
pub trait TransactionRepository: Send + Sync {
    async fn insert(&self, tx: &Transaction) -> anyhow::Result<()>;
    async fn get_owned(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<Option<Transaction>>;
    /// Newest first.
    async fn list_for_user(
        &self,
        user_id: Uuid,
        filter: &TransactionFilter,
    ) -> anyhow::Result<Vec<Transaction>>;
    async fn update_owned(&self, tx: &Transaction) -> anyhow::Result<bool>;
    async fn delete_owned(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<bool>;
    /// Total of expenses (as a positive number) in `category` since `since`.
    async fn sum_expenses(
        &self,
        user_id: Uuid,
        category: &str,
        since: DateTime<Utc>,
    ) -> anyhow::Result<i64>;
}
