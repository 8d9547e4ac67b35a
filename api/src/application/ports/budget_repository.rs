use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::finance::budget::Budget;

#[async_trait]
pub trait BudgetRepository: Send + Sync {
    async fn insert(&self, budget: &Budget) -> anyhow::Result<()>;
    async fn get_owned(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<Option<Budget>>;
    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Budget>>;
    async fn update_owned(&self, budget: &Budget) -> anyhow::Result<bool>;
    async fn delete_owned(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<bool>;
}
