use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::finance::account::Account;

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn insert(&self, account: &Account) -> anyhow::Result<()>;
    async fn get_owned(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<Option<Account>>;
    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Account>>;
    async fn update_owned(&self, account: &Account) -> anyhow::Result<bool>;
    async fn delete_owned(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<bool>;
}
