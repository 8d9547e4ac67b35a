use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::habits::habit::Habit;

/// Every read and write is scoped by the owning user.
#[async_trait]
pub trait HabitRepository: Send + Sync {
    async fn insert(&self, habit: &Habit) -> anyhow::Result<()>;
    async fn get_owned(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<Option<Habit>>;
    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Habit>>;
    async fn update_owned(&self, habit: &Habit) -> anyhow::Result<bool>;
    async fn delete_owned(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<bool>;
}
