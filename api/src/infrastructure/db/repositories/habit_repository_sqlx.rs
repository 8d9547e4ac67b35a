use async_trait::async_trait;
use sqlx::Row;
use sqlx::any::AnyRow;
use uuid::Uuid;

use crate::application::ports::habit_repository::HabitRepository;
use crate::domain::habits::habit::{Habit, HabitFrequency};
use crate::domain::time::to_millis;
use crate::infrastructure::db::DbPool;
use crate::infrastructure::db::repositories::{opt_text_col, time_col, uuid_col};

pub struct SqlxHabitRepository {
    pub pool: DbPool,
}

impl SqlxHabitRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const HABIT_COLUMNS: &str =
    "id, user_id, name, description, frequency, target_count, created_at, updated_at";

fn habit_from_row(r: &AnyRow) -> anyhow::Result<Habit> {
    let frequency: String = r.try_get("frequency")?;
    Ok(Habit {
        id: uuid_col(r, "id")?,
        user_id: uuid_col(r, "user_id")?,
        name: r.try_get("name")?,
        description: opt_text_col(r, "description")?,
        frequency: HabitFrequency::parse(&frequency)
            .ok_or_else(|| anyhow::anyhow!("unknown habit frequency {frequency:?}"))?,
        target_count: r.try_get("target_count")?,
        created_at: time_col(r, "created_at")?,
        updated_at: time_col(r, "updated_at")?,
    })
}

#[async_trait]
impl HabitRepository for SqlxHabitRepository {
    async fn insert(&self, habit: &Habit) -> anyhow::Result<()> {
        sqlx::query(&format!(
            "INSERT INTO habits ({HABIT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
        ))
        .bind(habit.id.to_string())
        .bind(habit.user_id.to_string())
        .bind(&habit.name)
        .bind(habit.description.as_deref())
        .bind(habit.frequency.as_str())
        .bind(habit.target_count)
        .bind(to_millis(habit.created_at))
        .bind(to_millis(habit.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_owned(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<Option<Habit>> {
        let row = sqlx::query(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits WHERE id = $1 AND user_id = $2"
        ))
        .bind(id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(habit_from_row).transpose()
    }

    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Habit>> {
        let rows = sqlx::query(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits WHERE user_id = $1 ORDER BY created_at ASC, id ASC"
        ))
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(habit_from_row).collect()
    }

    async fn update_owned(&self, habit: &Habit) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"UPDATE habits
               SET name = $3, description = $4, frequency = $5, target_count = $6, updated_at = $7
               WHERE id = $1 AND user_id = $2"#,
        )
        .bind(habit.id.to_string())
        .bind(habit.user_id.to_string())
        .bind(&habit.name)
        .bind(habit.description.as_deref())
        .bind(habit.frequency.as_str())
        .bind(habit.target_count)
        .bind(to_millis(habit.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_owned(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM habits WHERE id = $1 AND user_id = $2")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::time::{from_millis, now_millis};
    use crate::test_support::{embedded_store, seed_user};

    fn habit_for(user_id: Uuid, name: &str) -> Habit {
        let now = from_millis(now_millis());
        Habit {
            id: Uuid::new_v4(),
            user_id,
            name: name.into(),
            description: Some("before breakfast".into()),
            frequency: HabitFrequency::Weekly,
            target_count: 3,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn write_then_read_is_field_for_field_equal() {
        let (store, _dir) = embedded_store().await;
        let ada = seed_user(&store, "ada@example.com").await;
        let repo = SqlxHabitRepository::new(store.pool().clone());
        let habit = habit_for(ada.id, "Run");
        repo.insert(&habit).await.unwrap();
        assert_eq!(repo.get_owned(habit.id, ada.id).await.unwrap(), Some(habit));
    }

    #[tokio::test]
    async fn other_users_never_see_the_habit() {
        let (store, _dir) = embedded_store().await;
        let ada = seed_user(&store, "ada@example.com").await;
        let bob = seed_user(&store, "bob@example.com").await;
        let repo = SqlxHabitRepository::new(store.pool().clone());
        let habit = habit_for(ada.id, "Run");
        repo.insert(&habit).await.unwrap();
        repo.insert(&habit_for(bob.id, "Swim")).await.unwrap();

        assert_eq!(repo.get_owned(habit.id, bob.id).await.unwrap(), None);
        let bobs = repo.list_for_user(bob.id).await.unwrap();
        assert_eq!(bobs.len(), 1);
        assert!(bobs.iter().all(|h| h.user_id == bob.id));

        let mut hijacked = habit.clone();
        hijacked.user_id = bob.id;
        hijacked.name = "Stolen".into();
        assert!(!repo.update_owned(&hijacked).await.unwrap());
        assert!(!repo.delete_owned(habit.id, bob.id).await.unwrap());
        assert_eq!(
            repo.get_owned(habit.id, ada.id).await.unwrap().unwrap().name,
            "Run"
        );
    }

    #[tokio::test]
    async fn update_clears_description() {
        let (store, _dir) = embedded_store().await;
        let ada = seed_user(&store, "ada@example.com").await;
        let repo = SqlxHabitRepository::new(store.pool().clone());
        let mut habit = habit_for(ada.id, "Run");
        repo.insert(&habit).await.unwrap();

        habit.description = None;
        habit.frequency = HabitFrequency::Daily;
        assert!(repo.update_owned(&habit).await.unwrap());
        assert_eq!(repo.get_owned(habit.id, ada.id).await.unwrap(), Some(habit));
    }
}
