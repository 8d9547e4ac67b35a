use async_trait::async_trait;
use sqlx::Row;
use sqlx::any::AnyRow;
use uuid::Uuid;

use crate::application::ports::budget_repository::BudgetRepository;
use crate::domain::finance::budget::{Budget, BudgetPeriod};
use crate::domain::time::to_millis;
use crate::infrastructure::db::DbPool;
use crate::infrastructure::db::repositories::{time_col, uuid_col};

pub struct SqlxBudgetRepository {
    pub pool: DbPool,
}

impl SqlxBudgetRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const BUDGET_COLUMNS: &str = "id, user_id, category, limit_minor, period, created_at, updated_at";

fn budget_from_row(r: &AnyRow) -> anyhow::Result<Budget> {
    let period: String = r.try_get("period")?;
    Ok(Budget {
        id: uuid_col(r, "id")?,
        user_id: uuid_col(r, "user_id")?,
        category: r.try_get("category")?,
        limit_minor: r.try_get("limit_minor")?,
        period: BudgetPeriod::parse(&period)
            .ok_or_else(|| anyhow::anyhow!("unknown budget period {period:?}"))?,
        created_at: time_col(r, "created_at")?,
        updated_at: time_col(r, "updated_at")?,
    })
}

#[async_trait]
impl BudgetRepository for SqlxBudgetRepository {
    async fn insert(&self, budget: &Budget) -> anyhow::Result<()> {
        sqlx::query(&format!(
            "INSERT INTO budgets ({BUDGET_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7)"
        ))
        .bind(budget.id.to_string())
        .bind(budget.user_id.to_string())
        .bind(&budget.category)
        .bind(budget.limit_minor)
        .bind(budget.period.as_str())
        .bind(to_millis(budget.created_at))
        .bind(to_millis(budget.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_owned(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<Option<Budget>> {
        let row = sqlx::query(&format!(
            "SELECT {BUDGET_COLUMNS} FROM budgets WHERE id = $1 AND user_id = $2"
        ))
        .bind(id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(budget_from_row).transpose()
    }

    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Budget>> {
        let rows = sqlx::query(&format!(
            "SELECT {BUDGET_COLUMNS} FROM budgets WHERE user_id = $1 ORDER BY category ASC, id ASC"
        ))
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(budget_from_row).collect()
    }

    async fn update_owned(&self, budget: &Budget) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"UPDATE budgets
               SET category = $3, limit_minor = $4, period = $5, updated_at = $6
               WHERE id = $1 AND user_id = $2"#,
        )
        .bind(budget.id.to_string())
        .bind(budget.user_id.to_string())
        .bind(&budget.category)
        .bind(budget.limit_minor)
        .bind(budget.period.as_str())
        .bind(to_millis(budget.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_owned(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM budgets WHERE id = $1 AND user_id = $2")
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

    #[tokio::test]
    async fn budgets_round_trip_and_stay_scoped() {
        let (store, _dir) = embedded_store().await;
        let ada = seed_user(&store, "ada@example.com").await;
        let bob = seed_user(&store, "bob@example.com").await;
        let repo = SqlxBudgetRepository::new(store.pool().clone());
        let now = from_millis(now_millis());
        let budget = Budget {
            id: Uuid::new_v4(),
            user_id: ada.id,
            category: "dining".into(),
            limit_minor: 30_000,
            period: BudgetPeriod::Monthly,
            created_at: now,
            updated_at: now,
        };
        repo.insert(&budget).await.unwrap();

        assert_eq!(
            repo.get_owned(budget.id, ada.id).await.unwrap(),
            Some(budget.clone())
        );
        assert_eq!(repo.get_owned(budget.id, bob.id).await.unwrap(), None);
        assert!(repo.list_for_user(bob.id).await.unwrap().is_empty());

        let mut raised = budget.clone();
        raised.limit_minor = 45_000;
        raised.period = BudgetPeriod::Weekly;
        assert!(repo.update_owned(&raised).await.unwrap());
        assert_eq!(repo.list_for_user(ada.id).await.unwrap(), vec![raised]);
    }
}
