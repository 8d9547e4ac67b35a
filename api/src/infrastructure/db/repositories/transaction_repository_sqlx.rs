use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use sqlx::any::AnyRow;
use uuid::Uuid;

use crate::application::ports::transaction_repository::{
    TransactionFilter, TransactionRepository,
};
use crate::domain::finance::transaction::Transaction;
use crate::domain::time::to_millis;
use crate::infrastructure::db::DbPool;
use crate::infrastructure::db::repositories::{opt_text_col, time_col, uuid_col};

pub struct SqlxTransactionRepository {
    pub pool: DbPool,
}

impl SqlxTransactionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const TRANSACTION_COLUMNS: &str = "id, user_id, account_id, amount_minor, category, description, occurred_at, created_at, updated_at";

fn transaction_from_row(r: &AnyRow) -> anyhow::Result<Transaction> {
    Ok(Transaction {
        id: uuid_col(r, "id")?,
        user_id: uuid_col(r, "user_id")?,
        account_id: uuid_col(r, "account_id")?,
        amount_minor: r.try_get("amount_minor")?,
        category: r.try_get("category")?,
        description: opt_text_col(r, "description")?,
        occurred_at: time_col(r, "occurred_at")?,
        created_at: time_col(r, "created_at")?,
        updated_at: time_col(r, "updated_at")?,
    })
}

#[async_trait]
impl TransactionRepository for SqlxTransactionRepository {
    async fn insert(&self, tx: &Transaction) -> anyhow::Result<()> {
        sqlx::query(&format!(
            "INSERT INTO transactions ({TRANSACTION_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)"
        ))
        .bind(tx.id.to_string())
        .bind(tx.user_id.to_string())
        .bind(tx.account_id.to_string())
        .bind(tx.amount_minor)
        .bind(&tx.category)
        .bind(tx.description.as_deref())
        .bind(to_millis(tx.occurred_at))
        .bind(to_millis(tx.created_at))
        .bind(to_millis(tx.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_owned(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<Option<Transaction>> {
        let row = sqlx::query(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1 AND user_id = $2"
        ))
        .bind(id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(transaction_from_row).transpose()
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        filter: &TransactionFilter,
    ) -> anyhow::Result<Vec<Transaction>> {
        let mut sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE user_id = $1");
        let mut n = 1;
        if filter.account_id.is_some() {
            n += 1;
            sql.push_str(&format!(" AND account_id = ${n}"));
        }
        if filter.category.is_some() {
            n += 1;
            sql.push_str(&format!(" AND category = ${n}"));
        }
        if filter.since.is_some() {
            n += 1;
            sql.push_str(&format!(" AND occurred_at >= ${n}"));
        }
        sql.push_str(" ORDER BY occurred_at DESC, created_at DESC, id ASC");
        if filter.limit.is_some() {
            n += 1;
            sql.push_str(&format!(" LIMIT ${n}"));
        }

        let mut query = sqlx::query(&sql).bind(user_id.to_string());
        if let Some(account_id) = filter.account_id {
            query = query.bind(account_id.to_string());
        }
        if let Some(category) = &filter.category {
            query = query.bind(category.clone());
        }
        if let Some(since) = filter.since {
            query = query.bind(to_millis(since));
        }
        if let Some(limit) = filter.limit {
            query = query.bind(limit);
        }
        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(transaction_from_row).collect()
    }

    async fn update_owned(&self, tx: &Transaction) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"UPDATE transactions
               SET account_id = $3, amount_minor = $4, category = $5, description = $6,
                   occurred_at = $7, updated_at = $8
               WHERE id = $1 AND user_id = $2"#,
        )
        .bind(tx.id.to_string())
        .bind(tx.user_id.to_string())
        .bind(tx.account_id.to_string())
        .bind(tx.amount_minor)
        .bind(&tx.category)
        .bind(tx.description.as_deref())
        .bind(to_millis(tx.occurred_at))
        .bind(to_millis(tx.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_owned(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM transactions WHERE id = $1 AND user_id = $2")
            .bind(id.to_string())
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn sum_expenses(
        &self,
        user_id: Uuid,
        category: &str,
        since: DateTime<Utc>,
    ) -> anyhow::Result<i64> {
        let row = sqlx::query(
            r#"SELECT CAST(COALESCE(SUM(-amount_minor), 0) AS BIGINT) AS spent
               FROM transactions
               WHERE user_id = $1 AND category = $2 AND occurred_at >= $3 AND amount_minor < 0"#,
        )
        .bind(user_id.to_string())
        .bind(category)
        .bind(to_millis(since))
        .fetch_one(&self.pool)
        .await?;
        Ok(row.try_get("spent")?)
    }
}
