use async_trait::async_trait;
use sqlx::Row;
use sqlx::any::AnyRow;
use uuid::Uuid;

use crate::application::ports::account_repository::AccountRepository;
use crate::domain::finance::account::{Account, AccountKind};
use crate::domain::time::to_millis;
use crate::infrastructure::db::DbPool;
use crate::infrastructure::db::repositories::{time_col, uuid_col};

pub struct SqlxAccountRepository {
    pub pool: DbPool,
}

impl SqlxAccountRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const ACCOUNT_COLUMNS: &str =
    "id, user_id, name, kind, currency, balance_minor, created_at, updated_at";

fn account_from_row(r: &AnyRow) -> anyhow::Result<Account> {
    let kind: String = r.try_get("kind")?;
    Ok(Account {
        id: uuid_col(r, "id")?,
        user_id: uuid_col(r, "user_id")?,
        name: r.try_get("name")?,
        kind: AccountKind::parse(&kind)
            .ok_or_else(|| anyhow::anyhow!("unknown account kind {kind:?}"))?,
        currency: r.try_get("currency")?,
        balance_minor: r.try_get("balance_minor")?,
        created_at: time_col(r, "created_at")?,
        updated_at: time_col(r, "updated_at")?,
    })
}

#[async_trait]
impl AccountRepository for SqlxAccountRepository {
    async fn insert(&self, account: &Account) -> anyhow::Result<()> {
        sqlx::query(&format!(
            "INSERT INTO accounts ({ACCOUNT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
        ))
        .bind(account.id.to_string())
        .bind(account.user_id.to_string())
        .bind(&account.name)
        .bind(account.kind.as_str())
        .bind(&account.currency)
        .bind(account.balance_minor)
        .bind(to_millis(account.created_at))
        .bind(to_millis(account.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_owned(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<Option<Account>> {
        let row = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = $1 AND user_id = $2"
        ))
        .bind(id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(account_from_row).transpose()
    }

    async fn list_for_user(&self, user_id: Uuid) -> anyhow::Result<Vec<Account>> {
        let rows = sqlx::query(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE user_id = $1 ORDER BY name ASC, id ASC"
        ))
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(account_from_row).collect()
    }

    async fn update_owned(&self, account: &Account) -> anyhow::Result<bool> {
        let res = sqlx::query(
            r#"UPDATE accounts
               SET name = $3, kind = $4, currency = $5, balance_minor = $6, updated_at = $7
               WHERE id = $1 AND user_id = $2"#,
        )
        .bind(account.id.to_string())
        .bind(account.user_id.to_string())
        .bind(&account.name)
        .bind(account.kind.as_str())
        .bind(&account.currency)
        .bind(account.balance_minor)
        .bind(to_millis(account.updated_at))
        .execute(&self.pool)
        .await?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_owned(&self, id: Uuid, user_id: Uuid) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM accounts WHERE id = $1 AND user_id = $2")
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
    use crate::test_support::{embedded_store, sample_account, seed_user};

    #[tokio::test]
    async fn accounts_round_trip_and_stay_scoped() {
        let (store, _dir) = embedded_store().await;
        let ada = seed_user(&store, "ada@example.com").await;
        let bob = seed_user(&store, "bob@example.com").await;
        let repo = SqlxAccountRepository::new(store.pool().clone());

        let account = sample_account(ada.id, "Everyday");
        repo.insert(&account).await.unwrap();
        assert_eq!(
            repo.get_owned(account.id, ada.id).await.unwrap(),
            Some(account.clone())
        );
        assert_eq!(repo.get_owned(account.id, bob.id).await.unwrap(), None);
        assert!(repo.list_for_user(bob.id).await.unwrap().is_empty());
        assert!(!repo.delete_owned(account.id, bob.id).await.unwrap());
        assert!(repo.delete_owned(account.id, ada.id).await.unwrap());
    }
}
