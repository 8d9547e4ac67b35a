use chrono::Utc;
use uuid::Uuid;

use crate::application::dto::finance::{CreateTransactionInput, UpdateTransactionInput};
use crate::application::error::{AppError, AppResult};
use crate::application::ports::account_repository::AccountRepository;
use crate::application::ports::transaction_repository::{
    TransactionFilter, TransactionRepository,
};
use crate::domain::finance::transaction::Transaction;
use crate::domain::time::{from_millis, now_millis};

pub const MAX_PAGE: i64 = 500;

async fn ensure_account_owned<A: AccountRepository + ?Sized>(
    accounts: &A,
    account_id: Uuid,
    user_id: Uuid,
) -> AppResult<()> {
    if accounts.get_owned(account_id, user_id).await?.is_none() {
        return Err(AppError::NotFound("account"));
    }
    Ok(())
}

pub struct CreateTransaction<'a, R, A>
where
    R: TransactionRepository + ?Sized,
    A: AccountRepository + ?Sized,
{
    pub repo: &'a R,
    pub accounts: &'a A,
}

impl<'a, R, A> CreateTransaction<'a, R, A>
where
    R: TransactionRepository + ?Sized,
    A: AccountRepository + ?Sized,
{
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: &CreateTransactionInput,
    ) -> AppResult<Transaction> {
        let fields = input.validate(Utc::now())?;
        ensure_account_owned(self.accounts, fields.account_id, user_id).await?;
        let now = from_millis(now_millis());
        let tx = Transaction {
            id: Uuid::new_v4(),
            user_id,
            account_id: fields.account_id,
            amount_minor: fields.amount_minor,
            category: fields.category,
            description: fields.description,
            occurred_at: fields.occurred_at,
            created_at: now,
            updated_at: now,
        };
        self.repo.insert(&tx).await?;
        Ok(tx)
    }
}

pub struct ListTransactions<'a, R: TransactionRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: TransactionRepository + ?Sized> ListTransactions<'a, R> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        mut filter: TransactionFilter,
    ) -> AppResult<Vec<Transaction>> {
        filter.limit = Some(filter.limit.unwrap_or(MAX_PAGE).clamp(1, MAX_PAGE));
        filter.category = filter
            .category
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty());
        Ok(self.repo.list_for_user(user_id, &filter).await?)
    }
}

pub struct GetTransaction<'a, R: TransactionRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: TransactionRepository + ?Sized> GetTransaction<'a, R> {
    pub async fn execute(&self, id: Uuid, user_id: Uuid) -> AppResult<Transaction> {
        self.repo
            .get_owned(id, user_id)
            .await?
            .ok_or(AppError::NotFound("transaction"))
    }
}

pub struct UpdateTransaction<'a, R, A>
where
    R: TransactionRepository + ?Sized,
    A: AccountRepository + ?Sized,
{
    pub repo: &'a R,
    pub accounts: &'a A,
}

impl<'a, R, A> UpdateTransaction<'a, R, A>
where
    R: TransactionRepository + ?Sized,
    A: AccountRepository + ?Sized,
{
    pub async fn execute(
        &self,
        id: Uuid,
        user_id: Uuid,
        patch: &UpdateTransactionInput,
    ) -> AppResult<Transaction> {
        let mut tx = self
            .repo
            .get_owned(id, user_id)
            .await?
            .ok_or(AppError::NotFound("transaction"))?;
        patch.apply(&mut tx)?;
        if patch.account_id.is_some() {
            ensure_account_owned(self.accounts, tx.account_id, user_id).await?;
        }
        tx.updated_at = from_millis(now_millis());
        if !self.repo.update_owned(&tx).await? {
            return Err(AppError::NotFound("transaction"));
        }
        Ok(tx)
    }
}

pub struct DeleteTransaction<'a, R: TransactionRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: TransactionRepository + ?Sized> DeleteTransaction<'a, R> {
    pub async fn execute(&self, id: Uuid, user_id: Uuid) -> AppResult<()> {
        if !self.repo.delete_owned(id, user_id).await? {
            return Err(AppError::NotFound("transaction"));
        }
        Ok(())
    }
}
