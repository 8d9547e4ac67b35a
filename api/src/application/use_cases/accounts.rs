use uuid::Uuid;

use crate::application::dto::finance::{CreateAccountInput, UpdateAccountInput};
use crate::application::error::{AppError, AppResult};
use crate::application::ports::account_repository::AccountRepository;
use crate::domain::finance::account::Account;
use crate::domain::time::{from_millis, now_millis};

pub struct CreateAccount<'a, R: AccountRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: AccountRepository + ?Sized> CreateAccount<'a, R> {
    pub async fn execute(&self, user_id: Uuid, input: &CreateAccountInput) -> AppResult<Account> {
        let fields = input.validate()?;
        let now = from_millis(now_millis());
        let account = Account {
            id: Uuid::new_v4(),
            user_id,
            name: fields.name,
            kind: fields.kind,
            currency: fields.currency,
            balance_minor: fields.balance_minor,
            created_at: now,
            updated_at: now,
        };
        self.repo.insert(&account).await?;
        Ok(account)
    }
}

pub struct ListAccounts<'a, R: AccountRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: AccountRepository + ?Sized> ListAccounts<'a, R> {
    pub async fn execute(&self, user_id: Uuid) -> AppResult<Vec<Account>> {
        Ok(self.repo.list_for_user(user_id).await?)
    }
}

pub struct GetAccount<'a, R: AccountRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: AccountRepository + ?Sized> GetAccount<'a, R> {
    pub async fn execute(&self, id: Uuid, user_id: Uuid) -> AppResult<Account> {
        self.repo
            .get_owned(id, user_id)
            .await?
            .ok_or(AppError::NotFound("account"))
    }
}

pub struct UpdateAccount<'a, R: AccountRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: AccountRepository + ?Sized> UpdateAccount<'a, R> {
    pub async fn execute(
        &self,
        id: Uuid,
        user_id: Uuid,
        patch: &UpdateAccountInput,
    ) -> AppResult<Account> {
        let mut account = self
            .repo
            .get_owned(id, user_id)
            .await?
            .ok_or(AppError::NotFound("account"))?;
        patch.apply(&mut account)?;
        account.updated_at = from_millis(now_millis());
        if !self.repo.update_owned(&account).await? {
            return Err(AppError::NotFound("account"));
        }
        Ok(account)
    }
}

/// Deleting an account removes its transactions with it.
pub struct DeleteAccount<'a, R: AccountRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: AccountRepository + ?Sized> DeleteAccount<'a, R> {
    pub async fn execute(&self, id: Uuid, user_id: Uuid) -> AppResult<()> {
        if !self.repo.delete_owned(id, user_id).await? {
            return Err(AppError::NotFound("account"));
        }
        Ok(())
    }
}
