use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::application::dto::finance::{CreateBudgetInput, UpdateBudgetInput};
use crate::application::error::{AppError, AppResult};
use crate::application::ports::budget_repository::BudgetRepository;
use crate::application::ports::transaction_repository::TransactionRepository;
use crate::domain::finance::budget::{Budget, BudgetUsage};
use crate::domain::time::{from_millis, now_millis};

async fn usage_of<T: TransactionRepository + ?Sized>(
    transactions: &T,
    budget: Budget,
    now: DateTime<Utc>,
) -> AppResult<BudgetUsage> {
    let since = budget.period.window_start(now);
    let spent_minor = transactions
        .sum_expenses(budget.user_id, &budget.category, since)
        .await?;
    Ok(BudgetUsage {
        budget,
        spent_minor,
    })
}

pub struct CreateBudget<'a, R, T>
where
    R: BudgetRepository + ?Sized,
    T: TransactionRepository + ?Sized,
{
    pub repo: &'a R,
    pub transactions: &'a T,
}

impl<'a, R, T> CreateBudget<'a, R, T>
where
    R: BudgetRepository + ?Sized,
    T: TransactionRepository + ?Sized,
{
    pub async fn execute(&self, user_id: Uuid, input: &CreateBudgetInput) -> AppResult<BudgetUsage> {
        let fields = input.validate()?;
        let now = from_millis(now_millis());
        let budget = Budget {
            id: Uuid::new_v4(),
            user_id,
            category: fields.category,
            limit_minor: fields.limit_minor,
            period: fields.period,
            created_at: now,
            updated_at: now,
        };
        self.repo.insert(&budget).await?;
        usage_of(self.transactions, budget, now).await
    }
}

pub struct ListBudgets<'a, R, T>
where
    R: BudgetRepository + ?Sized,
    T: TransactionRepository + ?Sized,
{
    pub repo: &'a R,
    pub transactions: &'a T,
}

impl<'a, R, T> ListBudgets<'a, R, T>
where
    R: BudgetRepository + ?Sized,
    T: TransactionRepository + ?Sized,
{
    pub async fn execute(&self, user_id: Uuid) -> AppResult<Vec<BudgetUsage>> {
        let now = Utc::now();
        let budgets = self.repo.list_for_user(user_id).await?;
        let mut out = Vec::with_capacity(budgets.len());
        for budget in budgets {
            out.push(usage_of(self.transactions, budget, now).await?);
        }
        Ok(out)
    }
}

pub struct GetBudget<'a, R, T>
where
    R: BudgetRepository + ?Sized,
    T: TransactionRepository + ?Sized,
{
    pub repo: &'a R,
    pub transactions: &'a T,
}

impl<'a, R, T> GetBudget<'a, R, T>
where
    R: BudgetRepository + ?Sized,
    T: TransactionRepository + ?Sized,
{
    pub async fn execute(&self, id: Uuid, user_id: Uuid) -> AppResult<BudgetUsage> {
        let budget = self
            .repo
            .get_owned(id, user_id)
            .await?
            .ok_or(AppError::NotFound("budget"))?;
        usage_of(self.transactions, budget, Utc::now()).await
    }
}

pub struct UpdateBudget<'a, R, T>
where
    R: BudgetRepository + ?Sized,
    T: TransactionRepository + ?Sized,
{
    pub repo: &'a R,
    pub transactions: &'a T,
}

impl<'a, R, T> UpdateBudget<'a, R, T>
where
    R: BudgetRepository + ?Sized,
    T: TransactionRepository + ?Sized,
{
    pub async fn execute(
        &self,
        id: Uuid,
        user_id: Uuid,
        patch: &UpdateBudgetInput,
    ) -> AppResult<BudgetUsage> {
        let mut budget = self
            .repo
            .get_owned(id, user_id)
            .await?
            .ok_or(AppError::NotFound("budget"))?;
        patch.apply(&mut budget)?;
        budget.updated_at = from_millis(now_millis());
        if !self.repo.update_owned(&budget).await? {
            return Err(AppError::NotFound("budget"));
        }
        usage_of(self.transactions, budget, Utc::now()).await
    }
}

pub struct DeleteBudget<'a, R: BudgetRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: BudgetRepository + ?Sized> DeleteBudget<'a, R> {
    pub async fn execute(&self, id: Uuid, user_id: Uuid) -> AppResult<()> {
        if !self.repo.delete_owned(id, user_id).await? {
            return Err(AppError::NotFound("budget"));
        }
        Ok(())
    }
}
