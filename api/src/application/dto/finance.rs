use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::application::dto::{optional_text, required_text};
use crate::application::error::{AppError, AppResult};
use crate::domain::finance::account::{Account, AccountKind};
use crate::domain::finance::budget::{Budget, BudgetPeriod};
use crate::domain::finance::transaction::Transaction;
use crate::domain::time::{from_millis, to_millis};

#[derive(Debug, Clone, Default)]
pub struct CreateAccountInput {
    pub name: String,
    pub kind: Option<String>,
    pub currency: Option<String>,
    pub balance_minor: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateAccountInput {
    pub name: Option<String>,
    pub kind: Option<String>,
    pub currency: Option<String>,
    pub balance_minor: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountFields {
    pub name: String,
    pub kind: AccountKind,
    pub currency: String,
    pub balance_minor: i64,
}

#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    pub account_id: Uuid,
    pub amount_minor: i64,
    pub category: String,
    pub description: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateTransactionInput {
    pub account_id: Option<Uuid>,
    pub amount_minor: Option<i64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionFields {
    pub account_id: Uuid,
    pub amount_minor: i64,
    pub category: String,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateBudgetInput {
    pub category: String,
    pub limit_minor: i64,
    pub period: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateBudgetInput {
    pub category: Option<String>,
    pub limit_minor: Option<i64>,
    pub period: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BudgetFields {
    pub category: String,
    pub limit_minor: i64,
    pub period: BudgetPeriod,
}

fn parse_kind(raw: &str) -> AppResult<AccountKind> {
    AccountKind::parse(raw).ok_or_else(|| {
        AppError::validation("kind must be one of checking, savings, credit, cash, investment")
    })
}

fn parse_currency(raw: &str) -> AppResult<String> {
    let code = raw.trim().to_ascii_uppercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::validation("currency must be a 3-letter ISO code"));
    }
    Ok(code)
}

/// Categories are compared case-insensitively, so they are stored lower-cased.
fn parse_category(raw: &str) -> AppResult<String> {
    Ok(required_text("category", raw, 64)?.to_lowercase())
}

/// Largest magnitude accepted for any money field, in minor units. Sums of
/// many such values stay well inside `i64`.
pub const MAX_MINOR_UNITS: i64 = 1_000_000_000_000_000;

fn check_magnitude(field: &str, value: i64) -> AppResult<i64> {
    if value.unsigned_abs() > MAX_MINOR_UNITS as u64 {
        return Err(AppError::validation(format!(
            "{field} must be within ±{MAX_MINOR_UNITS}"
        )));
    }
    Ok(value)
}

fn check_amount(amount: i64) -> AppResult<i64> {
    if amount == 0 {
        return Err(AppError::validation("amount_minor must not be zero"));
    }
    check_magnitude("amount_minor", amount)
}

fn check_limit(limit: i64) -> AppResult<i64> {
    if limit <= 0 {
        return Err(AppError::validation("limit_minor must be positive"));
    }
    check_magnitude("limit_minor", limit)
}

fn check_balance(balance: i64) -> AppResult<i64> {
    check_magnitude("balance_minor", balance)
}

fn parse_period(raw: &str) -> AppResult<BudgetPeriod> {
    BudgetPeriod::parse(raw)
        .ok_or_else(|| AppError::validation("period must be one of weekly, monthly, yearly"))
}

/// Stored timestamps carry millisecond precision.
fn truncate_millis(at: DateTime<Utc>) -> DateTime<Utc> {
    from_millis(to_millis(at))
}

impl CreateAccountInput {
    pub fn validate(&self) -> AppResult<AccountFields> {
        Ok(AccountFields {
            name: required_text("name", &self.name, 100)?,
            kind: match self.kind.as_deref() {
                Some(k) => parse_kind(k)?,
                None => AccountKind::Checking,
            },
            currency: parse_currency(self.currency.as_deref().unwrap_or("USD"))?,
            balance_minor: check_balance(self.balance_minor.unwrap_or(0))?,
        })
    }
}

impl UpdateAccountInput {
    pub fn apply(&self, account: &mut Account) -> AppResult<()> {
        let name = self
            .name
            .as_deref()
            .map(|n| required_text("name", n, 100))
            .transpose()?;
        let kind = self.kind.as_deref().map(parse_kind).transpose()?;
        let currency = self.currency.as_deref().map(parse_currency).transpose()?;
        let balance = self.balance_minor.map(check_balance).transpose()?;

        if let Some(name) = name {
            account.name = name;
        }
        if let Some(kind) = kind {
            account.kind = kind;
        }
        if let Some(currency) = currency {
            account.currency = currency;
        }
        if let Some(balance) = balance {
            account.balance_minor = balance;
        }
        Ok(())
    }
}

impl CreateTransactionInput {
    pub fn validate(&self, now: DateTime<Utc>) -> AppResult<TransactionFields> {
        Ok(TransactionFields {
            account_id: self.account_id,
            amount_minor: check_amount(self.amount_minor)?,
            category: parse_category(&self.category)?,
            description: optional_text("description", self.description.as_deref(), 500)?,
            occurred_at: truncate_millis(self.occurred_at.unwrap_or(now)),
        })
    }
}

impl UpdateTransactionInput {
    pub fn apply(&self, tx: &mut Transaction) -> AppResult<()> {
        let amount = self.amount_minor.map(check_amount).transpose()?;
        let category = self.category.as_deref().map(parse_category).transpose()?;
        let description = self
            .description
            .as_deref()
            .map(|d| optional_text("description", Some(d), 500))
            .transpose()?;

        if let Some(account_id) = self.account_id {
            tx.account_id = account_id;
        }
        if let Some(amount) = amount {
            tx.amount_minor = amount;
        }
        if let Some(category) = category {
            tx.category = category;
        }
        if let Some(description) = description {
            tx.description = description;
        }
        if let Some(at) = self.occurred_at {
            tx.occurred_at = truncate_millis(at);
        }
        Ok(())
    }
}

impl CreateBudgetInput {
    pub fn validate(&self) -> AppResult<BudgetFields> {
        Ok(BudgetFields {
            category: parse_category(&self.category)?,
            limit_minor: check_limit(self.limit_minor)?,
            period: match self.period.as_deref() {
                Some(p) => parse_period(p)?,
                None => BudgetPeriod::Monthly,
            },
        })
    }
}

impl UpdateBudgetInput {
    pub fn apply(&self, budget: &mut Budget) -> AppResult<()> {
        let category = self.category.as_deref().map(parse_category).transpose()?;
        let limit = self.limit_minor.map(check_limit).transpose()?;
        let period = self.period.as_deref().map(parse_period).transpose()?;

        if let Some(category) = category {
            budget.category = category;
        }
        if let Some(limit) = limit {
            budget.limit_minor = limit;
        }
        if let Some(period) = period {
            budget.period = period;
        }
        Ok(())
    }
}
