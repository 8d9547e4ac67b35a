use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::dto::finance::{CreateBudgetInput, UpdateBudgetInput};
use crate::application::use_cases::budgets::{
    CreateBudget, DeleteBudget, GetBudget, ListBudgets, UpdateBudget,
};
use crate::bootstrap::app_context::AppContext;
use crate::domain::finance::budget::BudgetUsage;
use crate::presentation::rpc::{DeletedOutput, IdInput, RpcInput, RpcOk, RpcResult, RpcSession};

/// A budget together with what has been spent in its current period window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BudgetOutput {
    pub id: Uuid,
    pub category: String,
    pub limit_minor: i64,
    pub period: String,
    pub spent_minor: i64,
    pub remaining_minor: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BudgetUsage> for BudgetOutput {
    fn from(u: BudgetUsage) -> Self {
        let remaining_minor = u.remaining_minor();
        Self {
            id: u.budget.id,
            category: u.budget.category,
            limit_minor: u.budget.limit_minor,
            period: u.budget.period.as_str().to_string(),
            spent_minor: u.spent_minor,
            remaining_minor,
            created_at: u.budget.created_at,
            updated_at: u.budget.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateBudgetBody {
    pub category: String,
    pub limit_minor: i64,
    /// `weekly`, `monthly` (default) or `yearly`.
    pub period: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateBudgetBody {
    pub id: Uuid,
    pub category: Option<String>,
    pub limit_minor: Option<i64>,
    pub period: Option<String>,
}

#[utoipa::path(post, path = "/rpc/budgets.list", tag = "Rpc", responses((status = 200, body = [BudgetOutput])))]
pub async fn list(
    State(ctx): State<AppContext>,
    session: RpcSession,
) -> RpcResult<Vec<BudgetOutput>> {
    let repo = ctx.budget_repo();
    let transactions = ctx.transaction_repo();
    let uc = ListBudgets {
        repo: repo.as_ref(),
        transactions: transactions.as_ref(),
    };
    let budgets = uc.execute(session.user_id()).await?;
    Ok(RpcOk(budgets.into_iter().map(Into::into).collect()))
}

#[utoipa::path(post, path = "/rpc/budgets.get", tag = "Rpc", request_body = IdInput, responses((status = 200, body = BudgetOutput)))]
pub async fn get_one(
    State(ctx): State<AppContext>,
    session: RpcSession,
    RpcInput(input): RpcInput<IdInput>,
) -> RpcResult<BudgetOutput> {
    let repo = ctx.budget_repo();
    let transactions = ctx.transaction_repo();
    let uc = GetBudget {
        repo: repo.as_ref(),
        transactions: transactions.as_ref(),
    };
    Ok(RpcOk(uc.execute(input.id, session.user_id()).await?.into()))
}

#[utoipa::path(post, path = "/rpc/budgets.create", tag = "Rpc", request_body = CreateBudgetBody, responses((status = 200, body = BudgetOutput)))]
pub async fn create(
    State(ctx): State<AppContext>,
    session: RpcSession,
    RpcInput(body): RpcInput<CreateBudgetBody>,
) -> RpcResult<BudgetOutput> {
    let repo = ctx.budget_repo();
    let transactions = ctx.transaction_repo();
    let uc = CreateBudget {
        repo: repo.as_ref(),
        transactions: transactions.as_ref(),
    };
    let input = CreateBudgetInput {
        category: body.category,
        limit_minor: body.limit_minor,
        period: body.period,
    };
    Ok(RpcOk(uc.execute(session.user_id(), &input).await?.into()))
}

#[utoipa::path(post, path = "/rpc/budgets.update", tag = "Rpc", request_body = UpdateBudgetBody, responses((status = 200, body = BudgetOutput)))]
pub async fn update(
    State(ctx): State<AppContext>,
    session: RpcSession,
    RpcInput(body): RpcInput<UpdateBudgetBody>,
) -> RpcResult<BudgetOutput> {
    let repo = ctx.budget_repo();
    let transactions = ctx.transaction_repo();
    let uc = UpdateBudget {
        repo: repo.as_ref(),
        transactions: transactions.as_ref(),
    };
    let patch = UpdateBudgetInput {
        category: body.category,
        limit_minor: body.limit_minor,
        period: body.period,
    };
    Ok(RpcOk(
        uc.execute(body.id, session.user_id(), &patch).await?.into(),
    ))
}

#[utoipa::path(post, path = "/rpc/budgets.delete", tag = "Rpc", request_body = IdInput, responses((status = 200, body = DeletedOutput)))]
pub async fn delete(
    State(ctx): State<AppContext>,
    session: RpcSession,
    RpcInput(input): RpcInput<IdInput>,
) -> RpcResult<DeletedOutput> {
    let repo = ctx.budget_repo();
    let uc = DeleteBudget {
        repo: repo.as_ref(),
    };
    uc.execute(input.id, session.user_id()).await?;
    Ok(RpcOk(DeletedOutput {
        id: input.id,
        deleted: true,
    }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::presentation::rpc::routes;
    use crate::presentation::rpc::test_helpers::*;
    use crate::test_support::test_context;

    #[tokio::test]
    async fn budget_reports_spending_in_its_category() {
        let (ctx, _dir) = test_context().await;
        let token = signed_up(&ctx, "ada@example.com").await;
        let app = routes(ctx);
        let token = Some(token.as_str());

        let account = data(call(&app, "accounts.create", token, json!({"name": "Checking"})).await)
            .await["id"]
            .clone();
        for (amount, category) in [(-1500, "Groceries"), (-500, "groceries"), (-900, "fuel"), (2000, "groceries")] {
            data(
                call(
                    &app,
                    "transactions.create",
                    token,
                    json!({"account_id": account, "amount_minor": amount, "category": category}),
                )
                .await,
            )
            .await;
        }

        let budget: BudgetOutput = serde_json::from_value(
            data(
                call(
                    &app,
                    "budgets.create",
                    token,
                    json!({"category": "groceries", "limit_minor": 10_000, "period": "weekly"}),
                )
                .await,
            )
            .await,
        )
        .unwrap();
        assert_eq!(budget.spent_minor, 2000);
        assert_eq!(budget.remaining_minor, 8000);

        let listed: Vec<BudgetOutput> = serde_json::from_value(
            data(call(&app, "budgets.list", token, no_input()).await).await,
        )
        .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].spent_minor, 2000);
    }

    #[tokio::test]
    async fn non_positive_limit_is_rejected() {
        let (ctx, _dir) = test_context().await;
        let token = signed_up(&ctx, "ada@example.com").await;
        let app = routes(ctx);
        let res = call(
            &app,
            "budgets.create",
            Some(&token),
            json!({"category": "fun", "limit_minor": 0}),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
