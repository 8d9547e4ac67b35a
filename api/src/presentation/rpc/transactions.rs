use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::dto::finance::{CreateTransactionInput, UpdateTransactionInput};
use crate::application::ports::transaction_repository::TransactionFilter;
use crate::application::use_cases::transactions::{
    CreateTransaction, DeleteTransaction, GetTransaction, ListTransactions, UpdateTransaction,
};
use crate::bootstrap::app_context::AppContext;
use crate::domain::finance::transaction::Transaction;
use crate::presentation::rpc::{DeletedOutput, IdInput, RpcInput, RpcOk, RpcResult, RpcSession};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TransactionOutput {
    pub id: Uuid,
    pub account_id: Uuid,
    pub amount_minor: i64,
    pub category: String,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionOutput {
    fn from(t: Transaction) -> Self {
        Self {
            id: t.id,
            account_id: t.account_id,
            amount_minor: t.amount_minor,
            category: t.category,
            description: t.description,
            occurred_at: t.occurred_at,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ListTransactionsBody {
    pub account_id: Option<Uuid>,
    pub category: Option<String>,
    pub since: Option<DateTime<Utc>>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateTransactionBody {
    pub account_id: Uuid,
    /// Negative for expenses, positive for income.
    pub amount_minor: i64,
    pub category: String,
    pub description: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateTransactionBody {
    pub id: Uuid,
    pub account_id: Option<Uuid>,
    pub amount_minor: Option<i64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
}

#[utoipa::path(post, path = "/rpc/transactions.list", tag = "Rpc", request_body = ListTransactionsBody, responses((status = 200, body = [TransactionOutput])))]
pub async fn list(
    State(ctx): State<AppContext>,
    session: RpcSession,
    RpcInput(body): RpcInput<Option<ListTransactionsBody>>,
) -> RpcResult<Vec<TransactionOutput>> {
    let body = body.unwrap_or_default();
    let repo = ctx.transaction_repo();
    let uc = ListTransactions {
        repo: repo.as_ref(),
    };
    let filter = TransactionFilter {
        account_id: body.account_id,
        category: body.category,
        since: body.since,
        limit: body.limit,
    };
    let txs = uc.execute(session.user_id(), filter).await?;
    Ok(RpcOk(txs.into_iter().map(Into::into).collect()))
}

#[utoipa::path(post, path = "/rpc/transactions.get", tag = "Rpc", request_body = IdInput, responses((status = 200, body = TransactionOutput)))]
pub async fn get_one(
    State(ctx): State<AppContext>,
    session: RpcSession,
    RpcInput(input): RpcInput<IdInput>,
) -> RpcResult<TransactionOutput> {
    let repo = ctx.transaction_repo();
    let uc = GetTransaction {
        repo: repo.as_ref(),
    };
    Ok(RpcOk(uc.execute(input.id, session.user_id()).await?.into()))
}

#[utoipa::path(post, path = "/rpc/transactions.create", tag = "Rpc", request_body = CreateTransactionBody, responses((status = 200, body = TransactionOutput)))]
pub async fn create(
    State(ctx): State<AppContext>,
    session: RpcSession,
    RpcInput(body): RpcInput<CreateTransactionBody>,
) -> RpcResult<TransactionOutput> {
    let repo = ctx.transaction_repo();
    let accounts = ctx.account_repo();
    let uc = CreateTransaction {
        repo: repo.as_ref(),
        accounts: accounts.as_ref(),
    };
    let input = CreateTransactionInput {
        account_id: body.account_id,
        amount_minor: body.amount_minor,
        category: body.category,
        description: body.description,
        occurred_at: body.occurred_at,
    };
    Ok(RpcOk(uc.execute(session.user_id(), &input).await?.into()))
}

#[utoipa::path(post, path = "/rpc/transactions.update", tag = "Rpc", request_body = UpdateTransactionBody, responses((status = 200, body = TransactionOutput)))]
pub async fn update(
    State(ctx): State<AppContext>,
    session: RpcSession,
    RpcInput(body): RpcInput<UpdateTransactionBody>,
) -> RpcResult<TransactionOutput> {
    let repo = ctx.transaction_repo();
    let accounts = ctx.account_repo();
    let uc = UpdateTransaction {
        repo: repo.as_ref(),
        accounts: accounts.as_ref(),
    };
    let patch = UpdateTransactionInput {
        account_id: body.account_id,
        amount_minor: body.amount_minor,
        category: body.category,
        description: body.description,
        occurred_at: body.occurred_at,
    };
    Ok(RpcOk(
        uc.execute(body.id, session.user_id(), &patch).await?.into(),
    ))
}

#[utoipa::path(post, path = "/rpc/transactions.delete", tag = "Rpc", request_body = IdInput, responses((status = 200, body = DeletedOutput)))]
pub async fn delete(
    State(ctx): State<AppContext>,
    session: RpcSession,
    RpcInput(input): RpcInput<IdInput>,
) -> RpcResult<DeletedOutput> {
    let repo = ctx.transaction_repo();
    let uc = DeleteTransaction {
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
    use serde_json::{Value, json};

    use super::*;
    use crate::presentation::rpc::routes;
    use crate::presentation::rpc::test_helpers::*;
    use crate::test_support::test_context;

    async fn account_id(app: &axum::Router, token: &str, name: &str) -> Value {
        data(call(app, "accounts.create", Some(token), json!({"name": name})).await).await["id"]
            .clone()
    }

    #[tokio::test]
    async fn list_filters_by_account_and_orders_newest_first() {
        let (ctx, _dir) = test_context().await;
        let token = signed_up(&ctx, "ada@example.com").await;
        let app = routes(ctx);
        let checking = account_id(&app, &token, "Checking").await;
        let cash = account_id(&app, &token, "Cash").await;

        for (account, amount, at) in [
            (&checking, -1200, "2026-03-01T10:00:00Z"),
            (&checking, 250_000, "2026-03-05T09:00:00Z"),
            (&cash, -450, "2026-03-03T12:00:00Z"),
        ] {
            data(
                call(
                    &app,
                    "transactions.create",
                    Some(&token),
                    json!({"account_id": account, "amount_minor": amount, "category": "Misc", "occurred_at": at}),
                )
                .await,
            )
            .await;
        }

        let all: Vec<TransactionOutput> = serde_json::from_value(
            data(call(&app, "transactions.list", Some(&token), no_input()).await).await,
        )
        .unwrap();
        let amounts: Vec<i64> = all.iter().map(|t| t.amount_minor).collect();
        assert_eq!(amounts, vec![250_000, -450, -1200]);
        assert!(all.iter().all(|t| t.category == "misc"));

        let only_cash: Vec<TransactionOutput> = serde_json::from_value(
            data(
                call(
                    &app,
                    "transactions.list",
                    Some(&token),
                    json!({"account_id": cash}),
                )
                .await,
            )
            .await,
        )
        .unwrap();
        assert_eq!(only_cash.len(), 1);
        assert_eq!(only_cash[0].amount_minor, -450);
    }

    #[tokio::test]
    async fn cannot_book_against_someone_elses_account() {
        let (ctx, _dir) = test_context().await;
        let alice = signed_up(&ctx, "alice@example.com").await;
        let bob = signed_up(&ctx, "bob@example.com").await;
        let app = routes(ctx);
        let alices = account_id(&app, &alice, "Checking").await;

        let res = call(
            &app,
            "transactions.create",
            Some(&bob),
            json!({"account_id": alices, "amount_minor": -100, "category": "food"}),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let res = call(
            &app,
            "transactions.create",
            Some(&alice),
            json!({"account_id": alices, "amount_minor": 0, "category": "food"}),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn huge_expenses_are_rejected_and_budgets_stay_readable() {
        let (ctx, _dir) = test_context().await;
        let token = signed_up(&ctx, "ada@example.com").await;
        let app = routes(ctx);
        let checking = account_id(&app, &token, "Checking").await;

        for _ in 0..2 {
            let res = call(
                &app,
                "transactions.create",
                Some(&token),
                json!({"account_id": checking, "amount_minor": -5_000_000_000_000_000_000i64, "category": "food"}),
            )
            .await;
            assert_eq!(res.status(), StatusCode::BAD_REQUEST);
            assert_eq!(error_code(res).await, "BAD_REQUEST");
        }

        let res = call(
            &app,
            "budgets.create",
            Some(&token),
            json!({"category": "food", "limit_minor": 100}),
        )
        .await;
        let budget = data(res).await;
        assert_eq!(budget["spent_minor"], 0);
    }
}
