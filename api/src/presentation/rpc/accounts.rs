use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::dto::finance::{CreateAccountInput, UpdateAccountInput};
use crate::application::use_cases::accounts::{
    CreateAccount, DeleteAccount, GetAccount, ListAccounts, UpdateAccount,
};
use crate::bootstrap::app_context::AppContext;
use crate::domain::finance::account::Account;
use crate::presentation::rpc::{DeletedOutput, IdInput, RpcInput, RpcOk, RpcResult, RpcSession};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AccountOutput {
    pub id: Uuid,
    pub name: String,
    pub kind: String,
    pub currency: String,
    pub balance_minor: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Account> for AccountOutput {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            name: a.name,
            kind: a.kind.as_str().to_string(),
            currency: a.currency,
            balance_minor: a.balance_minor,
            created_at: a.created_at,
            updated_at: a.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateAccountBody {
    pub name: String,
    pub kind: Option<String>,
    /// ISO 4217 code, defaults to `USD`.
    pub currency: Option<String>,
    pub balance_minor: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateAccountBody {
    pub id: Uuid,
    pub name: Option<String>,
    pub kind: Option<String>,
    pub currency: Option<String>,
    pub balance_minor: Option<i64>,
}

#[utoipa::path(post, path = "/rpc/accounts.list", tag = "Rpc", responses((status = 200, body = [AccountOutput])))]
pub async fn list(
    State(ctx): State<AppContext>,
    session: RpcSession,
) -> RpcResult<Vec<AccountOutput>> {
    let repo = ctx.account_repo();
    let uc = ListAccounts {
        repo: repo.as_ref(),
    };
    let accounts = uc.execute(session.user_id()).await?;
    Ok(RpcOk(accounts.into_iter().map(Into::into).collect()))
}

#[utoipa::path(post, path = "/rpc/accounts.get", tag = "Rpc", request_body = IdInput, responses((status = 200, body = AccountOutput)))]
pub async fn get_one(
    State(ctx): State<AppContext>,
    session: RpcSession,
    RpcInput(input): RpcInput<IdInput>,
) -> RpcResult<AccountOutput> {
    let repo = ctx.account_repo();
    let uc = GetAccount {
        repo: repo.as_ref(),
    };
    Ok(RpcOk(uc.execute(input.id, session.user_id()).await?.into()))
}

#[utoipa::path(post, path = "/rpc/accounts.create", tag = "Rpc", request_body = CreateAccountBody, responses((status = 200, body = AccountOutput)))]
pub async fn create(
    State(ctx): State<AppContext>,
    session: RpcSession,
    RpcInput(body): RpcInput<CreateAccountBody>,
) -> RpcResult<AccountOutput> {
    let repo = ctx.account_repo();
    let uc = CreateAccount {
        repo: repo.as_ref(),
    };
    let input = CreateAccountInput {
        name: body.name,
        kind: body.kind,
        currency: body.currency,
        balance_minor: body.balance_minor,
    };
    Ok(RpcOk(uc.execute(session.user_id(), &input).await?.into()))
}

#[utoipa::path(post, path = "/rpc/accounts.update", tag = "Rpc", request_body = UpdateAccountBody, responses((status = 200, body = AccountOutput)))]
pub async fn update(
    State(ctx): State<AppContext>,
    session: RpcSession,
    RpcInput(body): RpcInput<UpdateAccountBody>,
) -> RpcResult<AccountOutput> {
    let repo = ctx.account_repo();
    let uc = UpdateAccount {
        repo: repo.as_ref(),
    };
    let patch = UpdateAccountInput {
        name: body.name,
        kind: body.kind,
        currency: body.currency,
        balance_minor: body.balance_minor,
    };
    Ok(RpcOk(
        uc.execute(body.id, session.user_id(), &patch).await?.into(),
    ))
}

/// Deleting an account also removes its transactions.
#[utoipa::path(post, path = "/rpc/accounts.delete", tag = "Rpc", request_body = IdInput, responses((status = 200, body = DeletedOutput)))]
pub async fn delete(
    State(ctx): State<AppContext>,
    session: RpcSession,
    RpcInput(input): RpcInput<IdInput>,
) -> RpcResult<DeletedOutput> {
    let repo = ctx.account_repo();
    let uc = DeleteAccount {
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
    async fn account_round_trip_normalizes_currency() {
        let (ctx, _dir) = test_context().await;
        let token = signed_up(&ctx, "ada@example.com").await;
        let app = routes(ctx);
        let token = Some(token.as_str());

        let created: AccountOutput = serde_json::from_value(
            data(
                call(
                    &app,
                    "accounts.create",
                    token,
                    json!({"name": "Savings", "kind": "savings", "currency": "eur", "balance_minor": 50_000}),
                )
                .await,
            )
            .await,
        )
        .unwrap();
        assert_eq!(created.currency, "EUR");

        let fetched: AccountOutput = serde_json::from_value(
            data(call(&app, "accounts.get", token, json!({"id": created.id})).await).await,
        )
        .unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.kind, "savings");
        assert_eq!(fetched.balance_minor, 50_000);
        assert_eq!(fetched.created_at, created.created_at);
    }

    #[tokio::test]
    async fn unknown_kind_is_rejected() {
        let (ctx, _dir) = test_context().await;
        let token = signed_up(&ctx, "ada@example.com").await;
        let app = routes(ctx);
        let res = call(
            &app,
            "accounts.create",
            Some(&token),
            json!({"name": "Piggy", "kind": "piggybank"}),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
