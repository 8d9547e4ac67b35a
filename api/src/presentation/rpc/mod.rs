//! Remote procedure endpoints under `/rpc/<procedure>`.
//!
//! Every response is wrapped: `{"result":{"data":..}}` on success,
//! `{"error":{"code":..,"message":..}}` with a matching HTTP status otherwise.
//! Queries accept `GET ?input=<json>` or `POST <json>`; mutations are `POST`.

use std::collections::HashMap;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::{HeaderMap, Method, header, request::Parts},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::error::AppError;
use crate::application::use_cases::auth::get_session::{ActiveSession, GetSession};
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::error::{code_of, log_error, status_of};
use crate::presentation::http::session::authorized_token;

pub mod accounts;
pub mod budgets;
pub mod habits;
pub mod health;
pub mod transactions;

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/healthCheck", get(health::health_check).post(health::health_check))
        .route("/privateData", get(health::private_data).post(health::private_data))
        .route("/habits.list", get(habits::list).post(habits::list))
        .route("/habits.get", get(habits::get_one).post(habits::get_one))
        .route("/habits.create", post(habits::create))
        .route("/habits.update", post(habits::update))
        .route("/habits.delete", post(habits::delete))
        .route("/accounts.list", get(accounts::list).post(accounts::list))
        .route("/accounts.get", get(accounts::get_one).post(accounts::get_one))
        .route("/accounts.create", post(accounts::create))
        .route("/accounts.update", post(accounts::update))
        .route("/accounts.delete", post(accounts::delete))
        .route("/transactions.list", get(transactions::list).post(transactions::list))
        .route("/transactions.get", get(transactions::get_one).post(transactions::get_one))
        .route("/transactions.create", post(transactions::create))
        .route("/transactions.update", post(transactions::update))
        .route("/transactions.delete", post(transactions::delete))
        .route("/budgets.list", get(budgets::list).post(budgets::list))
        .route("/budgets.get", get(budgets::get_one).post(budgets::get_one))
        .route("/budgets.create", post(budgets::create))
        .route("/budgets.update", post(budgets::update))
        .route("/budgets.delete", post(budgets::delete))
        .with_state(ctx)
}

#[derive(Debug, Serialize)]
struct ResultBody<T> {
    data: T,
}

#[derive(Debug, Serialize)]
struct SuccessEnvelope<T> {
    result: ResultBody<T>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RpcErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RpcErrorEnvelope {
    pub error: RpcErrorBody,
}

/// Successful procedure output.
pub struct RpcOk<T>(pub T);

impl<T: Serialize> IntoResponse for RpcOk<T> {
    fn into_response(self) -> Response {
        Json(SuccessEnvelope {
            result: ResultBody { data: self.0 },
        })
        .into_response()
    }
}

#[derive(Debug)]
pub struct RpcError(pub AppError);

impl From<AppError> for RpcError {
    fn from(err: AppError) -> Self {
        RpcError(err)
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let err = self.0;
        log_error(&err);
        let body = RpcErrorEnvelope {
            error: RpcErrorBody {
                code: code_of(&err).to_string(),
                message: err.public_message(),
            },
        };
        (status_of(&err), Json(body)).into_response()
    }
}

pub type RpcResult<T> = Result<RpcOk<T>, RpcError>;

/// Procedure input decoded from `?input=` (GET) or the request body (POST).
/// A missing input decodes as JSON `null`; a non-empty body must be sent as
/// `application/json`.
pub struct RpcInput<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for RpcInput<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = RpcError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let raw = if req.method() == Method::GET {
            let Query(params) = Query::<HashMap<String, String>>::try_from_uri(req.uri())
                .map_err(|e| AppError::validation(e.body_text()))?;
            params.get("input").cloned().unwrap_or_default()
        } else {
            let json_body = is_json(req.headers());
            let bytes = Bytes::from_request(req, state)
                .await
                .map_err(|e| AppError::validation(e.body_text()))?;
            if !json_body && !bytes.iter().all(u8::is_ascii_whitespace) {
                return Err(RpcError(AppError::validation(
                    "input must be sent as application/json",
                )));
            }
            String::from_utf8(bytes.to_vec())
                .map_err(|_| AppError::validation("input must be UTF-8 JSON"))?
        };
        let raw = match raw.trim() {
            "" => "null",
            trimmed => trimmed,
        };
        serde_json::from_str(raw)
            .map(RpcInput)
            .map_err(|e| RpcError(AppError::validation(format!("invalid input: {e}"))))
    }
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

/// Caller's active session; procedures taking it reject anonymous calls.
/// Cookie sessions are refused for origins outside the allow-list.
pub struct RpcSession(pub ActiveSession);

impl RpcSession {
    pub fn user_id(&self) -> Uuid {
        self.0.user.id
    }
}

#[axum::async_trait]
impl FromRequestParts<AppContext> for RpcSession {
    type Rejection = RpcError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &AppContext,
    ) -> Result<Self, Self::Rejection> {
        let token = authorized_token(&ctx.cfg, &parts.headers)?;
        let users = ctx.user_repo();
        let sessions = ctx.session_repo();
        let uc = GetSession {
            users: users.as_ref(),
            sessions: sessions.as_ref(),
            policy: ctx.session_policy(),
        };
        Ok(RpcSession(uc.require(token.as_deref()).await?))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IdInput {
    pub id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DeletedOutput {
    pub id: Uuid,
    pub deleted: bool,
}
