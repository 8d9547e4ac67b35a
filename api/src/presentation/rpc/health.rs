use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::auth::UserResponse;
use crate::presentation::rpc::{RpcOk, RpcResult, RpcSession};

pub const STATUS_OK: &str = "OK";
pub const STATUS_DEGRADED: &str = "DEGRADED";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthCheckOutput {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PrivateDataOutput {
    pub message: String,
    pub user: UserResponse,
}

#[utoipa::path(
    post,
    path = "/rpc/healthCheck",
    tag = "Rpc",
    security(()),
    responses((status = 200, body = HealthCheckOutput, description = "wrapped in result.data"))
)]
pub async fn health_check(State(ctx): State<AppContext>) -> RpcResult<HealthCheckOutput> {
    let status = match ctx.store().ping().await {
        Ok(()) => STATUS_OK,
        Err(e) => {
            tracing::warn!(error = %e, "health_check_degraded");
            STATUS_DEGRADED
        }
    };
    Ok(RpcOk(HealthCheckOutput {
        status: status.to_string(),
        timestamp: Utc::now(),
    }))
}

#[utoipa::path(
    post,
    path = "/rpc/privateData",
    tag = "Rpc",
    responses(
        (status = 200, body = PrivateDataOutput, description = "wrapped in result.data"),
        (status = 401, body = crate::presentation::rpc::RpcErrorEnvelope)
    )
)]
pub async fn private_data(session: RpcSession) -> RpcResult<PrivateDataOutput> {
    Ok(RpcOk(PrivateDataOutput {
        message: "This is private".to_string(),
        user: session.0.user.into(),
    }))
}
