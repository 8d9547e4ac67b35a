use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::dto::auth::{SignInRequest, SignUpRequest};
use crate::application::error::{AppError, AppResult};
use crate::application::use_cases::auth::IssuedSession;
use crate::application::use_cases::auth::delete_account::DeleteAccount;
use crate::application::use_cases::auth::get_session::GetSession;
use crate::application::use_cases::auth::sign_in::SignIn;
use crate::application::use_cases::auth::sign_out::SignOut;
use crate::application::use_cases::auth::sign_up::SignUp;
use crate::bootstrap::app_context::AppContext;
use crate::domain::auth::session::Session;
use crate::domain::users::user::User;
use crate::presentation::http::session::{
    SessionToken, authorized_token, check_origin, clear_session_cookie, client_info,
    cookie_headers, session_cookie,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignUpBody {
    pub email: String,
    pub password: String,
    pub name: String,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignInBody {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.name,
            image: u.image,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SessionResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub expires_at: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Session> for SessionResponse {
    fn from(s: Session) -> Self {
        Self {
            id: s.id,
            user_id: s.user_id,
            expires_at: s.expires_at,
            ip_address: s.ip_address,
            user_agent: s.user_agent,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SessionEnvelope {
    pub session: SessionResponse,
    pub user: UserResponse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SignOutResponse {
    pub success: bool,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/sign-up/email", post(sign_up_email))
        .route("/sign-in/email", post(sign_in_email))
        .route("/sign-out", post(sign_out))
        .route("/get-session", get(get_session))
        .route("/delete-user", post(delete_user))
        .with_state(ctx)
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::validation(rejection.body_text()))
}

fn issued_response(ctx: &AppContext, issued: IssuedSession) -> (HeaderMap, Json<AuthResponse>) {
    let cookie = session_cookie(&issued.token, ctx.cfg.session_expires_secs);
    (
        cookie_headers(&cookie),
        Json(AuthResponse {
            token: issued.token,
            user: issued.user.into(),
        }),
    )
}

#[utoipa::path(post, path = "/api/auth/sign-up/email", tag = "Auth", request_body = SignUpBody, security(()), responses(
    (status = 200, body = AuthResponse),
    (status = 400, body = crate::presentation::http::error::ErrorBody),
    (status = 422, body = crate::presentation::http::error::ErrorBody)
))]
pub async fn sign_up_email(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    payload: Result<Json<SignUpBody>, JsonRejection>,
) -> AppResult<(HeaderMap, Json<AuthResponse>)> {
    check_origin(&ctx.cfg, &headers)?;
    let body = json_body(payload)?;
    let users = ctx.user_repo();
    let sessions = ctx.session_repo();
    let uc = SignUp {
        users: users.as_ref(),
        sessions: sessions.as_ref(),
        policy: ctx.session_policy(),
    };
    let req = SignUpRequest {
        email: body.email,
        password: body.password,
        name: body.name,
        image: body.image,
    };
    let issued = uc.execute(&req, &client_info(&headers)).await?;
    Ok(issued_response(&ctx, issued))
}

#[utoipa::path(post, path = "/api/auth/sign-in/email", tag = "Auth", request_body = SignInBody, security(()), responses(
    (status = 200, body = AuthResponse),
    (status = 401, body = crate::presentation::http::error::ErrorBody)
))]
pub async fn sign_in_email(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    payload: Result<Json<SignInBody>, JsonRejection>,
) -> AppResult<(HeaderMap, Json<AuthResponse>)> {
    check_origin(&ctx.cfg, &headers)?;
    let body = json_body(payload)?;
    let users = ctx.user_repo();
    let sessions = ctx.session_repo();
    let uc = SignIn {
        users: users.as_ref(),
        sessions: sessions.as_ref(),
        policy: ctx.session_policy(),
    };
    let req = SignInRequest {
        email: body.email,
        password: body.password,
    };
    let issued = uc.execute(&req, &client_info(&headers)).await?;
    Ok(issued_response(&ctx, issued))
}

#[utoipa::path(post, path = "/api/auth/sign-out", tag = "Auth", responses(
    (status = 200, body = SignOutResponse)
))]
pub async fn sign_out(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
    SessionToken(token): SessionToken,
) -> AppResult<(HeaderMap, Json<SignOutResponse>)> {
    check_origin(&ctx.cfg, &headers)?;
    if let Some(token) = token.as_deref() {
        let sessions = ctx.session_repo();
        let uc = SignOut {
            sessions: sessions.as_ref(),
        };
        uc.execute(token).await?;
    }
    Ok((
        cookie_headers(&clear_session_cookie()),
        Json(SignOutResponse { success: true }),
    ))
}

#[utoipa::path(get, path = "/api/auth/get-session", tag = "Auth", responses(
    (status = 200, body = SessionEnvelope, description = "null when there is no active session")
))]
pub async fn get_session(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
) -> AppResult<(HeaderMap, Json<Option<SessionEnvelope>>)> {
    let Some(token) = authorized_token(&ctx.cfg, &headers)? else {
        return Ok((HeaderMap::new(), Json(None)));
    };
    let users = ctx.user_repo();
    let sessions = ctx.session_repo();
    let uc = GetSession {
        users: users.as_ref(),
        sessions: sessions.as_ref(),
        policy: ctx.session_policy(),
    };
    let Some(active) = uc.execute(&token).await? else {
        return Ok((cookie_headers(&clear_session_cookie()), Json(None)));
    };
    let headers = if active.refreshed {
        cookie_headers(&session_cookie(&token, ctx.cfg.session_expires_secs))
    } else {
        HeaderMap::new()
    };
    Ok((
        headers,
        Json(Some(SessionEnvelope {
            session: active.session.into(),
            user: active.user.into(),
        })),
    ))
}

#[utoipa::path(post, path = "/api/auth/delete-user", tag = "Auth", responses(
    (status = 200, body = SignOutResponse),
    (status = 401, body = crate::presentation::http::error::ErrorBody),
    (status = 403, body = crate::presentation::http::error::ErrorBody)
))]
pub async fn delete_user(
    State(ctx): State<AppContext>,
    headers: HeaderMap,
) -> AppResult<(HeaderMap, Json<SignOutResponse>)> {
    check_origin(&ctx.cfg, &headers)?;
    let token = authorized_token(&ctx.cfg, &headers)?;
    let users = ctx.user_repo();
    let sessions = ctx.session_repo();
    let active = GetSession {
        users: users.as_ref(),
        sessions: sessions.as_ref(),
        policy: ctx.session_policy(),
    }
    .require(token.as_deref())
    .await?;
    DeleteAccount {
        users: users.as_ref(),
        sessions: sessions.as_ref(),
    }
    .execute(active.user.id)
    .await?;
    Ok((
        cookie_headers(&clear_session_cookie()),
        Json(SignOutResponse { success: true }),
    ))
}
