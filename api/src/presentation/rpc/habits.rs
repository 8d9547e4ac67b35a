use axum::extract::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::dto::habits::{CreateHabitInput, UpdateHabitInput};
use crate::application::use_cases::habits::{
    CreateHabit, DeleteHabit, GetHabit, ListHabits, UpdateHabit,
};
use crate::bootstrap::app_context::AppContext;
use crate::domain::habits::habit::Habit;
use crate::presentation::rpc::{DeletedOutput, IdInput, RpcInput, RpcOk, RpcResult, RpcSession};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HabitOutput {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub frequency: String,
    pub target_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Habit> for HabitOutput {
    fn from(h: Habit) -> Self {
        Self {
            id: h.id,
            name: h.name,
            description: h.description,
            frequency: h.frequency.as_str().to_string(),
            target_count: h.target_count,
            created_at: h.created_at,
            updated_at: h.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateHabitBody {
    pub name: String,
    pub description: Option<String>,
    /// `daily` (default), `weekly` or `monthly`.
    pub frequency: Option<String>,
    pub target_count: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateHabitBody {
    pub id: Uuid,
    pub name: Option<String>,
    /// Empty string clears the description.
    pub description: Option<String>,
    pub frequency: Option<String>,
    pub target_count: Option<i64>,
}

#[utoipa::path(post, path = "/rpc/habits.list", tag = "Rpc", responses((status = 200, body = [HabitOutput])))]
pub async fn list(State(ctx): State<AppContext>, session: RpcSession) -> RpcResult<Vec<HabitOutput>> {
    let repo = ctx.habit_repo();
    let uc = ListHabits {
        repo: repo.as_ref(),
    };
    let habits = uc.execute(session.user_id()).await?;
    Ok(RpcOk(habits.into_iter().map(Into::into).collect()))
}

#[utoipa::path(post, path = "/rpc/habits.get", tag = "Rpc", request_body = IdInput, responses((status = 200, body = HabitOutput)))]
pub async fn get_one(
    State(ctx): State<AppContext>,
    session: RpcSession,
    RpcInput(input): RpcInput<IdInput>,
) -> RpcResult<HabitOutput> {
    let repo = ctx.habit_repo();
    let uc = GetHabit {
        repo: repo.as_ref(),
    };
    Ok(RpcOk(uc.execute(input.id, session.user_id()).await?.into()))
}

#[utoipa::path(post, path = "/rpc/habits.create", tag = "Rpc", request_body = CreateHabitBody, responses((status = 200, body = HabitOutput)))]
pub async fn create(
    State(ctx): State<AppContext>,
    session: RpcSession,
    RpcInput(body): RpcInput<CreateHabitBody>,
) -> RpcResult<HabitOutput> {
    let repo = ctx.habit_repo();
    let uc = CreateHabit {
        repo: repo.as_ref(),
    };
    let input = CreateHabitInput {
        name: body.name,
        description: body.description,
        frequency: body.frequency,
        target_count: body.target_count,
    };
    Ok(RpcOk(uc.execute(session.user_id(), &input).await?.into()))
}

#[utoipa::path(post, path = "/rpc/habits.update", tag = "Rpc", request_body = UpdateHabitBody, responses((status = 200, body = HabitOutput)))]
pub async fn update(
    State(ctx): State<AppContext>,
    session: RpcSession,
    RpcInput(body): RpcInput<UpdateHabitBody>,
) -> RpcResult<HabitOutput> {
    let repo = ctx.habit_repo();
    let uc = UpdateHabit {
        repo: repo.as_ref(),
    };
    let patch = UpdateHabitInput {
        name: body.name,
        description: body.description,
        frequency: body.frequency,
        target_count: body.target_count,
    };
    Ok(RpcOk(
        uc.execute(body.id, session.user_id(), &patch).await?.into(),
    ))
}

#[utoipa::path(post, path = "/rpc/habits.delete", tag = "Rpc", request_body = IdInput, responses((status = 200, body = DeletedOutput)))]
pub async fn delete(
    State(ctx): State<AppContext>,
    session: RpcSession,
    RpcInput(input): RpcInput<IdInput>,
) -> RpcResult<DeletedOutput> {
    let repo = ctx.habit_repo();
    let uc = DeleteHabit {
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
    async fn habit_lifecycle() {
        let (ctx, _dir) = test_context().await;
        let token = signed_up(&ctx, "ada@example.com").await;
        let app = routes(ctx);
        let token = Some(token.as_str());

        let created: HabitOutput = serde_json::from_value(
            data(
                call(
                    &app,
                    "habits.create",
                    token,
                    json!({"name": "Run", "frequency": "weekly", "target_count": 3}),
                )
                .await,
            )
            .await,
        )
        .unwrap();
        assert_eq!(created.frequency, "weekly");

        let updated: HabitOutput = serde_json::from_value(
            data(
                call(
                    &app,
                    "habits.update",
                    token,
                    json!({"id": created.id, "target_count": 4}),
                )
                .await,
            )
            .await,
        )
        .unwrap();
        assert_eq!(updated.target_count, 4);
        assert_eq!(updated.name, "Run");

        let listed = data(call(&app, "habits.list", token, no_input()).await).await;
        assert_eq!(listed.as_array().map(Vec::len), Some(1));

        data(call(&app, "habits.delete", token, json!({"id": created.id})).await).await;
        let res = call(&app, "habits.get", token, json!({"id": created.id})).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn other_users_habits_are_invisible() {
        let (ctx, _dir) = test_context().await;
        let alice = signed_up(&ctx, "alice@example.com").await;
        let bob = signed_up(&ctx, "bob@example.com").await;
        let app = routes(ctx);

        let created = data(
            call(&app, "habits.create", Some(&alice), json!({"name": "Journal"})).await,
        )
        .await;
        let id = created["id"].clone();

        let listed = data(call(&app, "habits.list", Some(&bob), no_input()).await).await;
        assert_eq!(listed, json!([]));

        for procedure in ["habits.get", "habits.delete"] {
            let res = call(&app, procedure, Some(&bob), json!({"id": id})).await;
            assert_eq!(res.status(), StatusCode::NOT_FOUND, "{procedure}");
        }
        let res = call(&app, "habits.update", Some(&bob), json!({"id": id, "name": "Mine"})).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let still = data(call(&app, "habits.get", Some(&alice), json!({"id": id})).await).await;
        assert_eq!(still["name"], "Journal");
    }

    #[tokio::test]
    async fn invalid_habit_is_rejected() {
        let (ctx, _dir) = test_context().await;
        let token = signed_up(&ctx, "ada@example.com").await;
        let app = routes(ctx);
        let res = call(
            &app,
            "habits.create",
            Some(&token),
            json!({"name": "Run", "target_count": 0}),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
