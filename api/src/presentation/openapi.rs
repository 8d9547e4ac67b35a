use utoipa::OpenApi;

use crate::presentation::http::{auth, error};
use crate::presentation::rpc::{self, accounts, budgets, habits, health, transactions};

#[derive(OpenApi)]
#[openapi(
        paths(
            auth::sign_up_email,
            auth::sign_in_email,
            auth::sign_out,
            auth::get_session,
            auth::delete_user,
            health::health_check,
            health::private_data,
            habits::list,
            habits::get_one,
            habits::create,
            habits::update,
            habits::delete,
            accounts::list,
            accounts::get_one,
            accounts::create,
            accounts::update,
            accounts::delete,
            transactions::list,
            transactions::get_one,
            transactions::create,
            transactions::update,
            transactions::delete,
            budgets::list,
            budgets::get_one,
            budgets::create,
            budgets::update,
            budgets::delete,
        ),
        components(schemas(
            error::ErrorBody,
            auth::SignUpBody,
            auth::SignInBody,
            auth::UserResponse,
            auth::SessionResponse,
            auth::AuthResponse,
            auth::SessionEnvelope,
            auth::SignOutResponse,
            rpc::RpcErrorBody,
            rpc::RpcErrorEnvelope,
            rpc::IdInput,
            rpc::DeletedOutput,
            health::HealthCheckOutput,
            health::PrivateDataOutput,
            habits::HabitOutput,
            habits::CreateHabitBody,
            habits::UpdateHabitBody,
            accounts::AccountOutput,
            accounts::CreateAccountBody,
            accounts::UpdateAccountBody,
            transactions::TransactionOutput,
            transactions::ListTransactionsBody,
            transactions::CreateTransactionBody,
            transactions::UpdateTransactionBody,
            budgets::BudgetOutput,
            budgets::CreateBudgetBody,
            budgets::UpdateBudgetBody,
        )),
        tags(
            (name = "Auth", description = "Email sign-up, sign-in and sessions"),
            (name = "Rpc", description = "Remote procedures; payloads are wrapped in result.data")
        )
    )]
pub struct ApiDoc;
