use std::sync::Arc;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use uuid::Uuid;

use crate::client::error::RpcClientError;
use crate::client::transport::RpcTransport;
use crate::presentation::rpc::DeletedOutput;
use crate::presentation::rpc::IdInput;
use crate::presentation::rpc::accounts::{AccountOutput, CreateAccountBody, UpdateAccountBody};
use crate::presentation::rpc::budgets::{BudgetOutput, CreateBudgetBody, UpdateBudgetBody};
use crate::presentation::rpc::habits::{CreateHabitBody, HabitOutput, UpdateHabitBody};
use crate::presentation::rpc::health::{HealthCheckOutput, PrivateDataOutput};
use crate::presentation::rpc::transactions::{
    CreateTransactionBody, ListTransactionsBody, TransactionOutput, UpdateTransactionBody,
};

/// Typed wrapper over the server's procedures. Cheap to clone; every call is
/// independent.
#[derive(Clone)]
pub struct RpcClient {
    transport: Arc<dyn RpcTransport>,
}

impl RpcClient {
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self { transport }
    }

    pub async fn call<I, O>(&self, procedure: &str, input: Option<&I>) -> Result<O, RpcClientError>
    where
        I: Serialize + ?Sized,
        O: DeserializeOwned,
    {
        let input = input
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| RpcClientError::Decode(e.to_string()))?;
        let data = self.transport.call(procedure, input).await?;
        serde_json::from_value(data).map_err(|e| {
            tracing::debug!(procedure, error = %e, "rpc_decode_failed");
            RpcClientError::Decode(e.to_string())
        })
    }

    async fn query<O: DeserializeOwned>(&self, procedure: &str) -> Result<O, RpcClientError> {
        self.call::<Value, O>(procedure, None).await
    }

    async fn by_id<O: DeserializeOwned>(&self, procedure: &str, id: Uuid) -> Result<O, RpcClientError> {
        self.call(procedure, Some(&IdInput { id })).await
    }

    pub async fn health_check(&self) -> Result<HealthCheckOutput, RpcClientError> {
        self.query("healthCheck").await
    }

    pub async fn private_data(&self) -> Result<PrivateDataOutput, RpcClientError> {
        self.query("privateData").await
    }

    pub async fn list_habits(&self) -> Result<Vec<HabitOutput>, RpcClientError> {
        self.query("habits.list").await
    }

    pub async fn get_habit(&self, id: Uuid) -> Result<HabitOutput, RpcClientError> {
        self.by_id("habits.get", id).await
    }

    pub async fn create_habit(&self, input: &CreateHabitBody) -> Result<HabitOutput, RpcClientError> {
        self.call("habits.create", Some(input)).await
    }

    pub async fn update_habit(&self, input: &UpdateHabitBody) -> Result<HabitOutput, RpcClientError> {
        self.call("habits.update", Some(input)).await
    }

    pub async fn delete_habit(&self, id: Uuid) -> Result<DeletedOutput, RpcClientError> {
        self.by_id("habits.delete", id).await
    }

    pub async fn list_accounts(&self) -> Result<Vec<AccountOutput>, RpcClientError> {
        self.query("accounts.list").await
    }

    pub async fn get_account(&self, id: Uuid) -> Result<AccountOutput, RpcClientError> {
        self.by_id("accounts.get", id).await
    }

    pub async fn create_account(
        &self,
        input: &CreateAccountBody,
    ) -> Result<AccountOutput, RpcClientError> {
        self.call("accounts.create", Some(input)).await
    }

    pub async fn update_account(
        &self,
        input: &UpdateAccountBody,
    ) -> Result<AccountOutput, RpcClientError> {
        self.call("accounts.update", Some(input)).await
    }

    pub async fn delete_account(&self, id: Uuid) -> Result<DeletedOutput, RpcClientError> {
        self.by_id("accounts.delete", id).await
    }

    pub async fn list_transactions(
        &self,
        filter: &ListTransactionsBody,
    ) -> Result<Vec<TransactionOutput>, RpcClientError> {
        self.call("transactions.list", Some(filter)).await
    }

    pub async fn get_transaction(&self, id: Uuid) -> Result<TransactionOutput, RpcClientError> {
        self.by_id("transactions.get", id).await
    }

    pub async fn create_transaction(
        &self,
        input: &CreateTransactionBody,
    ) -> Result<TransactionOutput, RpcClientError> {
        self.call("transactions.create", Some(input)).await
    }

    pub async fn update_transaction(
        &self,
        input: &UpdateTransactionBody,
    ) -> Result<TransactionOutput, RpcClientError> {
        self.call("transactions.update", Some(input)).await
    }

    pub async fn delete_transaction(&self, id: Uuid) -> Result<DeletedOutput, RpcClientError> {
        self.by_id("transactions.delete", id).await
    }

    pub async fn list_budgets(&self) -> Result<Vec<BudgetOutput>, RpcClientError> {
        self.query("budgets.list").await
    }

    pub async fn get_budget(&self, id: Uuid) -> Result<BudgetOutput, RpcClientError> {
        self.by_id("budgets.get", id).await
    }

    pub async fn create_budget(&self, input: &CreateBudgetBody) -> Result<BudgetOutput, RpcClientError> {
        self.call("budgets.create", Some(input)).await
    }

    pub async fn update_budget(&self, input: &UpdateBudgetBody) -> Result<BudgetOutput, RpcClientError> {
        self.call("budgets.update", Some(input)).await
    }

    pub async fn delete_budget(&self, id: Uuid) -> Result<DeletedOutput, RpcClientError> {
        self.by_id("budgets.delete", id).await
    }
}


#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::fake::ScriptedTransport;
    use super::*;

    #[tokio::test]
    async fn typed_calls_send_input_and_decode_output() {
        let id = Uuid::new_v4();
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(json!({
            "id": id,
            "name": "Run",
            "description": null,
            "frequency": "daily",
            "target_count": 1,
            "created_at": "2026-01-01T00:00:00Z",
            "updated_at": "2026-01-01T00:00:00Z"
        }))]));
        let client = RpcClient::new(transport.clone());

        let habit = client.get_habit(id).await.unwrap();
        assert_eq!(habit.id, id);

        let calls = transport.calls.lock().unwrap();
        assert_eq!(calls[0].0, "habits.get");
        assert_eq!(calls[0].1, Some(json!({"id": id})));
    }

    #[tokio::test]
    async fn unexpected_shape_is_a_decode_error() {
        let transport = Arc::new(ScriptedTransport::new(vec![Ok(json!({"nope": true}))]));
        let client = RpcClient::new(transport);
        let err = client.health_check().await.unwrap_err();
        assert!(matches!(err, RpcClientError::Decode(_)));
    }

    #[tokio::test]
    async fn server_errors_pass_through() {
        let transport = Arc::new(ScriptedTransport::new(vec![Err(RpcClientError::Server {
            status: 401,
            code: "UNAUTHORIZED".into(),
            message: "invalid or missing session".into(),
        })]));
        let client = RpcClient::new(transport);
        assert!(client.list_habits().await.unwrap_err().is_unauthorized());
    }
}
