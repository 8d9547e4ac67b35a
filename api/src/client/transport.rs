use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use url::Url;

use crate::client::error::RpcClientError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Carries one procedure call to the server and unwraps the response envelope.
#[async_trait]
pub trait RpcTransport: Send + Sync {
    async fn call(&self, procedure: &str, input: Option<Value>) -> Result<Value, RpcClientError>;
}

pub struct HttpTransport {
    http: reqwest::Client,
    base_url: Url,
    session_token: Option<String>,
}

impl HttpTransport {
    pub fn new(base_url: &str) -> Result<Self, RpcClientError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| RpcClientError::Connection(format!("invalid server url: {e}")))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| RpcClientError::Connection(e.to_string()))?;
        Ok(Self {
            http,
            base_url,
            session_token: None,
        })
    }

    /// Sends the token as `Authorization: Bearer` on every call.
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into()).filter(|t: &String| !t.is_empty());
        self
    }

    fn procedure_url(&self, procedure: &str) -> Result<Url, RpcClientError> {
        self.base_url
            .join(&format!("rpc/{procedure}"))
            .map_err(|e| RpcClientError::Connection(format!("invalid procedure url: {e}")))
    }
}

#[async_trait]
impl RpcTransport for HttpTransport {
    async fn call(&self, procedure: &str, input: Option<Value>) -> Result<Value, RpcClientError> {
        let mut req = self
            .http
            .post(self.procedure_url(procedure)?)
            .json(&input.unwrap_or(Value::Null));
        if let Some(token) = &self.session_token {
            req = req.bearer_auth(token);
        }
        let res = req.send().await?;
        let status = res.status().as_u16();
        let body: Value = res.json().await?;
        unwrap_envelope(status, body)
    }
}

/// Splits a `{"result":{"data":..}}` / `{"error":{..}}` envelope.
pub(crate) fn unwrap_envelope(status: u16, mut body: Value) -> Result<Value, RpcClientError> {
    if let Some(error) = body.get("error").filter(|e| e.is_object()) {
        let field = |name: &str| {
            error
                .get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        return Err(RpcClientError::Server {
            status,
            code: field("code"),
            message: field("message"),
        });
    }
    match body.pointer_mut("/result/data") {
        Some(data) => Ok(data.take()),
        None => Err(RpcClientError::Decode(format!(
            "missing result envelope (status {status})"
        ))),
    }
}
