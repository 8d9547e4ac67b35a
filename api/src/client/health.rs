use std::fmt;

use chrono::{DateTime, Utc};
use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};

use crate::client::procedures::RpcClient;
use crate::client::query::{QueryHandle, QueryPhase, QueryPolicy, QueryState};
use crate::presentation::rpc::health::{HealthCheckOutput, STATUS_OK};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    /// No health check has completed yet.
    Connecting,
    Connected,
    /// The health check failed after its retry.
    Error,
    /// The server answered but not `OK`, or monitoring stopped.
    Disconnected,
}

impl ConnectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionStatus::Connecting => "connecting",
            ConnectionStatus::Connected => "connected",
            ConnectionStatus::Error => "error",
            ConnectionStatus::Disconnected => "disconnected",
        }
    }
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HealthSnapshot {
    pub status: ConnectionStatus,
    /// Server timestamp of the last successful health check.
    pub last_checked: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl HealthSnapshot {
    pub fn from_state(state: &QueryState<HealthCheckOutput>) -> Self {
        let status = match state.phase {
            QueryPhase::Pending => ConnectionStatus::Connecting,
            QueryPhase::Error => ConnectionStatus::Error,
            QueryPhase::Success => match &state.data {
                Some(out) if out.status == STATUS_OK => ConnectionStatus::Connected,
                _ => ConnectionStatus::Disconnected,
            },
        };
        Self {
            status,
            last_checked: state.data.as_ref().map(|out| out.timestamp),
            error: state.error.as_ref().map(ToString::to_string),
        }
    }
}

/// Polls `healthCheck` and derives the connection status from the latest outcome.
pub struct HealthMonitor {
    query: Option<QueryHandle<HealthCheckOutput>>,
    last: HealthSnapshot,
}

impl HealthMonitor {
    pub fn start(client: RpcClient) -> Self {
        Self::with_policy(client, QueryPolicy::default())
    }

    pub fn with_policy(client: RpcClient, policy: QueryPolicy) -> Self {
        let query = QueryHandle::spawn("healthCheck", policy, move || {
            let client = client.clone();
            async move { client.health_check().await }
        });
        Self {
            query: Some(query),
            last: HealthSnapshot::from_state(&QueryState::pending()),
        }
    }

    pub fn snapshot(&self) -> HealthSnapshot {
        match &self.query {
            Some(query) => HealthSnapshot::from_state(&query.state()),
            None => self.last.clone(),
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.snapshot().status
    }

    /// Waits for the next health check outcome; `None` once stopped.
    pub async fn changed(&mut self) -> Option<HealthSnapshot> {
        let state = self.query.as_mut()?.changed().await?;
        self.last = HealthSnapshot::from_state(&state);
        Some(self.last.clone())
    }

    /// Current snapshot followed by every later one; ends when stopped.
    pub fn updates(&self) -> BoxStream<'static, HealthSnapshot> {
        match &self.query {
            Some(query) => query
                .stream()
                .map(|state| HealthSnapshot::from_state(&state))
                .boxed(),
            None => stream::empty().boxed(),
        }
    }

    pub fn refresh(&self) {
        if let Some(query) = &self.query {
            query.refetch();
        }
    }

    /// Cancels polling. The status becomes `Disconnected`; `last_checked` is kept.
    pub fn stop(&mut self) {
        if let Some(query) = self.query.take() {
            self.last = HealthSnapshot::from_state(&query.state());
        }
        self.last.status = ConnectionStatus::Disconnected;
        self.last.error = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use serde_json::json;

    use super::*;
    use crate::client::error::RpcClientError;
    use crate::client::procedures::fake::ScriptedTransport;

    fn monitor(script: Vec<Result<serde_json::Value, RpcClientError>>) -> (HealthMonitor, Arc<ScriptedTransport>) {
        let transport = Arc::new(ScriptedTransport::new(script));
        let client = RpcClient::new(transport.clone());
        (HealthMonitor::start(client), transport)
    }

    fn answer(status: &str, timestamp: &str) -> Result<serde_json::Value, RpcClientError> {
        Ok(json!({"status": status, "timestamp": timestamp}))
    }

    #[tokio::test(start_paused = true)]
    async fn starts_connecting() {
        let (monitor, _t) = monitor(vec![answer("OK", "2026-05-01T12:00:00Z")]);
        assert_eq!(monitor.status(), ConnectionStatus::Connecting);
        assert_eq!(monitor.snapshot().last_checked, None);
    }

    #[tokio::test(start_paused = true)]
    async fn ok_answer_connects_and_records_server_time() {
        let (mut monitor, _t) = monitor(vec![answer("OK", "2026-05-01T12:00:00Z")]);
        let snap = monitor.changed().await.unwrap();
        assert_eq!(snap.status, ConnectionStatus::Connected);
        assert_eq!(
            snap.last_checked,
            Some("2026-05-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failing_check_is_retried_once_then_reported() {
        let (mut monitor, transport) =
            monitor(vec![Err(RpcClientError::Connection("refused".into()))]);
        let snap = monitor.changed().await.unwrap();
        assert_eq!(snap.status, ConnectionStatus::Error);
        assert!(snap.error.unwrap().contains("refused"));

        let times = transport.call_times();
        assert_eq!(times.len(), 2);
        assert_eq!(times[1] - times[0], Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn degraded_answer_is_disconnected() {
        let (mut monitor, _t) = monitor(vec![answer("DEGRADED", "2026-05-01T12:00:00Z")]);
        let snap = monitor.changed().await.unwrap();
        assert_eq!(snap.status, ConnectionStatus::Disconnected);
        assert!(snap.last_checked.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn polls_every_thirty_seconds_and_recovers() {
        let (mut monitor, transport) = monitor(vec![
            answer("OK", "2026-05-01T12:00:00Z"),
            Err(RpcClientError::Connection("refused".into())),
            Err(RpcClientError::Connection("refused".into())),
            answer("OK", "2026-05-01T12:01:01Z"),
        ]);
        assert_eq!(monitor.changed().await.unwrap().status, ConnectionStatus::Connected);

        let snap = monitor.changed().await.unwrap();
        assert_eq!(snap.status, ConnectionStatus::Error);
        assert_eq!(
            snap.last_checked,
            Some("2026-05-01T12:00:00Z".parse::<DateTime<Utc>>().unwrap())
        );

        let snap = monitor.changed().await.unwrap();
        assert_eq!(snap.status, ConnectionStatus::Connected);

        let times = transport.call_times();
        assert_eq!(times[1] - times[0], Duration::from_secs(30));
        assert_eq!(times[3] - times[2], Duration::from_secs(30));
    }

    #[tokio::test(start_paused = true)]
    async fn updates_stream_reaches_connected() {
        let (monitor, _t) = monitor(vec![answer("OK", "2026-05-01T12:00:00Z")]);
        let mut updates = monitor.updates();
        let mut seen = Vec::new();
        while let Some(snap) = updates.next().await {
            seen.push(snap.status);
            if snap.status != ConnectionStatus::Connecting {
                break;
            }
        }
        assert_eq!(seen.last(), Some(&ConnectionStatus::Connected));
    }

    #[tokio::test(start_paused = true)]
    async fn refresh_checks_again_without_waiting() {
        let (mut monitor, transport) = monitor(vec![
            answer("DEGRADED", "2026-05-01T12:00:00Z"),
            answer("OK", "2026-05-01T12:00:05Z"),
        ]);
        assert_eq!(monitor.changed().await.unwrap().status, ConnectionStatus::Disconnected);

        tokio::time::sleep(Duration::from_secs(5)).await;
        monitor.refresh();
        let snap = monitor.changed().await.unwrap();
        assert_eq!(snap.status, ConnectionStatus::Connected);

        let times = transport.call_times();
        assert_eq!(times.len(), 2);
        assert_eq!(times[1] - times[0], Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn stopping_disconnects_and_cancels_polling() {
        let (mut monitor, transport) = monitor(vec![answer("OK", "2026-05-01T12:00:00Z")]);
        monitor.changed().await.unwrap();
        monitor.stop();

        let snap = monitor.snapshot();
        assert_eq!(snap.status, ConnectionStatus::Disconnected);
        assert!(snap.last_checked.is_some());
        assert!(monitor.changed().await.is_none());

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(transport.call_count(), 1);
    }
}
