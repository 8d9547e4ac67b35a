//! Polling query cache: one spawned task per query refetches on a fixed
//! interval, retries failures, and publishes its latest state on a watch
//! channel. Dropping the [`QueryHandle`] stops the task.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_stream::wrappers::WatchStream;

use crate::client::error::RpcClientError;

pub const DEFAULT_REFETCH_INTERVAL: Duration = Duration::from_secs(30);
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryPolicy {
    pub refetch_interval: Duration,
    /// Extra attempts after a failed call.
    pub retry: u32,
    pub retry_delay: Duration,
}

impl Default for QueryPolicy {
    fn default() -> Self {
        Self {
            refetch_interval: DEFAULT_REFETCH_INTERVAL,
            retry: 1,
            retry_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPhase {
    Pending,
    Success,
    Error,
}

/// Latest outcome of a query. `data` keeps the last successful value across
/// later failures; `error` only describes the latest outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryState<T> {
    pub phase: QueryPhase,
    pub data: Option<T>,
    pub error: Option<RpcClientError>,
    /// Consecutive failed attempts, retries included.
    pub failure_count: u32,
}

impl<T> QueryState<T> {
    pub fn pending() -> Self {
        Self {
            phase: QueryPhase::Pending,
            data: None,
            error: None,
            failure_count: 0,
        }
    }
}

pub struct QueryHandle<T> {
    rx: watch::Receiver<QueryState<T>>,
    refetch: Arc<Notify>,
    task: JoinHandle<()>,
}

impl<T> QueryHandle<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Starts polling immediately; the first fetch runs without delay.
    pub fn spawn<F, Fut>(name: &'static str, policy: QueryPolicy, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, RpcClientError>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(QueryState::pending());
        let refetch = Arc::new(Notify::new());
        let wake = refetch.clone();
        let task = tokio::spawn(async move {
            loop {
                let outcome = fetch_with_retry(name, &policy, &fetch).await;
                tx.send_modify(|state| apply(state, outcome));
                if tx.is_closed() {
                    break;
                }
                tokio::select! {
                    _ = sleep(policy.refetch_interval) => {}
                    _ = wake.notified() => {}
                }
            }
        });
        Self { rx, refetch, task }
    }

    pub fn state(&self) -> QueryState<T> {
        self.rx.borrow().clone()
    }

    /// Waits for the next published state.
    pub async fn changed(&mut self) -> Option<QueryState<T>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    pub fn stream(&self) -> WatchStream<QueryState<T>> {
        WatchStream::new(self.rx.clone())
    }

    /// Skips the rest of the current interval and fetches now.
    pub fn refetch(&self) {
        self.refetch.notify_one();
    }
}

impl<T> Drop for QueryHandle<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

struct Attempted<T> {
    result: Result<T, RpcClientError>,
    failures: u32,
}

async fn fetch_with_retry<T, F, Fut>(
    name: &'static str,
    policy: &QueryPolicy,
    fetch: &F,
) -> Attempted<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, RpcClientError>>,
{
    let mut failures = 0;
    loop {
        match fetch().await {
            Ok(data) => {
                return Attempted {
                    result: Ok(data),
                    failures,
                };
            }
            Err(err) => {
                failures += 1;
                if failures > policy.retry {
                    tracing::warn!(query = name, attempts = failures, error = %err, "query_failed");
                    return Attempted {
                        result: Err(err),
                        failures,
                    };
                }
                tracing::debug!(query = name, attempt = failures, error = %err, "query_retrying");
                sleep(policy.retry_delay).await;
            }
        }
    }
}

fn apply<T>(state: &mut QueryState<T>, outcome: Attempted<T>) {
    match outcome.result {
        Ok(data) => {
            state.phase = QueryPhase::Success;
            state.data = Some(data);
            state.error = None;
            state.failure_count = 0;
        }
        Err(err) => {
            state.phase = QueryPhase::Error;
            state.error = Some(err);
            state.failure_count = outcome.failures;
        }
    }
}
