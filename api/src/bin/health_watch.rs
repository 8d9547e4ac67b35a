//! Polls a running server's `healthCheck` procedure and logs every change of
//! connection status. `SERVER_URL` selects the server (default
//! `http://localhost:3000`); `SESSION_TOKEN` additionally verifies the session
//! once through `privateData`. On Unix, `SIGHUP` forces an immediate check.

use std::sync::Arc;

use dotenvy::dotenv;
use futures_util::StreamExt;
use tracing::{info, warn};

use tracker_api::client::{
    ConnectionStatus, HealthMonitor, HealthSnapshot, HttpTransport, RpcClient,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "tracker_api=info,health_watch=info".into()),
        )
        .init();

    let server_url =
        std::env::var("SERVER_URL").unwrap_or_else(|_| "http://localhost:3000".into());
    let mut transport = HttpTransport::new(&server_url)?;
    if let Ok(token) = std::env::var("SESSION_TOKEN") {
        transport = transport.with_session_token(token);
    }
    let client = RpcClient::new(Arc::new(transport));

    match client.private_data().await {
        Ok(out) => info!(user = %out.user.email, "session_valid"),
        Err(e) if e.is_unauthorized() => warn!("no valid session; only health is monitored"),
        Err(e) => warn!(error = %e, "private_data_failed"),
    }

    let mut monitor = HealthMonitor::start(client);
    info!(%server_url, status = %monitor.status(), "health_watch_started");

    let mut updates = monitor.updates();
    let mut last_status = ConnectionStatus::Connecting;
    let mut recheck = RecheckSignal::new()?;
    let mut ctrl_c = std::pin::pin!(tokio::signal::ctrl_c());
    loop {
        tokio::select! {
            snap = updates.next() => {
                let Some(snap) = snap else { break };
                if snap.status != last_status {
                    log_change(&snap);
                    last_status = snap.status;
                }
            }
            _ = recheck.recv() => {
                info!("recheck_requested");
                monitor.refresh();
            }
            _ = &mut ctrl_c => break,
        }
    }

    monitor.stop();
    log_change(&monitor.snapshot());
    Ok(())
}

fn log_change(snap: &HealthSnapshot) {
    match snap.status {
        ConnectionStatus::Error => {
            warn!(status = %snap.status, error = ?snap.error, last_checked = ?snap.last_checked, "status_changed")
        }
        _ => info!(status = %snap.status, last_checked = ?snap.last_checked, "status_changed"),
    }
}

/// `SIGHUP` listener; pends forever where the signal does not exist.
struct RecheckSignal(#[cfg(unix)] tokio::signal::unix::Signal);

impl RecheckSignal {
    #[cfg(unix)]
    fn new() -> anyhow::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};
        Ok(Self(signal(SignalKind::hangup())?))
    }

    #[cfg(not(unix))]
    fn new() -> anyhow::Result<Self> {
        Ok(Self())
    }

    async fn recv(&mut self) {
        #[cfg(unix)]
        if self.0.recv().await.is_some() {
            return;
        }
        std::future::pending::<()>().await
    }
}
