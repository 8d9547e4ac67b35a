use std::net::SocketAddr;

use dotenvy::dotenv;
use tokio::task::JoinHandle;
use tokio::time::{Duration, sleep};
use tracing::{error, info};

use tracker_api::application::ports::session_repository::SessionRepository;
use tracker_api::bootstrap::app_context::{AppContext, AppServices};
use tracker_api::bootstrap::config::Config;
use tracker_api::infrastructure::db::Store;
use tracker_api::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "tracker_api=debug,axum=info,tower_http=info".into()),
        )
        .init();

    let cfg = Config::from_env()?;
    info!(?cfg, "Starting tracker backend");

    // Database
    let target = cfg.store_target();
    let store = Store::connect(&target, cfg.db_max_connections).await?;
    store.migrate().await?;
    info!(runtime = ?store.runtime(), "store_ready");

    let services = AppServices::from_store(store);
    let ctx = AppContext::new(cfg.clone(), services);
    let app = build_router(ctx.clone());

    let api_addr = SocketAddr::from(([0, 0, 0, 0], cfg.api_port));
    info!(%api_addr, "HTTP API listening");
    let listener = tokio::net::TcpListener::bind(api_addr).await?;

    let api_handle: JoinHandle<anyhow::Result<()>> = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    });

    // Background purge of expired sessions
    let purge_ctx = ctx.clone();
    let purge_handle: JoinHandle<()> = tokio::spawn(async move {
        let interval = Duration::from_secs(purge_ctx.cfg.session_purge_interval_secs.max(60));
        loop {
            match purge_ctx.session_repo().purge_expired(chrono::Utc::now()).await {
                Ok(0) => {}
                Ok(n) => info!(purged = n, "expired_sessions_purged"),
                Err(e) => error!(error = ?e, "session_purge_failed"),
            }
            sleep(interval).await;
        }
    });

    match api_handle.await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => error!(?e, "API server task failed"),
        Err(e) => error!(?e, "API server task panicked"),
    }

    purge_handle.abort();
    ctx.store().close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(?e, "ctrl_c_listener_failed");
        std::future::pending::<()>().await;
    }
    info!("shutdown_requested");
}
