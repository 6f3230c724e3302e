mod api;
mod middleware;
mod session;

use std::sync::Arc;

use medintel_insights::ConfiguredProvider;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_run_quota, AppState},
    middleware::ApiKeys,
    session::DashboardSlot,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = medintel_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let provider = ConfiguredProvider::from_config(&config)?;
    let keys = ApiKeys::from_env(matches!(
        config.env,
        medintel_core::Environment::Development
    ))?;

    let state = AppState {
        slot: Arc::new(DashboardSlot::new()),
        provider: Arc::new(provider),
        insight_timeout: config.insight_deadline(),
        max_upload_bytes: config.max_upload_bytes,
    };
    let app = build_app(state, keys, default_run_quota());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(
        addr = %config.bind_addr,
        env = %config.env,
        insights = config.insights_enabled(),
        "medintel server listening"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
