pub mod adapters;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod ports;
pub mod push;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod types;

use adapters::{HttpTrigger, TokioTimeProvider};
use anyhow::Context;
use ports::SubscriptionStore;
use std::sync::Arc;
use store::{FileSubscriptionStore, MemorySubscriptionStore};

pub use auth::generate_trigger_secret;
pub use push::generate_vapid_credentials;

/// Opens the subscription store, wires the delivery engine and serves the
/// HTTP surface until ctrl-c.
pub async fn serve(config: config::AppConfig) -> anyhow::Result<()> {
    let store: Arc<dyn SubscriptionStore> = match config.subscriptions_file.as_ref() {
        Some(path) => Arc::new(
            FileSubscriptionStore::open(path.clone(), TokioTimeProvider)
                .await
                .with_context(|| format!("failed to open subscription store {}", path.display()))?,
        ),
        None => {
            tracing::warn!("no subscriptions file configured; subscriptions are kept in memory");
            Arc::new(MemorySubscriptionStore::new(TokioTimeProvider))
        }
    };

    let engine = push::build_engine(&config, Arc::clone(&store));
    if let Some(engine) = engine.as_ref() {
        let limits = engine.limits();
        tracing::info!(
            concurrency = limits.concurrency,
            send_timeout_secs = limits.send_timeout.as_secs(),
            "push delivery enabled"
        );
    }
    let listen = config.listen;
    let state = state::AppState::new(config, store, engine).context("invalid trigger secret")?;
    if state.trigger_auth.is_none() {
        tracing::warn!("no trigger secret configured; /push/send accepts any caller");
    }

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("failed to bind {listen}"))?;
    tracing::info!(%listen, "listening");

    axum::serve(listener, app::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;
    Ok(())
}

/// Fires a delivery round against a running server every interval until
/// ctrl-c or until the round limit is reached.
pub async fn schedule(config: config::ScheduleConfig) -> anyhow::Result<()> {
    let trigger = HttpTrigger::new(&config.target, config.trigger_secret, config.request_timeout)?;
    tracing::info!(
        url = trigger.url(),
        interval_secs = config.interval.as_secs(),
        "scheduling delivery rounds"
    );
    let scheduler = push::TriggerScheduler::new(TokioTimeProvider, trigger, config.interval)
        .with_max_rounds(config.max_rounds);

    tokio::select! {
        fired = scheduler.run(&config.payload) => {
            tracing::info!(rounds = fired, "scheduler finished");
        }
        _ = shutdown_signal() => {}
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
