use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use collabbridge_api::config::ServerConfig;
use collabbridge_api::error::set_expose_error_details;
use collabbridge_api::middleware::rate_limit;
use collabbridge_api::notifications::NotificationRouter;
use collabbridge_api::router::build_app_router;
use collabbridge_api::state::AppState;
use collabbridge_api::ws;
use collabbridge_events::{EmailConfig, EmailDelivery, OutboxProcessor, ReminderScheduler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    init_tracing();

    // --- Configuration ---
    let config = ServerConfig::from_env().context("Invalid server configuration")?;
    set_expose_error_details(!config.is_production());
    tracing::info!(
        host = %config.host,
        port = config.port,
        environment = config.environment.as_str(),
        "Loaded server configuration"
    );
    match &config.redis_url {
        Some(_) => tracing::info!("REDIS_URL is set; response caching is disabled"),
        None => tracing::info!("Response caching is disabled"),
    }
    if config.cloudinary.is_none() {
        tracing::warn!("Cloudinary is not configured; uploads will be rejected");
    }

    // --- Database ---
    let pool = collabbridge_db::connect_with_retry(&config.database_url, config.db_retry)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connection pool created");

    collabbridge_db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations applied");

    // --- App state ---
    let shutdown_timeout = Duration::from_secs(config.shutdown_timeout_secs);
    let addr = SocketAddr::new(
        config.host.parse().context("Invalid HOST address")?,
        config.port,
    );
    let state = AppState::new(pool.clone(), config);
    let app = build_app_router(state.clone(), &state.config);

    // --- Background services ---
    let cancel = CancellationToken::new();

    let heartbeat_handle = ws::start_heartbeat(Arc::clone(&state.ws_manager));
    let pruning_handle =
        rate_limit::start_pruning(Arc::clone(&state.rate_limiter), cancel.clone());

    let notification_router = NotificationRouter::new(pool.clone(), Arc::clone(&state.ws_manager));
    let router_handle = tokio::spawn(notification_router.run(state.event_bus.subscribe()));

    let email = match EmailConfig::from_env() {
        Some(email_config) => match EmailDelivery::new(email_config) {
            Ok(delivery) => Some(delivery),
            Err(e) => {
                tracing::error!(error = %e, "Invalid SMTP configuration; email disabled");
                None
            }
        },
        None => {
            tracing::info!("SMTP is not configured; email disabled");
            None
        }
    };
    let outbox = OutboxProcessor::new(pool.clone(), email);
    let outbox_cancel = cancel.clone();
    let outbox_handle = tokio::spawn(async move { outbox.run(outbox_cancel).await });

    let reminders = ReminderScheduler::new(pool.clone(), Arc::clone(&state.event_bus));
    let reminders_cancel = cancel.clone();
    let reminders_handle = tokio::spawn(async move { reminders.run(reminders_cancel).await });

    tracing::info!("Background services started (notification router, outbox, reminders)");

    // --- Start server ---
    tracing::info!(%addr, "Starting server");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    cancel.cancel();
    let _ = tokio::time::timeout(shutdown_timeout, outbox_handle).await;
    let _ = tokio::time::timeout(shutdown_timeout, reminders_handle).await;
    let _ = tokio::time::timeout(shutdown_timeout, pruning_handle).await;
    tracing::info!("Outbox, reminders and rate-limit pruning stopped");

    let ws_manager = Arc::clone(&state.ws_manager);
    let ws_count = ws_manager.connection_count().await;
    tracing::info!(ws_count, "Closing remaining WebSocket connections");
    ws_manager.shutdown_all().await;
    heartbeat_handle.abort();

    // Dropping the last bus handle closes the channel and ends the router.
    drop(state);
    let _ = tokio::time::timeout(shutdown_timeout, router_handle).await;
    tracing::info!("Notification router stopped");

    pool.close().await;

    tracing::info!("Graceful shutdown complete");
    Ok(())
}

/// Human-readable logs by default, JSON lines when `LOG_FORMAT=json`.
fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "collabbridge_api=debug,collabbridge_events=debug,tower_http=debug".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Wait for SIGINT or SIGTERM to initiate graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
