use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use skylane_api::config::ServerConfig;
use skylane_api::notifications::WsDispatcher;
use skylane_api::router::build_app_router;
use skylane_api::state::AppState;
use skylane_api::{background, ws};
use skylane_core::throttle::MemoryThrottle;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = config.port, "Configuration loaded");

    let pool = prepare_database().await;

    // WebSocket fan-out plus the ping loop that reaps dead connections.
    let ws_manager = Arc::new(ws::WsManager::new());
    let heartbeat = ws::start_heartbeat(Arc::clone(&ws_manager));
    let dispatcher = Arc::new(WsDispatcher::new(Arc::clone(&ws_manager)));

    let throttle = Arc::new(MemoryThrottle::new(Duration::from_secs(
        config.purchase_throttle_secs,
    )));

    // Departure reminder scheduler runs for the lifetime of the server.
    let scheduler_cancel = CancellationToken::new();
    let scheduler = tokio::spawn(background::reminders::run(
        pool.clone(),
        dispatcher.clone(),
        config.reminders.clone(),
        scheduler_cancel.clone(),
    ));
    tracing::info!("Reminder scheduler started");

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        ws_manager: Arc::clone(&ws_manager),
        throttle,
        dispatcher,
    };
    let app = build_app_router(state, &config);

    let addr = SocketAddr::new(
        config.host.parse().expect("HOST is not a valid IP address"),
        config.port,
    );
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("could not bind listen address");
    tracing::info!(%addr, "skylane-api listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    // Drain background work before exiting.
    tracing::info!("Draining background tasks");
    scheduler_cancel.cancel();
    let drain = Duration::from_secs(config.shutdown_timeout_secs);
    if tokio::time::timeout(drain, scheduler).await.is_err() {
        tracing::warn!("Reminder scheduler did not stop within the shutdown window");
    }

    let open = ws_manager.connection_count().await;
    if open > 0 {
        tracing::info!(open, "Closing WebSocket connections");
    }
    ws_manager.shutdown_all().await;
    heartbeat.abort();

    tracing::info!("Shutdown complete");
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skylane_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Connect, health-check and migrate. Startup aborts on any failure.
async fn prepare_database() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = skylane_db::create_pool(&url)
        .await
        .expect("database connection failed");
    skylane_db::health_check(&pool)
        .await
        .expect("database health check failed");
    skylane_db::run_migrations(&pool)
        .await
        .expect("database migration failed");
    tracing::info!("Database ready");
    pool
}

/// Resolves when the process receives SIGINT or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("could not install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("could not install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("SIGINT received, shutting down"),
        () = terminate => tracing::info!("SIGTERM received, shutting down"),
    }
}
