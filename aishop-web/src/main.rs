//! # AI Shopping Web Server
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/aishop SECRET_KEY=... cargo run -p aishop-web
//! ```

use aishop_shared::{
    db::{
        migrations::{ensure_database_exists, run_migrations},
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    store::PgUserStore,
};
use aishop_web::{
    app::{
        build_router, spawn_expired_session_cleanup, AppState, EXPIRED_SESSION_CLEANUP_INTERVAL,
    },
    config::Config,
};
use std::sync::Arc;
use tower_sessions_sqlx_store::PostgresStore;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aishop_web=debug,aishop_shared=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "AI Shopping web server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;
    if config.debug {
        tracing::warn!("DEBUG is enabled: session cookies are sent without the Secure flag");
    }

    ensure_database_exists(&config.database.url).await?;
    let pool = create_pool(DatabaseConfig::from_url(
        config.database.url.clone(),
        config.database.max_connections,
    ))
    .await?;
    run_migrations(&pool).await?;

    let session_store = PostgresStore::new(pool.clone());
    session_store.migrate().await?;
    let cleanup_task =
        spawn_expired_session_cleanup(session_store.clone(), EXPIRED_SESSION_CLEANUP_INTERVAL);

    let state = AppState::new(Arc::new(PgUserStore::new(pool.clone())), config);
    let bind_address = state.config.bind_address();
    let app = build_router(state, session_store);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cleanup_task.abort();
    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

/// Resolves on Ctrl-C or, on Unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections...");
}
