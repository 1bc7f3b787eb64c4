use clap::Parser;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info, warn};

use wallet_ledger_api::config::StorageBackend;
use wallet_ledger_api::database::{self, DatabasePool};
use wallet_ledger_api::storage::{LedgerStore, MemoryStore, PostgresStore};
use wallet_ledger_api::{router, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Load configuration
    let config = Config::parse();

    init_tracing(&config);
    info!("Starting Wallet Ledger API server...");

    // Select storage backend
    let mut db_pool: Option<DatabasePool> = None;
    let store: Arc<dyn LedgerStore> = match config.storage {
        StorageBackend::Postgres => {
            let pool = database::new_pool(&config.database_url, config.db_max_connections).await?;
            info!("Database connection pool created");
            database::run_migrations(&pool).await?;
            db_pool = Some(pool.clone());
            Arc::new(PostgresStore::new(pool))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage, data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let app_state = AppState::new(store, config.operation_timeout());

    let app = router(app_state)
        .layer(tower_http::cors::CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("Server error: {}", e);
    }

    info!("Shutting down gracefully...");
    if let Some(pool) = db_pool {
        if tokio::time::timeout(config.shutdown_timeout(), pool.close())
            .await
            .is_err()
        {
            warn!(
                "Database pool did not close within {:?}",
                config.shutdown_timeout()
            );
        }
    }

    Ok(())
}

fn init_tracing(config: &Config) {
    let default_filter = if config.is_prod() {
        "wallet_ledger_api=info,tower_http=info"
    } else {
        "wallet_ledger_api=debug,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    if config.is_prod() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
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

    info!("Shutdown signal received");
}
