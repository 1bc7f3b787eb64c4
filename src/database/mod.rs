use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;

pub type DatabasePool = Arc<PgPool>;

pub async fn create_pool(database_url: &str, max_connections: u32) -> anyhow::Result<PgPool> {
    // SQLx with native-tls uses TLS when DATABASE_URL carries sslmode=require (or prefer).
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await?;

    if database_url.contains("sslmode=require") || database_url.contains("sslmode=prefer") {
        tracing::info!("Database connection configured to use TLS");
    } else if !database_url.contains("localhost") && !database_url.contains("127.0.0.1") {
        tracing::warn!(
            "Connecting to remote database without explicit sslmode. Consider adding sslmode=require"
        );
    }

    Ok(pool)
}

pub async fn new_pool(database_url: &str, max_connections: u32) -> anyhow::Result<DatabasePool> {
    let pool = create_pool(database_url, max_connections).await?;
    Ok(Arc::new(pool))
}

/// Create or upgrade the `wallet` and `operations` tables.
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}
