//! Database connection pool using the OnceCell pattern.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::OnceCell;

use crate::settings::get_settings;

static POOL: OnceCell<PgPool> = OnceCell::const_new();

/// Get or initialize the database connection pool from the `database` settings.
pub async fn get_pool() -> Result<&'static PgPool, sqlx::Error> {
    POOL.get_or_try_init(|| async {
        let settings = get_settings().await;
        tracing::info!("Connecting to database (pool size {})", settings.database.pool);

        PgPoolOptions::new()
            .max_connections(settings.database.pool)
            .connect(&settings.database.url)
            .await
    })
    .await
}

/// Apply the embedded migrations under `packages/api/migrations`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
