//! Database access for the bookstore service.
//!
//! Builds the SQLite connection pool from [`DatabaseSettings`] and applies
//! module-contributed migrations, recording each one in `_migrations`.

use std::str::FromStr;
use std::time::Duration;

use bookstore_kernel::settings::DatabaseSettings;
use bookstore_kernel::Migration;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use thiserror::Error;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("invalid database url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("database connection error: {0}")]
    Connection(#[from] sqlx::Error),

    #[error("migration {module}/{id} failed: {source}")]
    Migration {
        module: String,
        id: String,
        #[source]
        source: sqlx::Error,
    },
}

const MIGRATIONS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS _migrations (
    module     TEXT NOT NULL,
    id         TEXT NOT NULL,
    applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    PRIMARY KEY (module, id)
)
"#;

/// Open a connection pool.
///
/// In-memory databases live only as long as their connection, so they get a
/// single connection that is never recycled.
pub async fn connect(settings: &DatabaseSettings) -> DbResult<SqlitePool> {
    tracing::info!(target: "bookstore-db", url = %settings.url, "connecting to database");

    let options = SqliteConnectOptions::from_str(&settings.url)
        .map_err(|source| DbError::InvalidUrl {
            url: settings.url.clone(),
            source,
        })?
        .create_if_missing(true)
        .foreign_keys(true);

    let mut pool_options = SqlitePoolOptions::new()
        .acquire_timeout(Duration::from_millis(settings.acquire_timeout_ms));

    pool_options = if settings.is_in_memory() {
        pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        pool_options.max_connections(settings.max_connections)
    };

    let pool = pool_options.connect_with(options).await?;

    tracing::info!(target: "bookstore-db", "connected to database");
    Ok(pool)
}

/// Apply pending migrations in the given order. Already applied migrations
/// are skipped, so this is safe to run on every start.
///
/// Returns the number of migrations applied.
pub async fn run_migrations(
    pool: &SqlitePool,
    migrations: &[(String, Migration)],
) -> DbResult<usize> {
    tracing::info!(target: "bookstore-db", "running database migrations");

    sqlx::raw_sql(MIGRATIONS_TABLE).execute(pool).await?;

    let mut applied = 0;
    for (module, migration) in migrations {
        if is_applied(pool, module, migration.id).await? {
            tracing::debug!(
                target: "bookstore-db",
                %module,
                id = migration.id,
                "migration already applied"
            );
            continue;
        }

        tracing::info!(target: "bookstore-db", %module, id = migration.id, "applying migration");
        apply(pool, module, migration)
            .await
            .map_err(|source| DbError::Migration {
                module: module.clone(),
                id: migration.id.to_string(),
                source,
            })?;
        applied += 1;
    }

    tracing::info!(target: "bookstore-db", applied, "migrations complete");
    Ok(applied)
}

async fn is_applied(pool: &SqlitePool, module: &str, id: &str) -> DbResult<bool> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT id FROM _migrations WHERE module = ? AND id = ?")
            .bind(module)
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(row.is_some())
}

async fn apply(pool: &SqlitePool, module: &str, migration: &Migration) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::raw_sql(migration.up).execute(&mut *tx).await?;
    sqlx::query("INSERT INTO _migrations (module, id) VALUES (?, ?)")
        .bind(module)
        .bind(migration.id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await
}

/// Cheap liveness probe.
pub async fn ping(pool: &SqlitePool) -> DbResult<()> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
