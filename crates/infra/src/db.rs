//! SQLite connection pool and embedded migrations.

use std::str::FromStr;

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

/// Reversible schema migrations for `users`, `events` and `attendees`.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Open a pool for `url` (e.g. `sqlite://data.db`, `sqlite::memory:`).
///
/// Foreign keys are enforced on every connection. In-memory databases live
/// inside a single connection, so their pool is pinned to exactly one.
pub async fn connect(url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = if is_in_memory(url) {
        SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(5)
    };

    let pool = pool.connect_with(options).await?;
    tracing::info!(url = %redact(url), "connected to database");
    Ok(pool)
}

/// Apply all pending migrations.
pub async fn migrate(pool: &SqlitePool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await?;
    tracing::info!("database migrations applied");
    Ok(())
}

/// Revert every applied migration (drops all tables).
pub async fn revert(pool: &SqlitePool) -> Result<(), MigrateError> {
    MIGRATOR.undo(pool, 0).await?;
    tracing::info!("database migrations reverted");
    Ok(())
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

// Strip query parameters (may carry credentials for other drivers).
fn redact(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::Row;

    #[tokio::test]
    async fn migrate_then_revert_round_trip() {
        let pool = connect("sqlite::memory:").await.unwrap();
        migrate(&pool).await.unwrap();

        let tables: Vec<String> = sqlx::query(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'events', 'attendees') ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap()
        .into_iter()
        .map(|row| row.get::<String, _>("name"))
        .collect();
        assert_eq!(tables, vec!["attendees", "events", "users"]);

        revert(&pool).await.unwrap();
        let remaining: i64 = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('users', 'events', 'attendees')",
        )
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn foreign_keys_are_enforced() {
        let pool = connect("sqlite::memory:").await.unwrap();
        let enabled: i64 = sqlx::query_scalar::<_, i64>("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn detects_in_memory_urls() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://file:db?mode=memory&cache=shared"));
        assert!(!is_in_memory("sqlite://data.db"));
    }
}
