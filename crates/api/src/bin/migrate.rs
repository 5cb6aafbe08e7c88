//! Apply or revert the embedded schema migrations.
//!
//! Usage: `eventhub-migrate [up|down]` (default `up`), against `DATABASE_URL` (environment or `.env`).

use anyhow::{Context, bail};

use eventhub_api::config::Config;
use eventhub_infra::db;

const DEFAULT_DATABASE_URL: &str = "sqlite://data.db";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    eventhub_observability::init(eventhub_observability::LogFormat::Pretty);

    let direction = std::env::args().nth(1).unwrap_or_else(|| "up".to_string());
    let url = Config::from_env()
        .database_url
        .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

    let pool = db::connect(&url)
        .await
        .with_context(|| format!("failed to open {url}"))?;

    match direction.as_str() {
        "up" => {
            db::migrate(&pool).await.context("migration failed")?;
            tracing::info!(database_url = %url, "migrations applied");
        }
        "down" => {
            db::revert(&pool).await.context("revert failed")?;
            tracing::info!(database_url = %url, "migrations reverted");
        }
        other => bail!("unknown direction '{other}' (expected up or down)"),
    }

    pool.close().await;
    Ok(())
}
