//! # Database Persistence Layer
//!
//! Postgres persistence for complaint records via SQLx.
//!
//! The database is optional. With `DATABASE_URL` set, records go to
//! Postgres through [`complaints::PgComplaintStore`]; without it the API
//! runs on the in-memory store and nothing survives a restart.

pub mod complaints;

use sqlx::postgres::{PgPool, PgPoolOptions};

/// Connect and run embedded migrations.
///
/// Returns `None` when no URL is configured (in-memory mode).
pub async fn init_pool(database_url: Option<&str>) -> Result<Option<PgPool>, sqlx::Error> {
    let Some(url) = database_url else {
        tracing::warn!(
            "DATABASE_URL not set; running in-memory only. \
             Complaints will not survive restarts."
        );
        return Ok(None);
    };

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .min_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(5))
        .connect(url)
        .await?;

    tracing::info!("Connected to PostgreSQL");

    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Database migrations applied");

    Ok(Some(pool))
}
