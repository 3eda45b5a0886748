use std::str::FromStr;

use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::auth::hash_password;
use crate::config::Config;
use crate::db;
use crate::error::ApiResult;

pub async fn init_db_pool(config: &Config) -> ApiResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;
    info!("Connected to database {}", config.database_url);
    Ok(pool)
}

/// A private in-memory database. Pinned to one connection that never
/// expires, since each SQLite memory connection is its own database.
pub async fn init_test_pool() -> ApiResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> ApiResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Creates or promotes the configured admin account.
pub async fn bootstrap_admin(pool: &SqlitePool, config: &Config) -> ApiResult<()> {
    let (Some(email), Some(password)) = (&config.admin_email, &config.admin_password) else {
        return Ok(());
    };

    let hash = hash_password(password, config.bcrypt_cost)?;
    let admin = db::users::ensure_admin(pool, email, &hash).await?;
    info!("Admin account ready: {} (id {})", admin.email, admin.id);
    Ok(())
}
