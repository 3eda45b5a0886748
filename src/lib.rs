pub mod auth;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod search;
pub mod services;

use sqlx::SqlitePool;

use crate::config::Config;

pub struct AppState {
    pub db_pool: SqlitePool,
    pub config: Config,
}
