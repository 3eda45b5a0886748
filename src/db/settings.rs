use sqlx::SqlitePool;

use super::now;
use crate::models::{SettingsUpdate, SystemSettings};

const SELECT_SETTINGS: &str = "SELECT site_name, site_description, contact_email, default_language, \
    maintenance_mode, registration_enabled, max_upload_size_mb, updated_at FROM system_settings WHERE id = 1";

/// The settings row is seeded by the initial migration; it is re-created
/// here if someone removed it by hand.
pub async fn get_settings(pool: &SqlitePool) -> Result<SystemSettings, sqlx::Error> {
    sqlx::query("INSERT OR IGNORE INTO system_settings (id) VALUES (1)")
        .execute(pool)
        .await?;
    sqlx::query_as::<_, SystemSettings>(SELECT_SETTINGS)
        .fetch_one(pool)
        .await
}

pub async fn update_settings(pool: &SqlitePool, update: &SettingsUpdate) -> Result<SystemSettings, sqlx::Error> {
    sqlx::query("INSERT OR IGNORE INTO system_settings (id) VALUES (1)")
        .execute(pool)
        .await?;
    sqlx::query(
        "UPDATE system_settings SET \
            site_name = COALESCE(?, site_name), \
            site_description = COALESCE(?, site_description), \
            contact_email = COALESCE(?, contact_email), \
            default_language = COALESCE(?, default_language), \
            maintenance_mode = COALESCE(?, maintenance_mode), \
            registration_enabled = COALESCE(?, registration_enabled), \
            max_upload_size_mb = COALESCE(?, max_upload_size_mb), \
            updated_at = ? \
         WHERE id = 1",
    )
    .bind(update.site_name.as_deref().map(str::trim))
    .bind(update.site_description.as_deref())
    .bind(update.contact_email.as_deref())
    .bind(update.default_language.as_deref())
    .bind(update.maintenance_mode)
    .bind(update.registration_enabled)
    .bind(update.max_upload_size_mb)
    .bind(now())
    .execute(pool)
    .await?;
    get_settings(pool).await
}

/// Drops the row and re-seeds it with the column defaults.
pub async fn reset_settings(pool: &SqlitePool) -> Result<SystemSettings, sqlx::Error> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM system_settings").execute(&mut *tx).await?;
    sqlx::query("INSERT INTO system_settings (id) VALUES (1)")
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    get_settings(pool).await
}
