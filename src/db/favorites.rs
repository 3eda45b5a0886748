//! Favorites keep one row per (user, video) pair, enforced by the table's
//! unique constraint. Adding and removing flip `is_active` on that row, so
//! every write here is a single statement and repeated or concurrent
//! requests settle on the same row.

use sqlx::SqlitePool;

use super::now;
use crate::models::{Favorite, Video, VideoType};
use crate::search::{Paginated, Pagination};

pub async fn add_favorite(
    pool: &SqlitePool,
    user_id: i64,
    video_id: i64,
    video_type: VideoType,
) -> Result<Favorite, sqlx::Error> {
    let ts = now();
    sqlx::query_as::<_, Favorite>(
        "INSERT INTO favorites (user_id, video_id, favorite_type, is_active, created_at, updated_at) \
         VALUES (?, ?, ?, 1, ?, ?) \
         ON CONFLICT (user_id, video_id) DO UPDATE SET \
            is_active = 1, \
            favorite_type = excluded.favorite_type, \
            updated_at = CASE WHEN favorites.is_active = 1 THEN favorites.updated_at ELSE excluded.updated_at END \
         RETURNING *",
    )
    .bind(user_id)
    .bind(video_id)
    .bind(video_type.as_str())
    .bind(ts)
    .bind(ts)
    .fetch_one(pool)
    .await
}

/// Returns true when an active favorite was deactivated.
pub async fn remove_favorite(pool: &SqlitePool, user_id: i64, video_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE favorites SET is_active = 0, updated_at = ? WHERE user_id = ? AND video_id = ? AND is_active = 1",
    )
    .bind(now())
    .bind(user_id)
    .bind(video_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Flips the pair's state in one statement and returns the new state.
pub async fn toggle_favorite(
    pool: &SqlitePool,
    user_id: i64,
    video_id: i64,
    video_type: VideoType,
) -> Result<bool, sqlx::Error> {
    let ts = now();
    sqlx::query_scalar::<_, bool>(
        "INSERT INTO favorites (user_id, video_id, favorite_type, is_active, created_at, updated_at) \
         VALUES (?, ?, ?, 1, ?, ?) \
         ON CONFLICT (user_id, video_id) DO UPDATE SET \
            is_active = 1 - favorites.is_active, \
            favorite_type = excluded.favorite_type, \
            updated_at = excluded.updated_at \
         RETURNING is_active",
    )
    .bind(user_id)
    .bind(video_id)
    .bind(video_type.as_str())
    .bind(ts)
    .bind(ts)
    .fetch_one(pool)
    .await
}

pub async fn is_favorite(pool: &SqlitePool, user_id: i64, video_id: i64) -> Result<bool, sqlx::Error> {
    let active = sqlx::query_scalar::<_, bool>(
        "SELECT is_active FROM favorites WHERE user_id = ? AND video_id = ?",
    )
    .bind(user_id)
    .bind(video_id)
    .fetch_optional(pool)
    .await?;
    Ok(active.unwrap_or(false))
}

/// Number of rows stored for the pair, active or not.
pub async fn row_count(pool: &SqlitePool, user_id: i64, video_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM favorites WHERE user_id = ? AND video_id = ?")
        .bind(user_id)
        .bind(video_id)
        .fetch_one(pool)
        .await
}

pub async fn list_user_favorites(
    pool: &SqlitePool,
    user_id: i64,
    pagination: Pagination,
) -> Result<Paginated<Video>, sqlx::Error> {
    let total = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM favorites f JOIN videos v ON v.id = f.video_id \
         WHERE f.user_id = ? AND f.is_active = 1 AND v.is_hidden = 0",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    let items = sqlx::query_as::<_, Video>(
        "SELECT v.* FROM favorites f JOIN videos v ON v.id = f.video_id \
         WHERE f.user_id = ? AND f.is_active = 1 AND v.is_hidden = 0 \
         ORDER BY f.updated_at DESC, f.id DESC LIMIT ? OFFSET ?",
    )
    .bind(user_id)
    .bind(pagination.limit as i64)
    .bind(pagination.offset())
    .fetch_all(pool)
    .await?;

    Ok(Paginated::new(items, total, pagination))
}
