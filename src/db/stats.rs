use sqlx::SqlitePool;

use crate::models::AdminStats;

pub async fn admin_stats(pool: &SqlitePool) -> Result<AdminStats, sqlx::Error> {
    sqlx::query_as::<_, AdminStats>(
        "SELECT \
            (SELECT COUNT(*) FROM users) AS total_users, \
            (SELECT COUNT(*) FROM users WHERE role = 'admin') AS admin_users, \
            (SELECT COUNT(*) FROM videos) AS total_videos, \
            (SELECT COUNT(*) FROM videos WHERE video_type = 'movie') AS movies, \
            (SELECT COUNT(*) FROM videos WHERE video_type = 'series') AS series, \
            (SELECT COUNT(*) FROM videos WHERE is_hidden = 1) AS hidden_videos, \
            (SELECT COUNT(*) FROM videos WHERE is_featured = 1) AS featured_videos, \
            (SELECT COUNT(*) FROM favorites WHERE is_active = 1) AS active_favorites, \
            (SELECT COUNT(*) FROM categories) AS categories, \
            (SELECT COALESCE(SUM(views), 0) FROM videos) AS total_views",
    )
    .fetch_one(pool)
    .await
}
