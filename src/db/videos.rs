use sqlx::types::Json;
use sqlx::SqlitePool;

use super::now;
use crate::models::{Video, VideoFlagsRequest, VideoInput, VideoType};

pub async fn get_video(pool: &SqlitePool, id: i64) -> Result<Option<Video>, sqlx::Error> {
    sqlx::query_as::<_, Video>("SELECT * FROM videos WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Bumps the view counter and returns the updated row. Hidden videos are
/// still reachable by id.
pub async fn record_view(pool: &SqlitePool, id: i64) -> Result<Option<Video>, sqlx::Error> {
    sqlx::query_as::<_, Video>("UPDATE videos SET views = views + 1 WHERE id = ? RETURNING *")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// All videos visible to the public, newest first.
pub async fn list_visible(pool: &SqlitePool) -> Result<Vec<Video>, sqlx::Error> {
    sqlx::query_as::<_, Video>("SELECT * FROM videos WHERE is_hidden = 0 ORDER BY created_at DESC, id DESC")
        .fetch_all(pool)
        .await
}

pub async fn create_video(pool: &SqlitePool, input: &VideoInput, video_type: VideoType) -> Result<Video, sqlx::Error> {
    let ts = now();
    let genres = clean_genres(input.genre.as_deref().unwrap_or_default());
    sqlx::query_as::<_, Video>(
        "INSERT INTO videos (title, description, genre, genre_keys, year, duration, rating, thumbnail_url, poster_url, \
         video_url, trailer_url, is_featured, is_new, is_hidden, video_type, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(input.title.as_deref().map(str::trim).unwrap_or_default())
    .bind(input.description.as_deref())
    .bind(Json(genres.clone()))
    .bind(Json(genre_keys(&genres)))
    .bind(input.year)
    .bind(input.duration.unwrap_or(0))
    .bind(input.rating.unwrap_or(0.0))
    .bind(input.thumbnail_url.as_deref())
    .bind(input.poster_url.as_deref())
    .bind(input.video_url.as_deref())
    .bind(input.trailer_url.as_deref())
    .bind(input.is_featured.unwrap_or(false))
    .bind(input.is_new.unwrap_or(true))
    .bind(input.is_hidden.unwrap_or(false))
    .bind(video_type.as_str())
    .bind(ts)
    .bind(ts)
    .fetch_one(pool)
    .await
}

/// Applies the fields present in `input`; absent fields keep their value.
pub async fn update_video(pool: &SqlitePool, id: i64, input: &VideoInput) -> Result<Option<Video>, sqlx::Error> {
    let video_type = input
        .video_type
        .as_deref()
        .and_then(|t| t.parse::<VideoType>().ok())
        .map(|t| t.as_str());
    let genres = input.genre.as_deref().map(clean_genres);

    sqlx::query_as::<_, Video>(
        "UPDATE videos SET \
            title = COALESCE(?, title), \
            description = COALESCE(?, description), \
            genre = COALESCE(?, genre), \
            genre_keys = COALESCE(?, genre_keys), \
            year = COALESCE(?, year), \
            duration = COALESCE(?, duration), \
            rating = COALESCE(?, rating), \
            thumbnail_url = COALESCE(?, thumbnail_url), \
            poster_url = COALESCE(?, poster_url), \
            video_url = COALESCE(?, video_url), \
            trailer_url = COALESCE(?, trailer_url), \
            is_featured = COALESCE(?, is_featured), \
            is_new = COALESCE(?, is_new), \
            is_hidden = COALESCE(?, is_hidden), \
            video_type = COALESCE(?, video_type), \
            updated_at = ? \
         WHERE id = ? RETURNING *",
    )
    .bind(input.title.as_deref().map(str::trim))
    .bind(input.description.as_deref())
    .bind(genres.as_ref().map(|g| Json(g.clone())))
    .bind(genres.as_deref().map(|g| Json(genre_keys(g))))
    .bind(input.year)
    .bind(input.duration)
    .bind(input.rating)
    .bind(input.thumbnail_url.as_deref())
    .bind(input.poster_url.as_deref())
    .bind(input.video_url.as_deref())
    .bind(input.trailer_url.as_deref())
    .bind(input.is_featured)
    .bind(input.is_new)
    .bind(input.is_hidden)
    .bind(video_type)
    .bind(now())
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn set_flags(pool: &SqlitePool, id: i64, flags: &VideoFlagsRequest) -> Result<Option<Video>, sqlx::Error> {
    sqlx::query_as::<_, Video>(
        "UPDATE videos SET is_featured = COALESCE(?, is_featured), is_new = COALESCE(?, is_new), \
         is_hidden = COALESCE(?, is_hidden), updated_at = ? WHERE id = ? RETURNING *",
    )
    .bind(flags.is_featured)
    .bind(flags.is_new)
    .bind(flags.is_hidden)
    .bind(now())
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Hard delete. Favorites pointing at the video go with it.
pub async fn delete_video(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM videos WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Trims, drops blanks and removes case-insensitive duplicates, keeping the
/// first spelling seen.
fn clean_genres(genres: &[String]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(genres.len());
    let mut out: Vec<String> = Vec::with_capacity(genres.len());
    for genre in genres.iter().map(|g| g.trim()).filter(|g| !g.is_empty()) {
        let key = genre.to_lowercase();
        if !seen.contains(&key) {
            seen.push(key);
            out.push(genre.to_string());
        }
    }
    out
}

/// Lowercased genre names used for filtering. SQLite's LOWER() only folds
/// ASCII, so keys are folded here instead.
pub(crate) fn genre_keys(genres: &[String]) -> Vec<String> {
    genres.iter().map(|g| g.to_lowercase()).collect()
}
