use sqlx::SqlitePool;

use super::now;
use crate::models::{Category, CategoryInput};

pub async fn list_categories(pool: &SqlitePool, include_inactive: bool) -> Result<Vec<Category>, sqlx::Error> {
    let sql = if include_inactive {
        "SELECT * FROM categories ORDER BY name COLLATE NOCASE ASC, id ASC"
    } else {
        "SELECT * FROM categories WHERE is_active = 1 ORDER BY name COLLATE NOCASE ASC, id ASC"
    };
    sqlx::query_as::<_, Category>(sql).fetch_all(pool).await
}

pub async fn get_category_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE slug = ? AND is_active = 1")
        .bind(slug)
        .fetch_optional(pool)
        .await
}

pub async fn create_category(pool: &SqlitePool, name: &str, slug: &str, input: &CategoryInput) -> Result<Category, sqlx::Error> {
    let ts = now();
    sqlx::query_as::<_, Category>(
        "INSERT INTO categories (name, name_kurdish, slug, description, icon, color, is_active, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(name)
    .bind(input.name_kurdish.as_deref())
    .bind(slug)
    .bind(input.description.as_deref())
    .bind(input.icon.as_deref())
    .bind(input.color.as_deref())
    .bind(input.is_active.unwrap_or(true))
    .bind(ts)
    .bind(ts)
    .fetch_one(pool)
    .await
}

pub async fn update_category(
    pool: &SqlitePool,
    id: i64,
    slug: Option<&str>,
    input: &CategoryInput,
) -> Result<Option<Category>, sqlx::Error> {
    sqlx::query_as::<_, Category>(
        "UPDATE categories SET \
            name = COALESCE(?, name), \
            name_kurdish = COALESCE(?, name_kurdish), \
            slug = COALESCE(?, slug), \
            description = COALESCE(?, description), \
            icon = COALESCE(?, icon), \
            color = COALESCE(?, color), \
            is_active = COALESCE(?, is_active), \
            updated_at = ? \
         WHERE id = ? RETURNING *",
    )
    .bind(input.name.as_deref().map(str::trim))
    .bind(input.name_kurdish.as_deref())
    .bind(slug)
    .bind(input.description.as_deref())
    .bind(input.icon.as_deref())
    .bind(input.color.as_deref())
    .bind(input.is_active)
    .bind(now())
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn delete_category(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Lowercase ASCII slug; runs of anything else collapse to a single dash.
/// Falls back to `None` when nothing usable is left (e.g. a name written
/// entirely in non-Latin script), so callers can ask for an explicit slug.
pub fn slugify(name: &str) -> Option<String> {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        let ch = match ch {
            'ç' | 'Ç' => 'c',
            'ê' | 'Ê' => 'e',
            'î' | 'Î' => 'i',
            'û' | 'Û' => 'u',
            'ş' | 'Ş' => 's',
            other => other,
        };
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }
    (!slug.is_empty()).then_some(slug)
}
