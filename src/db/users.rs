use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use super::now;
use crate::models::{Role, User};
use crate::search::{escape_like_literal, Paginated, Pagination};

pub async fn get_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn get_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await
}

pub async fn create_user(
    pool: &SqlitePool,
    email: &str,
    password_hash: &str,
    first_name: &str,
    last_name: &str,
    role: Role,
) -> Result<User, sqlx::Error> {
    let ts = now();
    sqlx::query_as::<_, User>(
        "INSERT INTO users (email, password, first_name, last_name, role, is_active, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, 1, ?, ?) RETURNING *",
    )
    .bind(normalize_email(email))
    .bind(password_hash)
    .bind(first_name.trim())
    .bind(last_name.trim())
    .bind(role.as_str())
    .bind(ts)
    .bind(ts)
    .fetch_one(pool)
    .await
}

pub async fn record_login(pool: &SqlitePool, id: i64) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>("UPDATE users SET last_login_at = ? WHERE id = ? RETURNING *")
        .bind(now())
        .bind(id)
        .fetch_one(pool)
        .await
}

pub async fn update_profile(
    pool: &SqlitePool,
    id: i64,
    first_name: Option<&str>,
    last_name: Option<&str>,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "UPDATE users SET first_name = COALESCE(?, first_name), last_name = COALESCE(?, last_name), updated_at = ? \
         WHERE id = ? RETURNING *",
    )
    .bind(first_name.map(str::trim))
    .bind(last_name.map(str::trim))
    .bind(now())
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn update_password(pool: &SqlitePool, id: i64, password_hash: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET password = ?, updated_at = ? WHERE id = ?")
        .bind(password_hash)
        .bind(now())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_role(pool: &SqlitePool, id: i64, role: Role) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("UPDATE users SET role = ?, updated_at = ? WHERE id = ? RETURNING *")
        .bind(role.as_str())
        .bind(now())
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn set_active(pool: &SqlitePool, id: i64, is_active: bool) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("UPDATE users SET is_active = ?, updated_at = ? WHERE id = ? RETURNING *")
        .bind(is_active)
        .bind(now())
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Returns false when no such user existed.
pub async fn delete_user(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_users(
    pool: &SqlitePool,
    search: Option<&str>,
    role: Option<Role>,
    pagination: Pagination,
) -> Result<Paginated<User>, sqlx::Error> {
    fn push_conditions<'a>(qb: &mut QueryBuilder<'a, Sqlite>, search: Option<&str>, role: Option<Role>) {
        qb.push(" WHERE 1=1");
        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", escape_like_literal(term));
            qb.push(" AND (email LIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" ESCAPE '\\' OR first_name LIKE ");
            qb.push_bind(pattern.clone());
            qb.push(" ESCAPE '\\' OR last_name LIKE ");
            qb.push_bind(pattern);
            qb.push(" ESCAPE '\\')");
        }
        if let Some(role) = role {
            qb.push(" AND role = ");
            qb.push_bind(role.as_str());
        }
    }

    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM users");
    push_conditions(&mut count, search, role);
    let total = count.build_query_scalar::<i64>().fetch_one(pool).await?;

    let mut qb = QueryBuilder::<Sqlite>::new("SELECT * FROM users");
    push_conditions(&mut qb, search, role);
    qb.push(" ORDER BY created_at DESC, id DESC LIMIT ");
    qb.push_bind(pagination.limit as i64);
    qb.push(" OFFSET ");
    qb.push_bind(pagination.offset());
    let items = qb.build_query_as::<User>().fetch_all(pool).await?;

    Ok(Paginated::new(items, total, pagination))
}

/// Creates the account as an admin, or promotes and reactivates it when it
/// already exists. The stored password is only set on creation.
pub async fn ensure_admin(pool: &SqlitePool, email: &str, password_hash: &str) -> Result<User, sqlx::Error> {
    match get_user_by_email(pool, email).await? {
        Some(existing) => {
            sqlx::query_as::<_, User>(
                "UPDATE users SET role = 'admin', is_active = 1, updated_at = ? WHERE id = ? RETURNING *",
            )
            .bind(now())
            .bind(existing.id)
            .fetch_one(pool)
            .await
        }
        None => create_user(pool, email, password_hash, "Admin", "", Role::Admin).await,
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
