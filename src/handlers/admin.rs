use actix_web::{delete, get, post, put, web, HttpResponse};
use log::info;
use serde::Deserialize;
use serde_json::json;

use crate::auth::AdminUser;
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::models::{PublicSettings, Role, RoleChangeRequest, SettingsUpdate, StatusChangeRequest};
use crate::search::Pagination;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UserListParams {
    pub q: Option<String>,
    pub role: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

fn user_not_found() -> ApiError {
    ApiError::NotFound("User not found".to_string())
}

#[get("/api/admin/users")]
async fn list_users(
    _admin: AdminUser,
    params: web::Query<UserListParams>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    // An empty role filter means all roles
    let role = params
        .role
        .as_deref()
        .filter(|r| !r.trim().is_empty())
        .map(|r| r.parse::<Role>().map_err(ApiError::BadRequest))
        .transpose()?;
    let pagination = Pagination::from_params(
        params.page,
        params.limit,
        state.config.default_page_size,
        state.config.max_page_size,
    );

    let page = db::users::list_users(&state.db_pool, params.q.as_deref(), role, pagination).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/api/admin/users/{id}")]
async fn get_user(
    _admin: AdminUser,
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let user = db::users::get_user_by_id(&state.db_pool, path.into_inner())
        .await?
        .ok_or_else(user_not_found)?;
    Ok(HttpResponse::Ok().json(user))
}

#[put("/api/admin/users/{id}/role")]
async fn change_role(
    admin: AdminUser,
    path: web::Path<i64>,
    req: web::Json<RoleChangeRequest>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let user_id = path.into_inner();
    // Reject unknown role names before looking at the target
    let role: Role = req.role.parse().map_err(ApiError::Validation)?;
    // Admins cannot lock themselves out
    if user_id == admin.0.id {
        return Err(ApiError::BadRequest("Admins cannot change their own role".to_string()));
    }

    // A missing user is a 404, never a silent no-op
    let user = db::users::set_role(&state.db_pool, user_id, role)
        .await?
        .ok_or_else(user_not_found)?;
    info!("Admin {} set role of user {} to {}", admin.0.id, user.id, role);

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "user": user
    })))
}

#[put("/api/admin/users/{id}/status")]
async fn change_status(
    admin: AdminUser,
    path: web::Path<i64>,
    req: web::Json<StatusChangeRequest>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let user_id = path.into_inner();
    if user_id == admin.0.id && !req.is_active {
        return Err(ApiError::BadRequest("Admins cannot deactivate themselves".to_string()));
    }

    let user = db::users::set_active(&state.db_pool, user_id, req.is_active)
        .await?
        .ok_or_else(user_not_found)?;
    info!("Admin {} set user {} active={}", admin.0.id, user.id, user.is_active);

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "user": user
    })))
}

#[delete("/api/admin/users/{id}")]
async fn delete_user(
    admin: AdminUser,
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let user_id = path.into_inner();
    if user_id == admin.0.id {
        return Err(ApiError::BadRequest("Admins cannot delete themselves".to_string()));
    }
    // Favorites go with the user
    if !db::users::delete_user(&state.db_pool, user_id).await? {
        return Err(user_not_found());
    }
    info!("Admin {} deleted user {}", admin.0.id, user_id);

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "User deleted"
    })))
}

#[get("/api/admin/stats")]
async fn stats(_admin: AdminUser, state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let stats = db::stats::admin_stats(&state.db_pool).await?;
    Ok(HttpResponse::Ok().json(stats))
}

fn validate_settings(update: &SettingsUpdate) -> ApiResult<()> {
    if update.site_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(ApiError::Validation("Site name cannot be empty".to_string()));
    }
    if update.max_upload_size_mb.is_some_and(|mb| mb <= 0) {
        return Err(ApiError::Validation("Upload size must be positive".to_string()));
    }
    if let Some(email) = update.contact_email.as_deref() {
        if !email.contains('@') {
            return Err(ApiError::Validation("Contact email is invalid".to_string()));
        }
    }
    Ok(())
}

#[get("/api/admin/settings")]
async fn get_settings(_admin: AdminUser, state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let settings = db::settings::get_settings(&state.db_pool).await?;
    Ok(HttpResponse::Ok().json(settings))
}

#[put("/api/admin/settings")]
async fn update_settings(
    admin: AdminUser,
    req: web::Json<SettingsUpdate>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    validate_settings(&req)?;
    let settings = db::settings::update_settings(&state.db_pool, &req).await?;
    info!("Admin {} updated system settings", admin.0.id);
    Ok(HttpResponse::Ok().json(settings))
}

#[post("/api/admin/settings/reset")]
async fn reset_settings(admin: AdminUser, state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let settings = db::settings::reset_settings(&state.db_pool).await?;
    info!("Admin {} reset system settings", admin.0.id);
    Ok(HttpResponse::Ok().json(settings))
}

#[get("/api/settings/public")]
async fn public_settings(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let settings = db::settings::get_settings(&state.db_pool).await?;
    Ok(HttpResponse::Ok().json(PublicSettings::from(settings)))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_users)
        .service(get_user)
        .service(change_role)
        .service(change_status)
        .service(delete_user)
        .service(stats)
        .service(get_settings)
        .service(update_settings)
        .service(reset_settings)
        .service(public_settings);
}
