use actix_web::{delete, get, post, put, web, HttpResponse};
use log::info;
use serde_json::json;

use crate::auth::StaffUser;
use crate::db;
use crate::db::categories::slugify;
use crate::error::{ApiError, ApiResult};
use crate::models::CategoryInput;
use crate::AppState;

const DUPLICATE_SLUG: &str = "A category with this slug already exists";

fn requested_slug(input: &CategoryInput) -> ApiResult<Option<String>> {
    match input.slug.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => slugify(raw)
            .map(Some)
            .ok_or_else(|| ApiError::Validation("Slug must contain letters or digits".to_string())),
        _ => Ok(None),
    }
}

#[get("/api/categories")]
async fn list_categories(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    let categories = db::categories::list_categories(&state.db_pool, false).await?;
    Ok(HttpResponse::Ok().json(categories))
}

#[get("/api/categories/{slug}")]
async fn get_category(
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let category = db::categories::get_category_by_slug(&state.db_pool, &path.into_inner())
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;
    Ok(HttpResponse::Ok().json(category))
}

#[get("/api/admin/categories")]
async fn admin_list_categories(
    _staff: StaffUser,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let categories = db::categories::list_categories(&state.db_pool, true).await?;
    Ok(HttpResponse::Ok().json(categories))
}

#[post("/api/admin/categories")]
async fn create_category(
    staff: StaffUser,
    req: web::Json<CategoryInput>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let name = req
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::Validation("Category name is required".to_string()))?;

    // Use the given slug, or derive one from the name
    let slug = match requested_slug(&req)? {
        Some(slug) => slug,
        None => slugify(name).ok_or_else(|| {
            ApiError::Validation("Could not derive a slug from the name; provide one".to_string())
        })?,
    };

    // Slugs are unique; a clash is a conflict
    let category = db::categories::create_category(&state.db_pool, name, &slug, &req)
        .await
        .map_err(|e| ApiError::from_write(e, DUPLICATE_SLUG))?;
    info!("User {} created category {}", staff.0.id, category.slug);
    Ok(HttpResponse::Created().json(category))
}

#[put("/api/admin/categories/{id}")]
async fn update_category(
    _staff: StaffUser,
    path: web::Path<i64>,
    req: web::Json<CategoryInput>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    if req.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(ApiError::Validation("Category name cannot be empty".to_string()));
    }
    let slug = requested_slug(&req)?;

    let category = db::categories::update_category(&state.db_pool, path.into_inner(), slug.as_deref(), &req)
        .await
        .map_err(|e| ApiError::from_write(e, DUPLICATE_SLUG))?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;
    Ok(HttpResponse::Ok().json(category))
}

#[delete("/api/admin/categories/{id}")]
async fn delete_category(
    _staff: StaffUser,
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    if !db::categories::delete_category(&state.db_pool, path.into_inner()).await? {
        return Err(ApiError::NotFound("Category not found".to_string()));
    }
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Category deleted"
    })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_categories)
        .service(get_category)
        .service(admin_list_categories)
        .service(create_category)
        .service(update_category)
        .service(delete_category);
}
