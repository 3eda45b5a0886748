use actix_web::{delete, get, post, web, HttpResponse};
use log::debug;
use serde::Deserialize;
use serde_json::json;

use crate::auth::AuthUser;
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::models::{FavoriteRequest, Role, VideoType};
use crate::search::Pagination;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Resolves whose favorite the request is about. Only admins may act on
/// another user's pair, and that user has to exist.
async fn target_user(state: &AppState, auth: &AuthUser, req: &FavoriteRequest) -> ApiResult<i64> {
    let user_id = match req.user_id {
        Some(user_id) if user_id != auth.id() => user_id,
        _ => return Ok(auth.id()),
    };

    if auth.role() != Role::Admin {
        return Err(ApiError::Forbidden("Cannot modify another user's favorites".to_string()));
    }
    if db::users::get_user_by_id(&state.db_pool, user_id).await?.is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }
    Ok(user_id)
}

async fn favorited_video_type(state: &AppState, video_id: i64) -> ApiResult<VideoType> {
    let video = db::videos::get_video(&state.db_pool, video_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Video not found".to_string()))?;
    Ok(video.kind().unwrap_or(VideoType::Movie))
}

#[post("/api/favorites")]
async fn add_favorite(
    auth: AuthUser,
    req: web::Json<FavoriteRequest>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    // Resolve the owner and make sure the video exists
    let user_id = target_user(&state, &auth, &req).await?;
    let video_type = favorited_video_type(&state, req.video_id).await?;

    // Upsert the pair so repeated adds land on the same row
    let favorite = db::favorites::add_favorite(&state.db_pool, user_id, req.video_id, video_type)
        .await
        .map_err(|e| ApiError::from_write(e, "Favorite already exists"))?;
    debug!("User {} favorited video {}", user_id, req.video_id);

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "isFavorite": true,
        "favorite": favorite
    })))
}

#[delete("/api/favorites")]
async fn remove_favorite(
    auth: AuthUser,
    req: web::Json<FavoriteRequest>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let user_id = target_user(&state, &auth, &req).await?;
    let removed = db::favorites::remove_favorite(&state.db_pool, user_id, req.video_id).await?;
    debug!("User {} unfavorited video {} (changed: {})", user_id, req.video_id, removed);

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "isFavorite": false,
        "removed": removed
    })))
}

#[post("/api/favorites/check")]
async fn check_favorite(
    auth: AuthUser,
    req: web::Json<FavoriteRequest>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let user_id = target_user(&state, &auth, &req).await?;
    let is_favorite = db::favorites::is_favorite(&state.db_pool, user_id, req.video_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "isFavorite": is_favorite
    })))
}

#[post("/api/favorites/toggle")]
async fn toggle_favorite(
    auth: AuthUser,
    req: web::Json<FavoriteRequest>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let user_id = target_user(&state, &auth, &req).await?;
    let video_type = favorited_video_type(&state, req.video_id).await?;
    let is_favorite = db::favorites::toggle_favorite(&state.db_pool, user_id, req.video_id, video_type)
        .await
        .map_err(|e| ApiError::from_write(e, "Favorite already exists"))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "isFavorite": is_favorite
    })))
}

#[get("/api/favorites/my-favorites")]
async fn my_favorites(
    auth: AuthUser,
    params: web::Query<PageParams>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let pagination = Pagination::from_params(
        params.page,
        params.limit,
        state.config.default_page_size,
        state.config.max_page_size,
    );
    let page = db::favorites::list_user_favorites(&state.db_pool, auth.id(), pagination).await?;
    Ok(HttpResponse::Ok().json(page))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(add_favorite)
        .service(remove_favorite)
        .service(check_favorite)
        .service(toggle_favorite)
        .service(my_favorites);
}
