use actix_web::{delete, get, patch, post, put, web, HttpResponse};
use log::info;
use serde_json::json;

use crate::auth::StaffUser;
use crate::catalog::ContentCatalog;
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::models::{VideoFlagsRequest, VideoInput, VideoType};
use crate::search::{search_videos, Pagination, SearchParams, VideoFilter};
use crate::AppState;

fn pagination(params: &SearchParams, state: &AppState) -> Pagination {
    Pagination::from_params(
        params.page,
        params.limit,
        state.config.default_page_size,
        state.config.max_page_size,
    )
}

#[get("/api/videos")]
async fn list_videos(
    params: web::Query<SearchParams>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let filter = VideoFilter::from_params(&params);
    let page = search_videos(&state.db_pool, &filter, pagination(&params, &state)).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/api/videos/search")]
async fn search(
    params: web::Query<SearchParams>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let filter = VideoFilter::from_params(&params);
    let page = search_videos(&state.db_pool, &filter, pagination(&params, &state)).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/api/videos/featured")]
async fn featured_videos(
    params: web::Query<SearchParams>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let filter = VideoFilter {
        featured_only: true,
        ..VideoFilter::from_params(&params)
    };
    let page = search_videos(&state.db_pool, &filter, pagination(&params, &state)).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/api/videos/new")]
async fn new_videos(
    params: web::Query<SearchParams>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let filter = VideoFilter {
        new_only: true,
        ..VideoFilter::from_params(&params)
    };
    let page = search_videos(&state.db_pool, &filter, pagination(&params, &state)).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/api/videos/type/{type}")]
async fn videos_by_type(
    path: web::Path<String>,
    params: web::Query<SearchParams>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let video_type: VideoType = path.into_inner().parse().map_err(ApiError::BadRequest)?;
    let filter = VideoFilter {
        video_type: Some(video_type),
        ..VideoFilter::from_params(&params)
    };
    let page = search_videos(&state.db_pool, &filter, pagination(&params, &state)).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[get("/api/videos/{id}")]
async fn get_video(
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    // Every direct lookup counts as a view, hidden videos included
    let video = db::videos::record_view(&state.db_pool, path.into_inner())
        .await?
        .ok_or_else(|| ApiError::NotFound("Video not found".to_string()))?;
    Ok(HttpResponse::Ok().json(video))
}

#[get("/api/content")]
async fn content(state: web::Data<AppState>) -> ApiResult<HttpResponse> {
    // One fetch for all sections
    let videos = db::videos::list_visible(&state.db_pool).await?;
    let categories = db::categories::list_categories(&state.db_pool, false).await?;
    let catalog = ContentCatalog::from_videos(videos, categories, state.config.catalog_section_size);
    Ok(HttpResponse::Ok().json(catalog))
}

fn validate_video(input: &VideoInput, creating: bool) -> ApiResult<Option<VideoType>> {
    match input.title.as_deref().map(str::trim) {
        Some("") => return Err(ApiError::Validation("Title cannot be empty".to_string())),
        None if creating => return Err(ApiError::Validation("Title is required".to_string())),
        _ => {}
    }
    if let Some(rating) = input.rating {
        if !(0.0..=10.0).contains(&rating) {
            return Err(ApiError::Validation("Rating must be between 0 and 10".to_string()));
        }
    }
    if let Some(year) = input.year {
        if !(1888..=2100).contains(&year) {
            return Err(ApiError::Validation("Year is out of range".to_string()));
        }
    }
    if input.duration.is_some_and(|d| d < 0) {
        return Err(ApiError::Validation("Duration cannot be negative".to_string()));
    }

    input
        .video_type
        .as_deref()
        .map(|t| t.parse::<VideoType>().map_err(ApiError::Validation))
        .transpose()
}

#[get("/api/admin/videos")]
async fn admin_list_videos(
    _staff: StaffUser,
    params: web::Query<SearchParams>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let filter = VideoFilter {
        include_hidden: true,
        ..VideoFilter::from_params(&params)
    };
    let page = search_videos(&state.db_pool, &filter, pagination(&params, &state)).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[post("/api/admin/videos")]
async fn create_video(
    staff: StaffUser,
    req: web::Json<VideoInput>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    // Missing type defaults to movie
    let video_type = validate_video(&req, true)?.unwrap_or(VideoType::Movie);
    let video = db::videos::create_video(&state.db_pool, &req, video_type).await?;
    info!("User {} created video {} ({})", staff.0.id, video.id, video.title);
    Ok(HttpResponse::Created().json(video))
}

#[put("/api/admin/videos/{id}")]
async fn update_video(
    _staff: StaffUser,
    path: web::Path<i64>,
    req: web::Json<VideoInput>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    validate_video(&req, false)?;
    let video = db::videos::update_video(&state.db_pool, path.into_inner(), &req)
        .await?
        .ok_or_else(|| ApiError::NotFound("Video not found".to_string()))?;
    Ok(HttpResponse::Ok().json(video))
}

#[patch("/api/admin/videos/{id}/flags")]
async fn update_video_flags(
    _staff: StaffUser,
    path: web::Path<i64>,
    req: web::Json<VideoFlagsRequest>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let video = db::videos::set_flags(&state.db_pool, path.into_inner(), &req)
        .await?
        .ok_or_else(|| ApiError::NotFound("Video not found".to_string()))?;
    Ok(HttpResponse::Ok().json(video))
}

#[delete("/api/admin/videos/{id}")]
async fn delete_video(
    staff: StaffUser,
    path: web::Path<i64>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let id = path.into_inner();
    // Hard delete; favorites cascade
    if !db::videos::delete_video(&state.db_pool, id).await? {
        return Err(ApiError::NotFound("Video not found".to_string()));
    }
    info!("User {} deleted video {}", staff.0.id, id);
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Video deleted"
    })))
}

/// Fixed paths go first so `/api/videos/{id}` does not swallow them.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_videos)
        .service(search)
        .service(featured_videos)
        .service(new_videos)
        .service(videos_by_type)
        .service(get_video)
        .service(content)
        .service(admin_list_videos)
        .service(create_video)
        .service(update_video)
        .service(update_video_flags)
        .service(delete_video);
}
