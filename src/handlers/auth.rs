use actix_web::{get, post, put, web, HttpResponse};
use log::{info, warn};
use serde_json::json;

use crate::auth::{hash_password, issue_token, verify_password, AuthUser};
use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::models::{ChangePasswordRequest, LoginRequest, RegisterRequest, Role, UpdateProfileRequest};
use crate::AppState;

const MIN_PASSWORD_LEN: usize = 6;

fn validate_email(email: &str) -> ApiResult<()> {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(ApiError::Validation("A valid email address is required".to_string())),
    }
}

fn validate_password(password: &str) -> ApiResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

#[post("/api/auth/register")]
async fn register(
    req: web::Json<RegisterRequest>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    // Validate the input before touching the database
    validate_email(&req.email)?;
    validate_password(&req.password)?;

    // Registration can be switched off from the admin settings
    let settings = db::settings::get_settings(&state.db_pool).await?;
    if !settings.registration_enabled {
        return Err(ApiError::Forbidden("Registration is currently disabled".to_string()));
    }

    // Check if the email is already taken
    if db::users::get_user_by_email(&state.db_pool, &req.email).await?.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    // Hash the password and insert the user; the unique index catches a racing duplicate
    let password_hash = hash_password(&req.password, state.config.bcrypt_cost)?;
    let user = db::users::create_user(
        &state.db_pool,
        &req.email,
        &password_hash,
        &req.first_name,
        &req.last_name,
        Role::User,
    )
    .await
    .map_err(|e| ApiError::from_write(e, "Email already registered"))?;

    // Generate a JWT token for the new account
    let token = issue_token(&user, &state.config)?;
    info!("Registered user {} ({})", user.id, user.email);

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "User registered successfully",
        "user": user,
        "token": token
    })))
}

#[post("/api/auth/login")]
async fn login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let invalid = || ApiError::Unauthorized("Invalid credentials".to_string());

    // Unknown email and wrong password get the same answer
    let user = db::users::get_user_by_email(&state.db_pool, &req.email)
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&req.password, &user.password) {
        warn!("Failed login for {}", user.email);
        return Err(invalid());
    }
    if !user.is_active {
        return Err(ApiError::Forbidden("Account is deactivated".to_string()));
    }

    // Stamp the login and hand out a fresh token
    let user = db::users::record_login(&state.db_pool, user.id).await?;
    let token = issue_token(&user, &state.config)?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Login successful",
        "user": user,
        "token": token
    })))
}

#[post("/api/auth/logout")]
async fn logout() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Logout successful"
    }))
}

#[get("/api/auth/me")]
async fn me(auth: AuthUser) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "user": auth.0
    }))
}

#[put("/api/auth/profile")]
async fn update_profile(
    auth: AuthUser,
    req: web::Json<UpdateProfileRequest>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    let user = db::users::update_profile(
        &state.db_pool,
        auth.id(),
        req.first_name.as_deref(),
        req.last_name.as_deref(),
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "user": user
    })))
}

#[put("/api/auth/password")]
async fn change_password(
    auth: AuthUser,
    req: web::Json<ChangePasswordRequest>,
    state: web::Data<AppState>,
) -> ApiResult<HttpResponse> {
    if !verify_password(&req.current_password, &auth.0.password) {
        return Err(ApiError::Unauthorized("Current password is incorrect".to_string()));
    }
    validate_password(&req.new_password)?;

    // Store the new hash
    let password_hash = hash_password(&req.new_password, state.config.bcrypt_cost)?;
    db::users::update_password(&state.db_pool, auth.id(), &password_hash).await?;
    info!("User {} changed their password", auth.id());

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Password updated"
    })))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(register)
        .service(login)
        .service(logout)
        .service(me)
        .service(update_profile)
        .service(change_password);
}
