use actix_web::dev::Payload;
use actix_web::{http::header, web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::{error, warn};

use crate::config::Config;
use crate::db;
use crate::error::ApiError;
use crate::models::{Claims, Role, User};
use crate::AppState;

pub fn hash_password(password: &str, cost: u32) -> Result<String, ApiError> {
    bcrypt::hash(password, cost).map_err(|e| {
        error!("Password hashing failed: {:?}", e);
        ApiError::Internal("password hashing failed".to_string())
    })
}

/// A malformed stored hash counts as a failed match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or_else(|e| {
        warn!("Password verification error: {:?}", e);
        false
    })
}

pub fn issue_token(user: &User, config: &Config) -> Result<String, ApiError> {
    let now = chrono::Utc::now();
    let claims = Claims {
        user_id: user.id,
        role: user.role.clone(),
        iat: now.timestamp() as usize,
        exp: (now + chrono::Duration::hours(config.jwt_expiry_hours)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_ref()),
    )
    .map_err(|e| {
        error!("Token signing failed: {:?}", e);
        ApiError::Internal("token signing failed".to_string())
    })
}

pub fn decode_token(token: &str, config: &Config) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_ref()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::Unauthorized("Invalid or expired token".to_string()))
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
}

/// The caller behind a valid bearer token. The user row is re-read on every
/// request, so role changes and deactivation apply without a new login.
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AuthUser {
    pub fn id(&self) -> i64 {
        self.0.id
    }

    pub fn role(&self) -> Role {
        self.0.role()
    }
}

impl FromRequest for AuthUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<AppState>>().cloned();
        let token = bearer_token(req);

        Box::pin(async move {
            let state = state.ok_or_else(|| ApiError::Internal("application state missing".to_string()))?;
            let token = token.ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;
            let claims = decode_token(&token, &state.config)?;

            let user = db::users::get_user_by_id(&state.db_pool, claims.user_id)
                .await?
                .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))?;

            if !user.is_active {
                return Err(ApiError::Forbidden("Account is deactivated".to_string()));
            }

            Ok(AuthUser(user))
        })
    }
}

/// An authenticated admin.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

impl FromRequest for AdminUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let auth = AuthUser::from_request(req, payload);
        Box::pin(async move {
            let AuthUser(user) = auth.await?;
            if user.role() != Role::Admin {
                return Err(ApiError::Forbidden("Admin access required".to_string()));
            }
            Ok(AdminUser(user))
        })
    }
}

/// An authenticated admin or moderator.
#[derive(Debug, Clone)]
pub struct StaffUser(pub User);

impl FromRequest for StaffUser {
    type Error = ApiError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let auth = AuthUser::from_request(req, payload);
        Box::pin(async move {
            let AuthUser(user) = auth.await?;
            if !user.role().is_staff() {
                return Err(ApiError::Forbidden("Staff access required".to_string()));
            }
            Ok(StaffUser(user))
        })
    }
}
