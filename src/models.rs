use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub is_active: bool,
    pub last_login_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl User {
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or(Role::User)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    Moderator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
            Role::Moderator => "moderator",
        }
    }

    /// Admins and moderators may manage content.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Moderator)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            "moderator" => Ok(Role::Moderator),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoType {
    Movie,
    Series,
}

impl VideoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoType::Movie => "movie",
            VideoType::Series => "series",
        }
    }
}

impl FromStr for VideoType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "movie" | "movies" => Ok(VideoType::Movie),
            "series" => Ok(VideoType::Series),
            other => Err(format!("Unknown video type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub genre: Json<Vec<String>>,
    pub year: Option<i32>,
    pub duration: i32,
    pub rating: f64,
    pub views: i64,
    pub thumbnail_url: Option<String>,
    pub poster_url: Option<String>,
    pub video_url: Option<String>,
    pub trailer_url: Option<String>,
    pub is_featured: bool,
    pub is_new: bool,
    pub is_hidden: bool,
    #[serde(rename = "type")]
    pub video_type: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Video {
    pub fn kind(&self) -> Option<VideoType> {
        self.video_type.parse().ok()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: i64,
    pub user_id: i64,
    pub video_id: i64,
    #[serde(rename = "type")]
    pub favorite_type: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub name_kurdish: Option<String>,
    pub slug: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SystemSettings {
    pub site_name: String,
    pub site_description: String,
    pub contact_email: Option<String>,
    pub default_language: String,
    pub maintenance_mode: bool,
    pub registration_enabled: bool,
    pub max_upload_size_mb: i64,
    pub updated_at: NaiveDateTime,
}

/// The subset of settings any visitor may read.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicSettings {
    pub site_name: String,
    pub site_description: String,
    pub default_language: String,
    pub maintenance_mode: bool,
    pub registration_enabled: bool,
}

impl From<SystemSettings> for PublicSettings {
    fn from(s: SystemSettings) -> Self {
        Self {
            site_name: s.site_name,
            site_description: s.site_description,
            default_language: s.default_language,
            maintenance_mode: s.maintenance_mode,
            registration_enabled: s.registration_enabled,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    pub video_id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub genre: Option<Vec<String>>,
    pub year: Option<i32>,
    pub duration: Option<i32>,
    pub rating: Option<f64>,
    pub thumbnail_url: Option<String>,
    pub poster_url: Option<String>,
    pub video_url: Option<String>,
    pub trailer_url: Option<String>,
    pub is_featured: Option<bool>,
    pub is_new: Option<bool>,
    pub is_hidden: Option<bool>,
    #[serde(rename = "type")]
    pub video_type: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoFlagsRequest {
    pub is_featured: Option<bool>,
    pub is_new: Option<bool>,
    pub is_hidden: Option<bool>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInput {
    pub name: Option<String>,
    pub name_kurdish: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoleChangeRequest {
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChangeRequest {
    pub is_active: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub site_name: Option<String>,
    pub site_description: Option<String>,
    pub contact_email: Option<String>,
    pub default_language: Option<String>,
    pub maintenance_mode: Option<bool>,
    pub registration_enabled: Option<bool>,
    pub max_upload_size_mb: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub role: String,
    pub iat: usize,
    pub exp: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_users: i64,
    pub admin_users: i64,
    pub total_videos: i64,
    pub movies: i64,
    pub series: i64,
    pub hidden_videos: i64,
    pub featured_videos: i64,
    pub active_favorites: i64,
    pub categories: i64,
    pub total_views: i64,
}
