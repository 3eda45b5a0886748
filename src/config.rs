use std::env;
use std::str::FromStr;

use crate::error::ApiError;

/// bcrypt accepts work factors in this range.
pub const MIN_BCRYPT_COST: u32 = 4;
pub const MAX_BCRYPT_COST: u32 = 31;

/// Tokens live at most a year.
pub const MAX_JWT_EXPIRY_HOURS: i64 = 24 * 365;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    pub bcrypt_cost: u32,
    pub cors_allowed_origins: Vec<String>,
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub catalog_section_size: usize,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: "sqlite://filmxane.db".to_string(),
            host: "0.0.0.0".to_string(),
            port: 5050,
            jwt_secret: "filmxane_dev_jwt_secret".to_string(),
            jwt_expiry_hours: 24,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            cors_allowed_origins: vec!["http://localhost:3000".to_string()],
            default_page_size: 20,
            max_page_size: 100,
            catalog_section_size: 12,
            admin_email: None,
            admin_password: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ApiError> {
        let defaults = Self::default();

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.cors_allowed_origins);

        let config = Self {
            database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            host: env::var("HOST").unwrap_or(defaults.host),
            port: parse_var("PORT", defaults.port)?,
            jwt_secret: env::var("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            jwt_expiry_hours: parse_var("JWT_EXPIRY_HOURS", defaults.jwt_expiry_hours)?,
            bcrypt_cost: parse_var("BCRYPT_COST", defaults.bcrypt_cost)?,
            cors_allowed_origins,
            default_page_size: parse_var("DEFAULT_PAGE_SIZE", defaults.default_page_size)?,
            max_page_size: parse_var("MAX_PAGE_SIZE", defaults.max_page_size)?,
            catalog_section_size: parse_var("CATALOG_SECTION_SIZE", defaults.catalog_section_size)?,
            admin_email: non_empty_var("ADMIN_EMAIL"),
            admin_password: non_empty_var("ADMIN_PASSWORD"),
        };

        config.validate()
    }

    /// Rejects values that parse but would break requests later on.
    pub fn validate(self) -> Result<Self, ApiError> {
        if self.max_page_size == 0 || self.default_page_size == 0 {
            return Err(ApiError::Config("page sizes must be greater than zero".to_string()));
        }
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.bcrypt_cost) {
            return Err(ApiError::Config(format!(
                "BCRYPT_COST must be between {} and {}",
                MIN_BCRYPT_COST,
                MAX_BCRYPT_COST
            )));
        }
        if !(1..=MAX_JWT_EXPIRY_HOURS).contains(&self.jwt_expiry_hours) {
            return Err(ApiError::Config(format!(
                "JWT_EXPIRY_HOURS must be between 1 and {}",
                MAX_JWT_EXPIRY_HOURS
            )));
        }

        Ok(self)
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T, ApiError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ApiError::Config(format!("{} has an invalid value: {}", name, raw))),
        Err(_) => Ok(default),
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
