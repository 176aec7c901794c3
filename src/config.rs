// src/config.rs

use dotenvy::dotenv;
use std::env;

/// XP awarded per correctly answered quiz question.
pub const XP_PER_QUESTION: i64 = 5;

/// Number of quiz questions per material; answering all of them completes
/// the material.
pub const QUESTIONS_PER_MATERIAL: i64 = 3;

/// XP span of a single level band.
pub const XP_PER_LEVEL: i64 = 100;

/// Levels are capped here; XP beyond the last threshold does not overflow.
pub const MAX_LEVEL: i64 = 8;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET must be set");

        let jwt_expiration = env::var("JWT_EXPIRATION")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(86400);

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let admin_username = env::var("ADMIN_USERNAME").ok();
        let admin_password = env::var("ADMIN_PASSWORD").ok();

        Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            admin_username,
            admin_password,
        }
    }
}
