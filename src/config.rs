use std::env;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Unset means the in-memory store is used.
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub notify_webhook_url: Option<String>,
    pub mail_from: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL").ok().filter(|v| !v.is_empty());
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET is not set")?;
        let jwt_ttl_hours = env::var("JWT_TTL_HOURS")
            .ok()
            .and_then(|h| h.parse::<i64>().ok())
            .filter(|h| *h > 0)
            .unwrap_or(24);
        let notify_webhook_url = env::var("NOTIFY_WEBHOOK_URL").ok().filter(|v| !v.is_empty());
        let mail_from =
            env::var("MAIL_FROM").unwrap_or_else(|_| "no-reply@storemgmt.com".to_string());
        Ok(Self {
            port,
            database_url,
            host,
            jwt_secret,
            jwt_ttl_hours,
            notify_webhook_url,
            mail_from,
        })
    }

    /// Configuration for tests and local tooling that never touch the environment.
    pub fn for_tests(jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: None,
            host: "127.0.0.1".to_string(),
            port: 0,
            jwt_secret: jwt_secret.into(),
            jwt_ttl_hours: 1,
            notify_webhook_url: None,
            mail_from: "no-reply@storemgmt.com".to_string(),
        }
    }
}
