use crate::error::AppError;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub host: String,
    pub node_env: String,
    pub log_level: String,
    pub database_url: String,
    pub rabbitmq_url: String,
    pub redis_url: String,
    pub event_exchange: String,
    pub jwt_secret: String,
    pub youtube_api_key: Option<String>,
    pub clip_service_url: String,
    pub campaign_service_url: String,
    pub allowed_origins: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let config = Self {
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| AppError::Config("PORT must be a valid port number".into()))?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            node_env: env::var("NODE_ENV").unwrap_or_else(|_| "development".to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            database_url: Self::require("DATABASE_URL")?,
            rabbitmq_url: Self::require("RABBITMQ_URL")?,
            redis_url: Self::require("REDIS_URL")?,
            event_exchange: env::var("EVENT_EXCHANGE").unwrap_or_else(|_| "clipdeck.events".to_string()),
            jwt_secret: Self::require("JWT_SECRET")?,
            youtube_api_key: env::var("YOUTUBE_API_KEY").ok(),
            clip_service_url: Self::require("CLIP_SERVICE_URL")?,
            campaign_service_url: Self::require("CAMPAIGN_SERVICE_URL")?,
            allowed_origins: env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string()),
        };

        if config.jwt_secret.len() < 16 {
            return Err(AppError::Config(
                "JWT_SECRET must be at least 16 characters".into(),
            ));
        }
        if config.port == 0 {
            return Err(AppError::Config("PORT must be nonzero".into()));
        }

        Ok(config)
    }

    fn require(key: &str) -> Result<String, AppError> {
        let value = env::var(key).map_err(|_| AppError::Config(format!("{key} environment variable is required")))?;
        if value.is_empty() {
            return Err(AppError::Config(format!("{key} environment variable is required")));
        }
        Ok(value)
    }

    pub fn log_level_filter(&self) -> log::LevelFilter {
        match self.log_level.to_lowercase().as_str() {
            "trace" => log::LevelFilter::Trace,
            "debug" => log::LevelFilter::Debug,
            "warn" => log::LevelFilter::Warn,
            "error" => log::LevelFilter::Error,
            _ => log::LevelFilter::Info,
        }
    }
}
