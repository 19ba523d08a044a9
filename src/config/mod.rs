use crate::core::{AppError, Result};
use serde::Deserialize;
use std::env;

pub mod database;
pub mod server;

pub use database::DatabaseConfig;
pub use server::ServerConfig;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub smtp: SmtpConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
}

/// SMTP settings for document delivery
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub from_address: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
            smtp: SmtpConfig {
                host: env::var("SMTP_HOST")
                    .map_err(|_| AppError::Configuration("SMTP_HOST not set".to_string()))?,
                port: env::var("SMTP_PORT")
                    .unwrap_or_else(|_| "587".to_string())
                    .parse()
                    .map_err(|_| AppError::Configuration("Invalid SMTP_PORT".to_string()))?,
                user: env::var("SMTP_USER")
                    .map_err(|_| AppError::Configuration("SMTP_USER not set".to_string()))?,
                password: env::var("SMTP_PASSWORD")
                    .map_err(|_| AppError::Configuration("SMTP_PASSWORD not set".to_string()))?,
                from_address: env::var("SMTP_FROM")
                    .map_err(|_| AppError::Configuration("SMTP_FROM not set".to_string()))?,
            },
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.smtp.from_address.trim().is_empty() {
            return Err(AppError::Configuration(
                "SMTP_FROM must not be empty".to_string(),
            ));
        }

        if self.database.max_connections == 0 {
            return Err(AppError::Configuration(
                "Database max connections must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}
