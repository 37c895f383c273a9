use crate::error::{AppError, Result};
use std::{env, path::PathBuf, str::FromStr};

pub const DEFAULT_NOTIFICATION_RECIPIENT: &str = "admin@example.com";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub uploads: UploadConfig,
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_body_size: usize,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub session_ttl_hours: i64,
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

#[derive(Debug, Clone)]
pub struct BootstrapAdmin {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Public directory; images land in its `uploads/` subdirectory.
    pub public_dir: PathBuf,
    pub max_image_size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MailTransport {
    Ses,
    Log,
}

impl FromStr for MailTransport {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ses" => Ok(MailTransport::Ses),
            "log" => Ok(MailTransport::Log),
            other => Err(AppError::ConfigError(format!(
                "Invalid MAIL_TRANSPORT value: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NotificationConfig {
    pub recipient: String,
    pub sender: String,
    pub transport: MailTransport,
    pub queue_capacity: usize,
    pub max_attempts: u32,
}

impl NotificationConfig {
    /// Falls back to the documented default when the configured value is unset or blank.
    pub fn resolve_recipient(configured: Option<String>) -> String {
        configured
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_NOTIFICATION_RECIPIENT.to_string())
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            recipient: DEFAULT_NOTIFICATION_RECIPIENT.to_string(),
            sender: "no-reply@example.com".to_string(),
            transport: MailTransport::Log,
            queue_capacity: 256,
            max_attempts: 3,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, default: &str) -> Result<T> {
    env::var(name)
        .unwrap_or_else(|_| default.to_string())
        .parse()
        .map_err(|_| AppError::ConfigError(format!("Invalid {} value", name)))
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let bootstrap_admin = match (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) if !email.is_empty() && !password.is_empty() => {
                Some(BootstrapAdmin { email, password })
            }
            _ => None,
        };

        Ok(Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_var("PORT", "3000")?,
                max_body_size: parse_var("MAX_BODY_SIZE", "10485760")?,
            },
            database: DatabaseConfig {
                url: env::var("DB_URL")?,
                max_connections: parse_var("DB_MAX_CONNECTIONS", "20")?,
                acquire_timeout_secs: parse_var("DB_ACQUIRE_TIMEOUT_SECS", "5")?,
            },
            auth: AuthConfig {
                jwt_secret: env::var("JWT_SECRET")
                    .map_err(|_| AppError::ConfigError("JWT_SECRET not set".to_string()))?,
                session_ttl_hours: parse_var("SESSION_TTL_HOURS", "12")?,
                bootstrap_admin,
            },
            uploads: UploadConfig {
                public_dir: PathBuf::from(
                    env::var("UPLOAD_DIR").unwrap_or_else(|_| "public".to_string()),
                ),
                max_image_size: parse_var("MAX_IMAGE_SIZE", "2097152")?,
            },
            notifications: NotificationConfig {
                recipient: NotificationConfig::resolve_recipient(
                    env::var("PRICE_NOTIFICATION_EMAIL").ok(),
                ),
                sender: env::var("NOTIFICATION_SENDER")
                    .unwrap_or_else(|_| "no-reply@example.com".to_string()),
                transport: parse_var("MAIL_TRANSPORT", "log")?,
                queue_capacity: parse_var("NOTIFICATION_QUEUE_CAPACITY", "256")?,
                max_attempts: parse_var("NOTIFICATION_MAX_ATTEMPTS", "3")?,
            },
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
