mod app_config;
mod ses_config;

pub use app_config::{
    AppConfig, AuthConfig, BootstrapAdmin, DEFAULT_NOTIFICATION_RECIPIENT, DatabaseConfig,
    MailTransport, NotificationConfig, ServerConfig, UploadConfig,
};
pub use ses_config::*;
