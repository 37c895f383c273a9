use aws_config::{BehaviorVersion, Region};
use aws_sdk_sesv2::{Client as SesClient, config::Credentials};

use crate::error::{AppError, Result};

/// Builds the SES client used by the price-change mailer.
///
/// Explicit `AWS_ACCESS_KEY_ID`/`AWS_SECRET_ACCESS_KEY` win; without them the
/// default provider chain (instance profile, shared config) is used.
pub async fn load_ses_client() -> Result<SesClient> {
    let region = std::env::var("AWS_REGION").unwrap_or_else(|_| "us-east-1".to_string());

    let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(Region::new(region));

    match (
        std::env::var("AWS_ACCESS_KEY_ID"),
        std::env::var("AWS_SECRET_ACCESS_KEY"),
    ) {
        (Ok(access_key), Ok(secret_key)) => {
            let credentials =
                Credentials::new(access_key, secret_key, None, None, "env-credentials");
            loader = loader.credentials_provider(credentials);
        }
        (Ok(_), Err(_)) => {
            return Err(AppError::ConfigError(
                "AWS_SECRET_ACCESS_KEY not set".to_string(),
            ));
        }
        _ => tracing::info!("No static AWS credentials, using the default provider chain"),
    }

    let ses_client = SesClient::new(&loader.load().await);

    tracing::info!("AWS SES client initialized for price notifications");

    Ok(ses_client)
}
