use async_trait::async_trait;
use aws_sdk_sesv2::Client as SesClient;
use rust_decimal::Decimal;

use crate::{models::PriceChangeNotification, utils::views};

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("failed to build email: {0}")]
    Build(String),
    #[error("email transport failed: {0}")]
    Transport(String),
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_price_change(&self, message: &PriceChangeNotification) -> Result<(), MailError>;
}

pub struct SesMailer {
    client: SesClient,
    sender: String,
}

impl SesMailer {
    pub fn new(client: SesClient, sender: impl Into<String>) -> Self {
        Self {
            client,
            sender: sender.into(),
        }
    }
}

#[async_trait]
impl Mailer for SesMailer {
    async fn send_price_change(&self, message: &PriceChangeNotification) -> Result<(), MailError> {
        let html = render_price_change_email(message);

        let destination = aws_sdk_sesv2::types::Destination::builder()
            .to_addresses(&message.recipient)
            .build();

        let subject = aws_sdk_sesv2::types::Content::builder()
            .data(message.subject())
            .charset("UTF-8")
            .build()
            .map_err(|e| MailError::Build(format!("subject: {}", e)))?;

        let html_body = aws_sdk_sesv2::types::Content::builder()
            .data(html)
            .charset("UTF-8")
            .build()
            .map_err(|e| MailError::Build(format!("html body: {}", e)))?;

        let body = aws_sdk_sesv2::types::Body::builder().html(html_body).build();

        let email = aws_sdk_sesv2::types::Message::builder()
            .subject(subject)
            .body(body)
            .build();

        let content = aws_sdk_sesv2::types::EmailContent::builder()
            .simple(email)
            .build();

        self.client
            .send_email()
            .from_email_address(&self.sender)
            .destination(destination)
            .content(content)
            .send()
            .await
            .map_err(|e| MailError::Transport(format!("{:?}", e)))?;

        Ok(())
    }
}

/// Writes notifications to the log instead of sending them.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_price_change(&self, message: &PriceChangeNotification) -> Result<(), MailError> {
        tracing::info!(
            product_id = message.product_id,
            recipient = %message.recipient,
            "{}: {} -> {}",
            message.subject(),
            format_price(message.old_price),
            format_price(Some(message.new_price))
        );
        Ok(())
    }
}

pub fn format_price(price: Option<Decimal>) -> String {
    match price {
        Some(price) => format!("{:.2}", price),
        None => "n/a".to_string(),
    }
}

pub fn render_price_change_email(message: &PriceChangeNotification) -> String {
    let template = include_str!("../templates/price_change_email.html");

    views::fill(
        template,
        &[
            (
                "product_name",
                &*html_escape::encode_text(&message.product_name),
            ),
            ("product_id", message.product_id.to_string().as_str()),
            ("old_price", format_price(message.old_price).as_str()),
            ("new_price", format_price(Some(message.new_price)).as_str()),
            (
                "changed_at",
                message
                    .enqueued_at
                    .format("%Y-%m-%d %H:%M UTC")
                    .to_string()
                    .as_str(),
            ),
        ],
    )
}
