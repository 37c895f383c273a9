use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Product;

/// Queued message announcing that a product's price changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceChangeNotification {
    pub id: Uuid,
    pub product_id: i32,
    pub product_name: String,
    /// `None` when the product had no previous price.
    pub old_price: Option<Decimal>,
    pub new_price: Decimal,
    pub recipient: String,
    pub enqueued_at: DateTime<Utc>,
}

impl PriceChangeNotification {
    pub fn new(
        product: &Product,
        old_price: Option<Decimal>,
        new_price: Decimal,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            product_id: product.id,
            product_name: product.name.clone(),
            old_price,
            new_price,
            recipient: recipient.into(),
            enqueued_at: Utc::now(),
        }
    }

    pub fn subject(&self) -> String {
        format!("Price changed: {}", self.product_name)
    }
}
