use std::sync::Arc;

use rust_decimal::Decimal;

use crate::{
    models::{PriceChangeNotification, Product},
    services::notification_queue::NotificationQueue,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyOutcome {
    Unchanged,
    Enqueued,
    /// The queue refused the message; the error has already been logged.
    DispatchFailed,
}

/// A missing new price is never a change; a missing old price is.
pub fn price_changed(old_price: Option<Decimal>, new_price: Option<Decimal>) -> bool {
    match (old_price, new_price) {
        (Some(old), Some(new)) => old != new,
        (None, Some(_)) => true,
        (_, None) => false,
    }
}

#[derive(Clone)]
pub struct PriceChangeNotifier {
    queue: Arc<dyn NotificationQueue>,
    recipient: String,
}

impl PriceChangeNotifier {
    pub fn new(queue: Arc<dyn NotificationQueue>, recipient: impl Into<String>) -> Self {
        Self {
            queue,
            recipient: recipient.into(),
        }
    }

    /// Call only after the product update has been persisted.
    pub fn notify_price_change(
        &self,
        product: &Product,
        old_price: Option<Decimal>,
        new_price: Option<Decimal>,
    ) -> NotifyOutcome {
        let Some(new) = new_price.filter(|_| price_changed(old_price, new_price)) else {
            return NotifyOutcome::Unchanged;
        };

        let message = PriceChangeNotification::new(product, old_price, new, &self.recipient);
        let notification_id = message.id;

        match self.queue.enqueue(message) {
            Ok(()) => {
                tracing::info!(
                    %notification_id,
                    product_id = product.id,
                    "Queued price change notification"
                );
                NotifyOutcome::Enqueued
            }
            Err(e) => {
                tracing::error!(
                    product_id = product.id,
                    "Failed to dispatch price change notification: {}",
                    e
                );
                NotifyOutcome::DispatchFailed
            }
        }
    }
}
