//! In-process queue for price-change notifications.
//!
//! Handlers push with [`NotificationQueue::enqueue`], which never waits. A
//! single [`NotificationWorker`] task drains the channel and delivers each
//! message through a [`Mailer`], retrying with exponential backoff.

use std::{sync::Arc, time::Duration};

use tokio::sync::mpsc::{self, error::TrySendError};

use crate::{models::PriceChangeNotification, services::email_service::Mailer};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    #[error("notification queue is full")]
    Full,
    #[error("notification queue is closed")]
    Closed,
}

pub trait NotificationQueue: Send + Sync {
    /// Hands the message off without waiting for delivery.
    fn enqueue(&self, message: PriceChangeNotification) -> Result<(), QueueError>;
}

#[derive(Debug, Clone)]
pub struct ChannelQueue {
    sender: mpsc::Sender<PriceChangeNotification>,
}

/// Creates a bounded queue and the receiving end for the worker.
pub fn channel(capacity: usize) -> (ChannelQueue, mpsc::Receiver<PriceChangeNotification>) {
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (ChannelQueue { sender }, receiver)
}

impl NotificationQueue for ChannelQueue {
    fn enqueue(&self, message: PriceChangeNotification) -> Result<(), QueueError> {
        self.sender.try_send(message).map_err(|e| match e {
            TrySendError::Full(_) => QueueError::Full,
            TrySendError::Closed(_) => QueueError::Closed,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total delivery attempts, including the first.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            ..Default::default()
        }
    }

    /// Delay after the given failed attempt (1-indexed): base * 2^(attempt-1), capped.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let factor = 2u32.saturating_pow(attempt - 1);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

pub struct NotificationWorker {
    receiver: mpsc::Receiver<PriceChangeNotification>,
    mailer: Arc<dyn Mailer>,
    retry: RetryPolicy,
}

impl NotificationWorker {
    pub fn new(
        receiver: mpsc::Receiver<PriceChangeNotification>,
        mailer: Arc<dyn Mailer>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            receiver,
            mailer,
            retry,
        }
    }

    /// Runs until every queue handle is dropped, draining what is already queued.
    pub async fn run(mut self) {
        tracing::info!("Price notification worker started");

        while let Some(message) = self.receiver.recv().await {
            self.deliver(&message).await;
        }

        tracing::info!("Price notification worker stopped");
    }

    /// Returns whether the message was delivered within the retry budget.
    pub async fn deliver(&self, message: &PriceChangeNotification) -> bool {
        let max_attempts = self.retry.max_attempts.max(1);

        for attempt in 1..=max_attempts {
            match self.mailer.send_price_change(message).await {
                Ok(()) => {
                    tracing::info!(
                        notification_id = %message.id,
                        product_id = message.product_id,
                        attempt,
                        "Price change notification delivered to {}",
                        message.recipient
                    );
                    return true;
                }
                Err(e) if attempt < max_attempts => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    tracing::warn!(
                        notification_id = %message.id,
                        product_id = message.product_id,
                        attempt,
                        "Price change notification failed, retrying in {:?}: {}",
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::error!(
                        notification_id = %message.id,
                        product_id = message.product_id,
                        attempts = max_attempts,
                        "Dropping price change notification: {}",
                        e
                    );
                }
            }
        }

        false
    }
}
