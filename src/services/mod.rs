pub mod email_service;
pub mod image_service;
pub mod notification_queue;
pub mod price_change_service;

pub use email_service::{LogMailer, MailError, Mailer, SesMailer};
pub use image_service::ImageUploader;
pub use notification_queue::{
    ChannelQueue, NotificationQueue, NotificationWorker, QueueError, RetryPolicy,
};
pub use price_change_service::{NotifyOutcome, PriceChangeNotifier, price_changed};
