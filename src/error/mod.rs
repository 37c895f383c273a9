//! Errors surfaced by handlers, stores and services.
//!
//! Leaf components keep their own error enums (`QueueError`, `MailError`) and
//! never convert into [`AppError`], so a failed notification cannot fail a request.

mod app_error;

pub use app_error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
