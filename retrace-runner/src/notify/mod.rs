//! Signal delivery: message formatting, sent-signal history, and notifiers.

pub mod history;
pub mod log;
pub mod message;
pub mod telegram;

pub use history::{SignalHistory, StoredSignal, DEFAULT_MAX_STORED};
pub use log::LogNotifier;
pub use message::{format_signal_message, format_status, round_price, StatusView};
pub use telegram::TelegramNotifier;

use retrace_core::Signal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("missing credential: environment variable {0} is not set")]
    MissingCredential(&'static str),

    #[error("HTTP error delivering notification: {0}")]
    Http(String),

    #[error("notification rejected by {service}: {reason}")]
    Rejected { service: String, reason: String },

    #[error("I/O error on {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("history serialization failed: {0}")]
    Serialization(String),
}

/// A sink for emitted signals.
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    fn notify(&self, signal: &Signal) -> Result<(), NotifyError>;
}
