use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::models::CheckTarget;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Startup,
    Available,
    Error,
}

/// One message for the notifier. Dropped after a single delivery attempt.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationEvent {
    pub kind: NotificationKind,
    pub recipient: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl NotificationEvent {
    fn new(kind: NotificationKind, recipient: &str, message: String) -> Self {
        Self {
            kind,
            recipient: recipient.to_string(),
            message,
            timestamp: Utc::now(),
        }
    }

    pub fn startup(recipient: &str, target: &CheckTarget, interval: Duration) -> Self {
        let message = format!(
            "Started monitoring '{}' at {} (every {})",
            target.target_item_text,
            target.page_url,
            humantime::format_duration(interval)
        );
        Self::new(NotificationKind::Startup, recipient, message)
    }

    pub fn available(recipient: &str, target: &CheckTarget) -> Self {
        let message = format!(
            "{} is AVAILABLE! {}",
            target.target_item_text, target.page_url
        );
        Self::new(NotificationKind::Available, recipient, message)
    }

    pub fn check_failed(recipient: &str, target: &CheckTarget, error: &str) -> Self {
        let message = format!(
            "Availability check failed for '{}': {}",
            target.target_item_text, error
        );
        Self::new(NotificationKind::Error, recipient, message)
    }
}
