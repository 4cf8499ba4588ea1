//! System alerts shown on the dashboard
//!
//! Nothing is delivered to the OS. The proactive alert is produced on a
//! one-shot timer and handed to whoever owns the alert feed.

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::timer::TimerGuard;

pub const PROACTIVE_TITLE: &str = "Connection Issue Detected";
pub const PROACTIVE_MESSAGE: &str = "We detected slow internet speeds in your area. Tap to resolve.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Warning,
    Info,
    Success,
}

/// What the alert is about, so the UI knows where tapping it leads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationTopic {
    ConnectionIssue,
    Maintenance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub topic: NotificationTopic,
    pub title: String,
    pub message: String,
    /// Human readable age, e.g. `2 min ago`
    pub timestamp: String,
}

/// The alerts the dashboard opens with
pub fn seed_alerts() -> Vec<Notification> {
    vec![
        Notification {
            id: "1".to_string(),
            kind: NotificationKind::Warning,
            topic: NotificationTopic::ConnectionIssue,
            title: PROACTIVE_TITLE.to_string(),
            message: PROACTIVE_MESSAGE.to_string(),
            timestamp: "2 min ago".to_string(),
        },
        Notification {
            id: "2".to_string(),
            kind: NotificationKind::Info,
            topic: NotificationTopic::Maintenance,
            title: "Maintenance Scheduled".to_string(),
            message: "Network maintenance planned for tonight 2-4 AM.".to_string(),
            timestamp: "1 hour ago".to_string(),
        },
    ]
}

/// The scripted slow-speed alert, stamped now
pub fn proactive_alert() -> Notification {
    Notification {
        id: Utc::now().timestamp_millis().to_string(),
        kind: NotificationKind::Warning,
        topic: NotificationTopic::ConnectionIssue,
        title: PROACTIVE_TITLE.to_string(),
        message: PROACTIVE_MESSAGE.to_string(),
        timestamp: "just now".to_string(),
    }
}

/// Hand one [`proactive_alert`] to `deliver` after `delay`. Dropping the
/// returned guard cancels it.
pub fn schedule_proactive_alert<F>(delay: Duration, deliver: F) -> TimerGuard
where
    F: FnOnce(Notification) + Send + 'static,
{
    tracing::debug!(?delay, "scheduling proactive alert");
    TimerGuard::once(delay, move || {
        tracing::info!("proactive alert triggered");
        deliver(proactive_alert());
    })
}
