//! UI-agnostic application state types
//!
//! Data structures shared by every front end that don't depend on any
//! specific UI framework.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::intent::{Response, ResponseKind};

/// A message in the support conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub text: String,
    pub originator: Originator,
    pub timestamp: DateTime<Local>,
    /// Always informational for user messages
    #[serde(default)]
    pub kind: ResponseKind,
}

/// Who sent a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Originator {
    User,
    Assistant,
}

impl ChatMessage {
    pub fn user(text: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.to_string(),
            originator: Originator::User,
            timestamp: Local::now(),
            kind: ResponseKind::Informational,
        }
    }

    pub fn assistant(response: Response) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: response.text,
            originator: Originator::Assistant,
            timestamp: Local::now(),
            kind: response.kind,
        }
    }

    pub fn is_user(&self) -> bool {
        self.originator == Originator::User
    }

    /// Clock time shown next to the bubble, e.g. `14:05`
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}
