pub mod api;
pub mod chat;
pub mod checklist;
pub mod config;
pub mod dashboard;
pub mod intent;
pub mod notifications;
pub mod state;
pub mod timer;
pub mod tracker;

// Re-export main types for convenience
pub use api::{ApiLatency, ChatRequest, ChatResponse, MockApi, ReplyType};
pub use chat::{ChatSession, PendingReply};
pub use checklist::{HelpGuide, HelpStep};
pub use config::Config;
pub use dashboard::Dashboard;
pub use intent::{IntentRule, Response, ResponseKind, RuleSet};
pub use notifications::{Notification, NotificationKind};
pub use state::{ChatMessage, Originator};
pub use timer::TimerGuard;
pub use tracker::{Technician, TechnicianStatus};
