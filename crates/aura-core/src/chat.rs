//! Chat session state for the support assistant
//!
//! The session owns the message log and guards a single in-flight reply.
//! Every submitted message gets a sequence number and only the reply for the
//! pending number is accepted, so replies can never land out of order.

use crate::intent::Response;
use crate::state::ChatMessage;

/// Soft limit on the chat input, in characters
pub const MAX_INPUT_CHARS: usize = 500;

pub const GREETING: &str = "Hello! I'm AURA, your AI technical support assistant. I can help you troubleshoot internet issues, check your connection status, and guide you through solutions. What seems to be the problem?";

/// A submitted message awaiting its reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReply {
    pub seq: u64,
    pub utterance: String,
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    next_seq: u64,
    pending: Option<u64>,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatSession {
    /// A fresh session opened with the assistant's greeting
    pub fn new() -> Self {
        Self {
            messages: vec![greeting()],
            next_seq: 1,
            pending: None,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Record a user message and open a pending reply.
    ///
    /// Returns `None` when the trimmed input is empty or a reply is still
    /// outstanding; the session is untouched in both cases.
    pub fn submit(&mut self, input: &str) -> Option<PendingReply> {
        if self.pending.is_some() {
            return None;
        }

        let text = clamp_input(input.trim());
        if text.is_empty() {
            return None;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending = Some(seq);
        self.messages.push(ChatMessage::user(text));

        Some(PendingReply {
            seq,
            utterance: text.to_string(),
        })
    }

    /// Deliver the reply for `seq`. Replies for anything other than the
    /// pending request are dropped and `false` is returned.
    pub fn resolve(&mut self, seq: u64, response: Response) -> bool {
        if self.pending != Some(seq) {
            tracing::debug!(seq, "discarding stale chat reply");
            return false;
        }

        self.pending = None;
        self.messages.push(ChatMessage::assistant(response));
        true
    }

    /// Start over from the greeting. An in-flight reply becomes stale.
    pub fn reset(&mut self) {
        self.messages = vec![greeting()];
        self.pending = None;
    }

    /// The most recent assistant message, if it offers a follow-up action
    pub fn pending_action(&self) -> Option<&ChatMessage> {
        self.messages
            .last()
            .filter(|msg| !msg.is_user() && msg.kind.is_actionable())
    }
}

fn greeting() -> ChatMessage {
    ChatMessage::assistant(Response {
        text: GREETING.to_string(),
        kind: Default::default(),
    })
}

/// Cut `text` down to [`MAX_INPUT_CHARS`] characters on a char boundary
pub fn clamp_input(text: &str) -> &str {
    match text.char_indices().nth(MAX_INPUT_CHARS) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::{ResponseKind, RuleSet};
    use crate::state::Originator;

    #[test]
    fn test_new_session_starts_with_greeting() {
        let session = ChatSession::new();
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].text, GREETING);
        assert_eq!(session.messages()[0].originator, Originator::Assistant);
        assert!(!session.is_pending());
    }

    #[test]
    fn test_blank_input_is_rejected() {
        let mut session = ChatSession::new();
        assert!(session.submit("").is_none());
        assert!(session.submit("   \n").is_none());
        assert_eq!(session.messages().len(), 1);
    }

    #[test]
    fn test_submit_then_resolve() {
        let rules = RuleSet::standard();
        let mut session = ChatSession::new();

        let pending = session.submit("  My wifi keeps dropping ").unwrap();
        assert_eq!(pending.utterance, "My wifi keeps dropping");
        assert!(session.is_pending());

        let reply = rules.classify(&pending.utterance);
        assert!(session.resolve(pending.seq, reply));
        assert!(!session.is_pending());

        let originators: Vec<_> = session.messages().iter().map(|m| m.originator).collect();
        assert_eq!(originators, vec![Originator::Assistant, Originator::User, Originator::Assistant]);
    }

    #[test]
    fn test_second_submit_while_pending_is_refused() {
        let mut session = ChatSession::new();
        let first = session.submit("router").unwrap();
        assert!(session.submit("outage").is_none());
        assert_eq!(session.messages().len(), 2);

        assert!(session.resolve(first.seq, RuleSet::standard().classify("router")));
        assert!(session.submit("outage").is_some());
    }

    #[test]
    fn test_stale_reply_is_discarded() {
        let rules = RuleSet::standard();
        let mut session = ChatSession::new();
        let first = session.submit("slow").unwrap();
        session.reset();

        assert!(!session.resolve(first.seq, rules.classify("slow")));
        assert_eq!(session.messages().len(), 1);

        let second = session.submit("slow").unwrap();
        assert!(second.seq > first.seq);
        assert!(!session.resolve(first.seq, rules.classify("slow")));
        assert!(session.resolve(second.seq, rules.classify("slow")));
    }

    #[test]
    fn test_input_is_clamped() {
        let long = "é".repeat(MAX_INPUT_CHARS + 20);
        assert_eq!(clamp_input(&long).chars().count(), MAX_INPUT_CHARS);
        assert_eq!(clamp_input("short"), "short");

        let mut session = ChatSession::new();
        let pending = session.submit(&long).unwrap();
        assert_eq!(pending.utterance.chars().count(), MAX_INPUT_CHARS);
    }

    #[test]
    fn test_pending_action_after_technician_reply() {
        let mut session = ChatSession::new();
        let pending = session.submit("I need a technician to visit").unwrap();
        session.resolve(pending.seq, RuleSet::standard().classify(&pending.utterance));

        let action = session.pending_action().unwrap();
        assert_eq!(action.kind, ResponseKind::Actionable);
    }
}
