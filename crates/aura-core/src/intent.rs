//! Keyword intent matching for the support assistant
//!
//! A [`RuleSet`] is an ordered list of keyword rules plus a fallback reply.
//! Matching is a lower-cased substring test and the first rule in declaration
//! order wins, no matter where its keyword sits in the utterance. The same
//! table is shared by the chat session and the mock API.

use serde::{Deserialize, Serialize};

pub const SLOW_RESPONSE: &str = "I see you're experiencing slow internet speeds. Let me help you with that. First, can you tell me what speed you're currently getting? You can run a speed test to check.";
pub const SPEED_RESPONSE: &str = "For speed issues, try these steps: 1) Restart your router by unplugging it for 30 seconds, 2) Move closer to your router, 3) Check if other devices are using bandwidth. What's your current speed?";
pub const CONNECTION_RESPONSE: &str = "Connection problems can be frustrating. Let's check: 1) Are all cables securely connected? 2) Is your router powered on? 3) Can you see your WiFi network in available networks?";
pub const WIFI_RESPONSE: &str = "WiFi issues are common. Try: 1) Forget and reconnect to your network, 2) Restart your device's WiFi, 3) Check if you're using the correct password. Are you able to see your network?";
pub const OUTAGE_RESPONSE: &str = "Let me check for any service outages in your area. Based on our current data, there are no reported outages. The issue might be with your local equipment.";
pub const ROUTER_RESPONSE: &str = "Router problems can often be fixed with a simple restart. Unplug your router for 30 seconds, then plug it back in. Wait 2-3 minutes for it to fully boot up. Does this help?";
pub const TECHNICIAN_RESPONSE: &str = "I can schedule a technician visit for you. Our next available slot is tomorrow between 2-4 PM. The technician will diagnose and fix any hardware issues. Would you like me to book this?";
pub const FALLBACK_RESPONSE: &str = "I understand your concern. Can you provide more details about the specific issue you're experiencing? For example, are you having trouble with speed, connectivity, or something else?";

/// Primary keywords in priority order.
const DEFAULT_RULES: &[(&str, &str, ResponseKind)] = &[
    ("slow", SLOW_RESPONSE, ResponseKind::Informational),
    ("speed", SPEED_RESPONSE, ResponseKind::Informational),
    ("connection", CONNECTION_RESPONSE, ResponseKind::Informational),
    ("wifi", WIFI_RESPONSE, ResponseKind::Informational),
    ("outage", OUTAGE_RESPONSE, ResponseKind::Informational),
    ("router", ROUTER_RESPONSE, ResponseKind::Informational),
    ("technician", TECHNICIAN_RESPONSE, ResponseKind::Actionable),
];

/// Synonym -> primary keyword. Appended after the primaries so they never
/// outrank one.
const SYNONYMS: &[(&str, &str)] = &[
    ("connect", "connection"),
    ("wireless", "wifi"),
    ("down", "outage"),
    ("modem", "router"),
    ("tech", "technician"),
    ("visit", "technician"),
];

/// What the consuming UI should do with a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    /// Plain text to show
    #[default]
    Informational,
    /// Text plus a follow-up offer (book a technician)
    Actionable,
}

impl ResponseKind {
    pub fn is_actionable(&self) -> bool {
        matches!(self, ResponseKind::Actionable)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntentRule {
    pub keyword: String,
    pub response: String,
    #[serde(default)]
    pub kind: ResponseKind,
}

impl IntentRule {
    pub fn new(keyword: &str, response: &str, kind: ResponseKind) -> Self {
        Self {
            keyword: keyword.to_lowercase(),
            response: response.to_string(),
            kind,
        }
    }
}

/// A classified reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub text: String,
    pub kind: ResponseKind,
}

#[derive(Deserialize)]
struct RuleSetDef {
    rules: Vec<IntentRule>,
    #[serde(default = "default_fallback")]
    fallback: String,
}

fn default_fallback() -> String {
    FALLBACK_RESPONSE.to_string()
}

/// Ordered keyword table with a fallback reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RuleSetDef")]
pub struct RuleSet {
    rules: Vec<IntentRule>,
    fallback: String,
}

impl From<RuleSetDef> for RuleSet {
    fn from(def: RuleSetDef) -> Self {
        RuleSet::new(def.rules, def.fallback)
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

impl RuleSet {
    /// Build a table from rules in priority order.
    ///
    /// Keywords are lower-cased so custom tables stay case-insensitive, and
    /// empty keywords are dropped since they would match every utterance.
    pub fn new(rules: Vec<IntentRule>, fallback: impl Into<String>) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| IntentRule {
                keyword: rule.keyword.to_lowercase(),
                ..rule
            })
            .filter(|rule| !rule.keyword.is_empty())
            .collect();

        Self {
            rules,
            fallback: fallback.into(),
        }
    }

    /// The seven support keywords and the stock fallback
    pub fn standard() -> Self {
        let rules = DEFAULT_RULES
            .iter()
            .map(|(keyword, response, kind)| IntentRule::new(keyword, response, *kind))
            .collect();
        Self::new(rules, FALLBACK_RESPONSE)
    }

    /// [`RuleSet::standard`] followed by synonym rules (`connect`,
    /// `wireless`, `down`, `modem`, `tech`, `visit`), each answering with its
    /// primary keyword's response and kind.
    pub fn extended() -> Self {
        let mut set = Self::standard();
        let synonyms: Vec<IntentRule> = SYNONYMS
            .iter()
            .filter_map(|(synonym, primary)| {
                set.rules
                    .iter()
                    .find(|rule| rule.keyword == *primary)
                    .map(|rule| IntentRule::new(synonym, &rule.response, rule.kind))
            })
            .collect();
        set.rules.extend(synonyms);
        set
    }

    pub fn rules(&self) -> &[IntentRule] {
        &self.rules
    }

    pub fn fallback(&self) -> &str {
        &self.fallback
    }

    /// First rule whose keyword occurs anywhere in the utterance
    pub fn matching_rule(&self, utterance: &str) -> Option<&IntentRule> {
        let normalized = utterance.to_lowercase();
        self.rules
            .iter()
            .find(|rule| normalized.contains(rule.keyword.as_str()))
    }

    /// Classify an utterance. Never fails: anything unmatched, including the
    /// empty string, gets the fallback.
    pub fn classify(&self, utterance: &str) -> Response {
        match self.matching_rule(utterance) {
            Some(rule) => {
                tracing::debug!(keyword = %rule.keyword, kind = ?rule.kind, "intent matched");
                Response {
                    text: rule.response.clone(),
                    kind: rule.kind,
                }
            }
            None => {
                tracing::debug!("no intent matched, using fallback");
                Response {
                    text: self.fallback.clone(),
                    kind: ResponseKind::Informational,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> Response {
        RuleSet::standard().classify(text)
    }

    #[test]
    fn test_unmatched_utterance_gets_fallback() {
        let response = classify("my phone bill looks odd");
        assert_eq!(response.text, FALLBACK_RESPONSE);
        assert_eq!(response.kind, ResponseKind::Informational);
    }

    #[test]
    fn test_empty_utterance_gets_fallback() {
        assert_eq!(classify("").text, FALLBACK_RESPONSE);
    }

    #[test]
    fn test_single_keywords_return_their_response() {
        let cases = [
            ("it is so slow today", SLOW_RESPONSE),
            ("what speed do I pay for", SPEED_RESPONSE),
            ("lost my connection", CONNECTION_RESPONSE),
            ("My wifi keeps dropping", WIFI_RESPONSE),
            ("is there an outage", OUTAGE_RESPONSE),
            ("the router lights blink", ROUTER_RESPONSE),
            ("I need a technician to visit", TECHNICIAN_RESPONSE),
        ];
        for (input, expected) in cases {
            assert_eq!(classify(input).text, expected, "input: {input}");
        }
    }

    #[test]
    fn test_priority_follows_table_not_text() {
        let response = classify("the technician said it would not be slow");
        assert_eq!(response.text, SLOW_RESPONSE);
        assert_eq!(response.kind, ResponseKind::Informational);

        // "speed" appears first in the text but "slow" outranks it
        assert_eq!(classify("speed is slow").text, SLOW_RESPONSE);
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(classify("SLOW internet"), classify("slow internet"));
        assert_eq!(classify("WiFi").text, WIFI_RESPONSE);
    }

    #[test]
    fn test_substring_matching() {
        assert_eq!(classify("any outages nearby?").text, OUTAGE_RESPONSE);
        assert_eq!(classify("I forgot my password").text, FALLBACK_RESPONSE);
        assert_eq!(classify("slowly loading").text, SLOW_RESPONSE);
    }

    #[test]
    fn test_only_technician_is_actionable() {
        let set = RuleSet::standard();
        for rule in set.rules() {
            assert_eq!(rule.kind.is_actionable(), rule.keyword == "technician");
        }
        assert_eq!(classify("send a technician").kind, ResponseKind::Actionable);
    }

    #[test]
    fn test_extended_synonyms_follow_primaries() {
        let set = RuleSet::extended();
        assert_eq!(set.rules().len(), 13);
        assert_eq!(set.rules()[6].keyword, "technician");

        assert_eq!(set.classify("can someone visit").kind, ResponseKind::Actionable);
        assert_eq!(set.classify("my modem").text, ROUTER_RESPONSE);
        assert_eq!(set.classify("wireless keeps failing").text, WIFI_RESPONSE);
        // primary still wins over a synonym that appears earlier in the text
        assert_eq!(set.classify("down and slow").text, SLOW_RESPONSE);
        // standard table leaves synonyms alone
        assert_eq!(RuleSet::standard().classify("my modem").text, FALLBACK_RESPONSE);
    }

    #[test]
    fn test_custom_rules_are_normalized() {
        let set = RuleSet::new(
            vec![
                IntentRule {
                    keyword: "BILL".to_string(),
                    response: "Billing help".to_string(),
                    kind: ResponseKind::Informational,
                },
                IntentRule {
                    keyword: String::new(),
                    response: "never".to_string(),
                    kind: ResponseKind::Actionable,
                },
            ],
            "Sorry?",
        );
        assert_eq!(set.rules().len(), 1);
        assert_eq!(set.classify("my bill").text, "Billing help");
        assert_eq!(set.classify("hello").text, "Sorry?");
    }

    #[test]
    fn test_rule_set_from_json() {
        let json = r#"{"rules":[{"keyword":"Fiber","response":"Fiber info"},{"keyword":"book","response":"Booking","kind":"actionable"}]}"#;
        let set: RuleSet = serde_json::from_str(json).unwrap();
        assert_eq!(set.fallback(), FALLBACK_RESPONSE);
        assert_eq!(set.classify("FIBER install").text, "Fiber info");
        assert_eq!(set.classify("book it").kind, ResponseKind::Actionable);
    }
}
