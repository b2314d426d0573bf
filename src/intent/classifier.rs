//! Intent Classifier
//!
//! Scores an utterance against an ordered rule table. The first matching rule
//! wins, so rule order is the tie-break policy: reordering `INTENT_RULES` is a
//! behavior change.

use crate::lexicon::{
    self, normalize, ACCESS_DENIED_PHRASES, COMPARISON_KEYWORDS, GREETING_PHRASES, HELP_PHRASES,
    INDICATOR_SYNONYMS, PAIRED_COMPARISONS,
};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentCategory {
    Conversation,
    Analytics,
    OffTopic,
    UnauthorizedAnalytics,
}

impl IntentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentCategory::Conversation => "conversation",
            IntentCategory::Analytics => "analytics",
            IntentCategory::OffTopic => "off_topic",
            IntentCategory::UnauthorizedAnalytics => "unauthorized_analytics",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationKind {
    Greeting,
    Help,
    General,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntentResult {
    pub category: IntentCategory,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_kind: Option<ConversationKind>,
    /// Name of the rule that decided the category.
    pub rule: &'static str,
    /// Rule group rank; lower ranks take priority.
    pub priority: u8,
}

/// One row of the classification table.
pub struct IntentRule {
    pub name: &'static str,
    pub priority: u8,
    pub matches: fn(&str) -> bool,
    pub category: IntentCategory,
    pub conversation_kind: Option<ConversationKind>,
}

fn access_denied(n: &str) -> bool {
    ACCESS_DENIED_PHRASES.matches(n)
}

fn off_topic(n: &str) -> bool {
    !n.is_empty() && !lexicon::has_domain_term(n) && !greeting(n) && !help(n)
}

fn indicator_keyword(n: &str) -> bool {
    INDICATOR_SYNONYMS.matches(n)
}

fn comparison_keyword(n: &str) -> bool {
    COMPARISON_KEYWORDS.matches(n) || PAIRED_COMPARISONS.matches(n)
}

fn greeting(n: &str) -> bool {
    GREETING_PHRASES.matches(n)
}

fn help(n: &str) -> bool {
    HELP_PHRASES.matches(n)
}

lazy_static! {
    static ref INTENT_RULES: Vec<IntentRule> = vec![
        IntentRule {
            name: "access_denied_phrase",
            priority: 1,
            matches: access_denied,
            category: IntentCategory::UnauthorizedAnalytics,
            conversation_kind: None,
        },
        IntentRule {
            name: "off_topic",
            priority: 2,
            matches: off_topic,
            category: IntentCategory::OffTopic,
            conversation_kind: None,
        },
        IntentRule {
            name: "indicator_keyword",
            priority: 3,
            matches: indicator_keyword,
            category: IntentCategory::Analytics,
            conversation_kind: None,
        },
        IntentRule {
            name: "comparison_keyword",
            priority: 3,
            matches: comparison_keyword,
            category: IntentCategory::Analytics,
            conversation_kind: None,
        },
        IntentRule {
            name: "greeting",
            priority: 4,
            matches: greeting,
            category: IntentCategory::Conversation,
            conversation_kind: Some(ConversationKind::Greeting),
        },
        IntentRule {
            name: "help",
            priority: 4,
            matches: help,
            category: IntentCategory::Conversation,
            conversation_kind: Some(ConversationKind::Help),
        },
    ];
}

const DEFAULT_RULE: &str = "default_conversation";
const DEFAULT_PRIORITY: u8 = 4;

/// Rule-table intent classifier. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, utterance: &str) -> IntentResult {
        let normalized = normalize(utterance);
        INTENT_RULES
            .iter()
            .find(|rule| (rule.matches)(&normalized))
            .map(|rule| IntentResult {
                category: rule.category,
                conversation_kind: rule.conversation_kind,
                rule: rule.name,
                priority: rule.priority,
            })
            .unwrap_or(IntentResult {
                category: IntentCategory::Conversation,
                conversation_kind: Some(ConversationKind::General),
                rule: DEFAULT_RULE,
                priority: DEFAULT_PRIORITY,
            })
    }

    /// Rule names in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        INTENT_RULES.iter().map(|rule| rule.name).collect()
    }
}
