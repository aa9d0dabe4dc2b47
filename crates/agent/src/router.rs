use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    OrderHelp,
    ProductAssist,
    Other,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OrderHelp => "order_help",
            Self::ProductAssist => "product_assist",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const ORDER_KEYWORDS: &[&str] = &["order", "cancel", "order id", "email@"];
const PRODUCT_KEYWORDS: &[&str] = &["dress", "midi", "wedding", "size", "eta", "zip", "between"];

struct RoutingRule {
    intent: Intent,
    matches: fn(&str) -> bool,
}

/// Evaluated top to bottom; the first rule that matches decides the intent.
const ROUTING_RULES: &[RoutingRule] = &[
    RoutingRule { intent: Intent::OrderHelp, matches: mentions_order },
    RoutingRule { intent: Intent::ProductAssist, matches: mentions_product },
];

/// Classifies a raw message by keyword containment over its lowercased text.
pub fn classify(message: &str) -> Intent {
    let lowered = message.to_lowercase();
    ROUTING_RULES
        .iter()
        .find(|rule| (rule.matches)(&lowered))
        .map(|rule| rule.intent)
        .unwrap_or(Intent::Other)
}

fn mentions_order(lowered: &str) -> bool {
    contains_any(lowered, ORDER_KEYWORDS)
        || (lowered.contains("cancel") && lowered.contains("order"))
}

fn mentions_product(lowered: &str) -> bool {
    contains_any(lowered, PRODUCT_KEYWORDS)
}

fn contains_any(lowered: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| lowered.contains(keyword))
}
