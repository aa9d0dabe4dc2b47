use concierge_core::errors::ToolError;
use concierge_core::tools::orders::parse_timestamp;
use concierge_core::tools::CancellationWindow;
use serde::{Deserialize, Serialize};

use crate::router::Intent;

/// Outcome of a guardrail rule, disclosed verbatim in the trace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PolicyDecision {
    Cancellation { cancel_allowed: bool, reason: Option<String> },
    Refusal { refuse: bool },
}

impl PolicyDecision {
    pub fn refusal() -> Self {
        Self::Refusal { refuse: true }
    }

    pub fn cancel_allowed(&self) -> Option<bool> {
        match self {
            Self::Cancellation { cancel_allowed, .. } => Some(*cancel_allowed),
            Self::Refusal { .. } => None,
        }
    }

    pub fn is_refusal(&self) -> bool {
        matches!(self, Self::Refusal { refuse: true })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GuardrailPolicy {
    cancel_window: CancellationWindow,
}

impl GuardrailPolicy {
    pub fn new(cancel_window: CancellationWindow) -> Self {
        Self { cancel_window }
    }

    pub fn cancel_window(&self) -> CancellationWindow {
        self.cancel_window
    }

    /// Decides whether an order created at `created_at` may still be cancelled.
    ///
    /// `now_override` is the authoritative request time. Without it the order's
    /// own creation time is used, so the elapsed time is zero and the window is
    /// open. Either timestamp failing to parse is an error, never a default.
    pub fn evaluate_cancellation(
        &self,
        created_at: &str,
        now_override: Option<&str>,
    ) -> Result<PolicyDecision, ToolError> {
        let created = parse_timestamp("created_at", created_at)?;
        let requested = match now_override {
            Some(now) => parse_timestamp("now", now)?,
            None => created,
        };

        let cancel_allowed = self.cancel_window.allows(requested - created);
        Ok(PolicyDecision::Cancellation {
            cancel_allowed,
            reason: (!cancel_allowed).then(|| self.window_reason()),
        })
    }

    /// Refuses requests to invent discount or coupon codes.
    ///
    /// Only applies to messages routed to `Intent::Other`; it runs before any
    /// tool is considered.
    pub fn evaluate_discount_request(&self, intent: Intent, message: &str) -> Option<PolicyDecision> {
        if intent != Intent::Other {
            return None;
        }

        let lowered = message.to_lowercase();
        let asks_for_code = lowered.contains("code") || lowered.contains("coupon");
        (lowered.contains("discount") && asks_for_code).then(PolicyDecision::refusal)
    }

    fn window_reason(&self) -> String {
        format!(">{} min", self.cancel_window.minutes())
    }
}
