use std::collections::BTreeSet;
use std::sync::Arc;

use concierge_core::config::{AppConfig, PolicyConfig};
use concierge_core::errors::{ApplicationError, FixtureError, ToolError};
use concierge_core::fixtures::FixtureStore;
use concierge_core::tools::{FixtureToolbox, SizeRequest, Toolbox};
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::conversation::FieldExtractor;
use crate::guardrails::{GuardrailPolicy, PolicyDecision};
use crate::response::ResponseComposer;
use crate::router::{classify, Intent};
use crate::tools::ToolGateway;
use crate::trace::{Evidence, Trace};

const MAX_PICKS: usize = 2;
const BETWEEN_SIZES: &str = "M/L";

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error(transparent)]
    Fixture(#[from] FixtureError),
    #[error("trace serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<AgentError> for ApplicationError {
    fn from(value: AgentError) -> Self {
        match value {
            AgentError::Tool(error) => Self::Tool(error),
            AgentError::Fixture(error) => Self::Fixture(error),
            AgentError::Serialization(error) => Self::Serialization(error.to_string()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AgentReply {
    pub trace: Trace,
    pub final_message: String,
}

impl AgentReply {
    pub fn trace_json(&self) -> Result<String, serde_json::Error> {
        self.trace.to_json()
    }
}

/// Routes a message, runs exactly one intent pipeline and returns the trace.
pub struct AgentRuntime<T = FixtureToolbox> {
    toolbox: T,
    guardrails: GuardrailPolicy,
    extractor: FieldExtractor,
    composer: ResponseComposer,
}

impl AgentRuntime<FixtureToolbox> {
    pub fn from_config(config: &AppConfig) -> Result<Self, AgentError> {
        let store = FixtureStore::load(&config.fixtures)?;
        let toolbox = FixtureToolbox::new(Arc::new(store), config.policy.cancel_window());
        Ok(Self::new(toolbox, &config.policy))
    }

    pub fn with_embedded_fixtures() -> Result<Self, AgentError> {
        let policy = PolicyConfig::default();
        let store = FixtureStore::embedded()?;
        let toolbox = FixtureToolbox::new(Arc::new(store), policy.cancel_window());
        Ok(Self::new(toolbox, &policy))
    }
}

impl<T> AgentRuntime<T>
where
    T: Toolbox,
{
    pub fn new(toolbox: T, policy: &PolicyConfig) -> Self {
        let window = policy.cancel_window();
        Self {
            toolbox,
            guardrails: GuardrailPolicy::new(window),
            extractor: FieldExtractor::new(policy.default_price_cap),
            composer: ResponseComposer::new(window),
        }
    }

    pub fn toolbox(&self) -> &T {
        &self.toolbox
    }

    /// Handles one message. `now_override` is the reference time for order
    /// cancellation; nothing reads the system clock.
    pub fn run(&self, message: &str, now_override: Option<&str>) -> Result<AgentReply, AgentError> {
        let correlation_id = Uuid::new_v4().to_string();
        info!(
            event_name = "agent.run.started",
            correlation_id = %correlation_id,
            message_chars = message.chars().count(),
            has_now_override = now_override.is_some(),
            "agent run started"
        );

        let intent = classify(message);
        debug!(
            event_name = "agent.route.classified",
            correlation_id = %correlation_id,
            intent = intent.as_str(),
            "message routed"
        );

        let mut gateway = ToolGateway::new(&self.toolbox, &correlation_id);
        let outcome = match intent {
            Intent::ProductAssist => self.assist_with_products(&mut gateway, message),
            Intent::OrderHelp => self.help_with_order(&mut gateway, message, now_override)?,
            Intent::Other => self.handle_other(message),
        };

        if let Some(decision) = outcome.policy_decision.as_ref() {
            info!(
                event_name = "agent.policy.decided",
                correlation_id = %correlation_id,
                intent = intent.as_str(),
                cancel_allowed = ?decision.cancel_allowed(),
                refused = decision.is_refusal(),
                "policy rule applied"
            );
        }

        let trace = Trace {
            intent,
            tools_called: gateway.into_calls(),
            evidence: outcome.evidence,
            policy_decision: outcome.policy_decision,
            final_message: outcome.final_message.clone(),
        };
        info!(
            event_name = "agent.run.completed",
            correlation_id = %correlation_id,
            intent = intent.as_str(),
            tool_calls = trace.tools_called.len(),
            evidence = trace.evidence.len(),
            "agent run completed"
        );

        Ok(AgentReply { trace, final_message: outcome.final_message })
    }

    /// Same as [`AgentRuntime::run`], with the trace already serialized.
    pub fn run_agent(
        &self,
        message: &str,
        now_override: Option<&str>,
    ) -> Result<(String, String), AgentError> {
        let reply = self.run(message, now_override)?;
        let trace_json = reply.trace_json()?;
        Ok((trace_json, reply.final_message))
    }

    fn assist_with_products(&self, gateway: &mut ToolGateway<'_, T>, message: &str) -> Outcome {
        let request = self.extractor.extract_product_request(message);

        let mut picks = gateway.product_search(&request.query, request.price_cap, &request.tags);
        picks.truncate(MAX_PICKS);

        let available_sizes = picks
            .iter()
            .flat_map(|product| product.sizes.iter().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let size_advice = gateway.size_recommender(&SizeRequest {
            between: if request.between_sizes { BETWEEN_SIZES.to_string() } else { String::new() },
            available_sizes,
        });
        let eta = gateway.eta(&request.zip_code);

        Outcome {
            evidence: picks.iter().map(Evidence::from).collect(),
            policy_decision: None,
            final_message: self.composer.product_options(
                &picks,
                &size_advice,
                &request.zip_code,
                eta,
            ),
        }
    }

    fn help_with_order(
        &self,
        gateway: &mut ToolGateway<'_, T>,
        message: &str,
        now_override: Option<&str>,
    ) -> Result<Outcome, AgentError> {
        let request = self.extractor.extract_order_request(message);
        let Some((order_id, email)) = request.credentials() else {
            return Ok(Outcome::message(self.composer.missing_order_fields()));
        };

        let Some(order) = gateway.order_lookup(order_id, email) else {
            return Ok(Outcome::message(self.composer.order_not_found()));
        };

        let cancellation = gateway.order_cancel(order_id, &order.created_at, now_override)?;
        let decision = self.guardrails.evaluate_cancellation(&order.created_at, now_override)?;
        let allowed = decision.cancel_allowed().unwrap_or(false);
        if cancellation.cancelled != allowed {
            warn!(
                event_name = "agent.policy.mismatch",
                correlation_id = gateway.correlation_id(),
                order_id = %order.order_id,
                tool_cancelled = cancellation.cancelled,
                policy_allowed = allowed,
                "order_cancel disagrees with the cancellation policy; using the policy decision"
            );
        }

        let final_message = if allowed {
            self.composer.cancellation_confirmed(&order.order_id)
        } else {
            self.composer.cancellation_blocked()
        };
        Ok(Outcome {
            evidence: vec![Evidence::from(&order)],
            policy_decision: Some(decision),
            final_message,
        })
    }

    fn handle_other(&self, message: &str) -> Outcome {
        match self.guardrails.evaluate_discount_request(Intent::Other, message) {
            Some(decision) => Outcome {
                evidence: Vec::new(),
                policy_decision: Some(decision),
                final_message: self.composer.discount_refusal(),
            },
            None => Outcome::message(self.composer.capabilities()),
        }
    }
}

struct Outcome {
    evidence: Vec<Evidence>,
    policy_decision: Option<PolicyDecision>,
    final_message: String,
}

impl Outcome {
    fn message(final_message: String) -> Self {
        Self { evidence: Vec::new(), policy_decision: None, final_message }
    }
}

/// Runs one message against the embedded reference fixtures with the default
/// policy and returns `(trace_json, final_message)`.
pub fn run_agent(
    user_message: &str,
    now_override: Option<&str>,
) -> Result<(String, String), AgentError> {
    AgentRuntime::with_embedded_fixtures()?.run_agent(user_message, now_override)
}
