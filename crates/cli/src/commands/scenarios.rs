use std::time::Instant;

use anyhow::{Context, Result};
use concierge_agent::guardrails::PolicyDecision;
use concierge_agent::router::Intent;
use concierge_agent::tools::ToolName;
use concierge_agent::{AgentReply, AgentRuntime};
use concierge_core::config::{AppConfig, LoadOptions};
use serde::Serialize;
use tracing::{info, warn};

use crate::commands::CommandResult;
use crate::logging::init_logging;

pub const REFERENCE_NOW: &str = "2025-09-07T12:30:00Z";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ExpectedPolicy {
    Absent,
    CancelAllowed,
    CancelBlocked,
    Refused,
}

impl ExpectedPolicy {
    fn matches(self, decision: Option<&PolicyDecision>) -> bool {
        match (self, decision) {
            (Self::Absent, None) => true,
            (Self::CancelAllowed, Some(decision)) => decision.cancel_allowed() == Some(true),
            (Self::CancelBlocked, Some(decision)) => decision.cancel_allowed() == Some(false),
            (Self::Refused, Some(decision)) => decision.is_refusal(),
            _ => false,
        }
    }
}

struct Scenario {
    name: &'static str,
    message: &'static str,
    intent: Intent,
    tools: &'static [ToolName],
    policy: ExpectedPolicy,
}

const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "product_assist",
        message: "Wedding guest, midi, under $120 — I’m between M/L. ETA to 560001?",
        intent: Intent::ProductAssist,
        tools: &[ToolName::ProductSearch, ToolName::SizeRecommender, ToolName::Eta],
        policy: ExpectedPolicy::Absent,
    },
    Scenario {
        name: "order_help_allowed",
        message: "Cancel order A1003 — email mira@example.com.",
        intent: Intent::OrderHelp,
        tools: &[ToolName::OrderLookup, ToolName::OrderCancel],
        policy: ExpectedPolicy::CancelAllowed,
    },
    Scenario {
        name: "order_help_blocked",
        message: "Cancel order A1002 — email alex@example.com.",
        intent: Intent::OrderHelp,
        tools: &[ToolName::OrderLookup, ToolName::OrderCancel],
        policy: ExpectedPolicy::CancelBlocked,
    },
    Scenario {
        name: "guardrail",
        message: "Can you give me a discount code that doesn’t exist?",
        intent: Intent::Other,
        tools: &[],
        policy: ExpectedPolicy::Refused,
    },
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum ScenarioStatus {
    Pass,
    Fail,
}

#[derive(Debug, Serialize)]
struct ScenarioCheck {
    name: &'static str,
    status: ScenarioStatus,
    elapsed_ms: u64,
    message: String,
}

#[derive(Debug, Serialize)]
struct ScenarioReport {
    command: &'static str,
    status: ScenarioStatus,
    now: String,
    summary: String,
    total_elapsed_ms: u64,
    checks: Vec<ScenarioCheck>,
}

pub fn run(options: &LoadOptions, now: &str) -> CommandResult {
    let started = Instant::now();
    let runtime = match load_runtime(options) {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure("scenarios", "startup", format!("{error:#}"), 2);
        }
    };

    let mut transcript = Vec::with_capacity(SCENARIOS.len());
    let mut checks = Vec::with_capacity(SCENARIOS.len());
    for scenario in SCENARIOS {
        let scenario_started = Instant::now();
        let outcome = runtime
            .run(scenario.message, Some(now))
            .with_context(|| format!("scenario `{}` failed to run", scenario.name))
            .and_then(|reply| {
                let trace_json = reply.trace_json().context("trace serialization failed")?;
                Ok((reply, trace_json))
            });

        let (status, message) = match outcome {
            Ok((reply, trace_json)) => {
                transcript.push(format!("{}\n{trace_json}\n\n{}", scenario.name, reply.final_message));
                match mismatch(scenario, &reply) {
                    None => (ScenarioStatus::Pass, "trace matches expectations".to_string()),
                    Some(detail) => (ScenarioStatus::Fail, detail),
                }
            }
            Err(error) => (ScenarioStatus::Fail, format!("{error:#}")),
        };

        if status == ScenarioStatus::Fail {
            warn!(event_name = "cli.scenario.failed", scenario = scenario.name, detail = %message);
        }
        checks.push(ScenarioCheck {
            name: scenario.name,
            status,
            elapsed_ms: scenario_started.elapsed().as_millis() as u64,
            message,
        });
    }

    finalize_report(transcript, checks, now, started.elapsed().as_millis() as u64)
}

fn load_runtime(options: &LoadOptions) -> Result<AgentRuntime> {
    let config = AppConfig::load(options.clone()).context("config validation failed")?;
    init_logging(&config.logging);
    AgentRuntime::from_config(&config).context("fixtures failed to load")
}

fn mismatch(scenario: &Scenario, reply: &AgentReply) -> Option<String> {
    let trace = &reply.trace;
    if trace.intent != scenario.intent {
        return Some(format!("expected intent {}, got {}", scenario.intent, trace.intent));
    }
    if trace.tools_called.as_slice() != scenario.tools {
        return Some(format!(
            "expected tools {:?}, got {:?}",
            names(scenario.tools),
            names(&trace.tools_called)
        ));
    }
    if !scenario.policy.matches(trace.policy_decision.as_ref()) {
        return Some(format!(
            "expected policy {:?}, got {:?}",
            scenario.policy, trace.policy_decision
        ));
    }
    None
}

fn names(tools: &[ToolName]) -> Vec<&'static str> {
    tools.iter().map(ToolName::as_str).collect()
}

fn finalize_report(
    transcript: Vec<String>,
    checks: Vec<ScenarioCheck>,
    now: &str,
    total_elapsed_ms: u64,
) -> CommandResult {
    let passed = checks.iter().filter(|check| check.status == ScenarioStatus::Pass).count();
    let total = checks.len();
    let failed = passed != total;

    let report = ScenarioReport {
        command: "scenarios",
        status: if failed { ScenarioStatus::Fail } else { ScenarioStatus::Pass },
        now: now.to_string(),
        summary: format!("scenarios: {passed}/{total} passed in {total_elapsed_ms}ms"),
        total_elapsed_ms,
        checks,
    };
    info!(event_name = "cli.scenarios.completed", passed, total, "scenario replay finished");

    let separator = format!("\n{}\n", "=".repeat(60));
    let human = format!("{}{separator}{}", transcript.join(&separator), report.summary);
    let machine = serde_json::to_string(&report).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"scenarios\",\"status\":\"fail\",\"summary\":\"serialization failed\",\"error\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    });

    CommandResult { exit_code: if failed { 6 } else { 0 }, output: format!("{human}\n{machine}") }
}
