use std::env;
use std::fs;
use std::sync::{Mutex, OnceLock};

use concierge_cli::commands::ask::{self, AskArgs};
use concierge_cli::commands::{config, scenarios};
use concierge_core::config::LoadOptions;
use serde_json::Value;

const NOW: &str = "2025-09-07T12:30:00Z";

#[test]
fn ask_prints_trace_then_reply() {
    with_env(&[], || {
        let result = ask::run(
            &LoadOptions::default(),
            &ask_args("Cancel order A1003 — email mira@example.com.", Some(NOW), false),
        );
        assert_eq!(result.exit_code, 0, "expected successful ask");

        let (trace_json, reply) =
            result.output.split_once("\n\n").expect("trace and reply are separated");
        let trace = parse_payload(trace_json);
        assert_eq!(trace["intent"], "order_help");
        assert_eq!(trace["policy_decision"]["cancel_allowed"], true);
        assert_eq!(reply, "Cancellation complete for A1003. A confirmation email will follow.");
    });
}

#[test]
fn ask_json_prints_only_the_trace() {
    with_env(&[], || {
        let result = ask::run(
            &LoadOptions::default(),
            &ask_args("Can you give me a discount code that doesn’t exist?", None, true),
        );
        assert_eq!(result.exit_code, 0, "expected successful ask");

        let trace = parse_payload(&result.output);
        assert_eq!(trace["intent"], "other");
        assert_eq!(trace["tools_called"], Value::Array(Vec::new()));
        assert_eq!(trace["policy_decision"]["refuse"], true);
    });
}

#[test]
fn ask_reports_bad_timestamp_politely() {
    with_env(&[], || {
        let result = ask::run(
            &LoadOptions::default(),
            &ask_args("Cancel order A1003 — email mira@example.com.", Some("half past noon"), false),
        );
        assert_eq!(result.exit_code, 3, "expected bad request code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "ask");
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "bad_request");
        let message = payload["message"].as_str().unwrap_or_default();
        assert!(message.starts_with("Sorry"));
        assert!(!message.contains("half past noon"));
        assert!(payload["correlation_id"].as_str().is_some());
    });
}

#[test]
fn ask_fails_config_validation_for_bad_window() {
    with_env(&[("CONCIERGE_POLICY_CANCEL_WINDOW_SECS", "-5")], || {
        let result = ask::run(&LoadOptions::default(), &ask_args("hello", None, false));
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn ask_reports_missing_fixture_file_as_unavailable() {
    with_env(&[("CONCIERGE_FIXTURES_ORDERS_PATH", "/nonexistent/concierge/orders.json")], || {
        let result = ask::run(&LoadOptions::default(), &ask_args("hello", None, false));
        assert_eq!(result.exit_code, 4, "expected service unavailable code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["error_class"], "service_unavailable");
    });
}

#[test]
fn scenarios_pass_at_reference_time() {
    with_env(&[], || {
        let result = scenarios::run(&LoadOptions::default(), scenarios::REFERENCE_NOW);
        assert_eq!(result.exit_code, 0, "expected all scenarios to pass: {}", result.output);

        let payload = parse_payload(last_line(&result.output));
        assert_eq!(payload["command"], "scenarios");
        assert_eq!(payload["status"], "pass");
        assert_eq!(payload["checks"].as_array().map(Vec::len), Some(4));
        assert!(result.output.contains("ETA to 120560: 3–6 days"));
    });
}

#[test]
fn scenarios_fail_when_allowed_cancel_is_too_late() {
    with_env(&[], || {
        let result = scenarios::run(&LoadOptions::default(), "2025-09-07T14:00:00Z");
        assert_eq!(result.exit_code, 6, "expected scenario failure code");

        let payload = parse_payload(last_line(&result.output));
        assert_eq!(payload["status"], "fail");
        let failed = payload["checks"]
            .as_array()
            .map(|checks| {
                checks
                    .iter()
                    .filter(|check| check["status"] == "fail")
                    .filter_map(|check| check["name"].as_str())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        assert_eq!(failed, vec!["order_help_allowed"]);
    });
}

#[test]
fn config_attributes_env_file_and_default_sources() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("concierge.toml");
    fs::write(&path, "[policy]\ncancel_window_secs = 1800\n").expect("write config");

    with_env(&[("CONCIERGE_LOG_LEVEL", "debug")], || {
        let options = LoadOptions { config_path: Some(path.clone()), ..LoadOptions::default() };
        let output = config::run(&options);

        assert!(output.contains(&format!(
            "- policy.cancel_window_secs = 1800 (source: file ({}))",
            path.display()
        )));
        assert!(output.contains("- logging.level = debug (source: env (CONCIERGE_LOG_LEVEL))"));
        assert!(output.contains("- fixtures.products_path = <embedded> (source: default)"));
        assert!(output.contains("- policy.default_price_cap = 120 (source: default)"));
    });
}

fn ask_args(message: &str, now: Option<&str>, trace_only: bool) -> AskArgs {
    AskArgs { message: message.to_string(), now: now.map(str::to_string), trace_only }
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn last_line(output: &str) -> &str {
    output.lines().last().unwrap_or_default()
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "CONCIERGE_FIXTURES_PRODUCTS_PATH",
        "CONCIERGE_FIXTURES_ORDERS_PATH",
        "CONCIERGE_POLICY_CANCEL_WINDOW_SECS",
        "CONCIERGE_POLICY_DEFAULT_PRICE_CAP",
        "CONCIERGE_LOGGING_LEVEL",
        "CONCIERGE_LOGGING_FORMAT",
        "CONCIERGE_LOG_LEVEL",
        "CONCIERGE_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
