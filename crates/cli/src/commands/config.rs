use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use concierge_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

const EMBEDDED: &str = "<embedded>";

struct Field {
    key_path: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

pub fn run(options: &LoadOptions) -> String {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(options.config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let fields = [
        Field {
            key_path: "fixtures.products_path",
            env_keys: &["CONCIERGE_FIXTURES_PRODUCTS_PATH"],
            value: display_path(config.fixtures.products_path.as_ref()),
        },
        Field {
            key_path: "fixtures.orders_path",
            env_keys: &["CONCIERGE_FIXTURES_ORDERS_PATH"],
            value: display_path(config.fixtures.orders_path.as_ref()),
        },
        Field {
            key_path: "policy.cancel_window_secs",
            env_keys: &["CONCIERGE_POLICY_CANCEL_WINDOW_SECS"],
            value: config.policy.cancel_window_secs.to_string(),
        },
        Field {
            key_path: "policy.default_price_cap",
            env_keys: &["CONCIERGE_POLICY_DEFAULT_PRICE_CAP"],
            value: config.policy.default_price_cap.to_string(),
        },
        Field {
            key_path: "logging.level",
            env_keys: &["CONCIERGE_LOGGING_LEVEL", "CONCIERGE_LOG_LEVEL"],
            value: config.logging.level.clone(),
        },
        Field {
            key_path: "logging.format",
            env_keys: &["CONCIERGE_LOGGING_FORMAT", "CONCIERGE_LOG_FORMAT"],
            value: format!("{:?}", config.logging.format),
        },
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    lines.extend(fields.iter().map(|field| {
        render_line(
            field.key_path,
            &field.value,
            field_source(
                field.key_path,
                field.env_keys,
                config_file_doc.as_ref(),
                config_file_path.as_deref(),
            ),
        )
    }));

    lines.join("\n")
}

fn display_path(path: Option<&PathBuf>) -> String {
    path.map(|path| path.display().to_string()).unwrap_or_else(|| EMBEDDED.to_string())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}
