use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tools::orders::DEFAULT_CANCEL_WINDOW_SECS;
use crate::tools::CancellationWindow;

pub const DEFAULT_PRICE_CAP: f64 = 120.0;

#[derive(Clone, Debug, PartialEq)]
pub struct AppConfig {
    pub fixtures: FixturesConfig,
    pub policy: PolicyConfig,
    pub logging: LoggingConfig,
}

/// Fixture files on disk. An unset path means the embedded reference data.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FixturesConfig {
    pub products_path: Option<PathBuf>,
    pub orders_path: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PolicyConfig {
    pub cancel_window_secs: i64,
    /// Cap applied when a shopper says "under" without naming an amount.
    pub default_price_cap: f64,
}

impl PolicyConfig {
    pub fn cancel_window(&self) -> CancellationWindow {
        CancellationWindow::from_secs(self.cancel_window_secs)
    }
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self { cancel_window_secs: DEFAULT_CANCEL_WINDOW_SECS, default_price_cap: DEFAULT_PRICE_CAP }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub products_path: Option<PathBuf>,
    pub orders_path: Option<PathBuf>,
    pub cancel_window_secs: Option<i64>,
    pub default_price_cap: Option<f64>,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            fixtures: FixturesConfig::default(),
            policy: PolicyConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("concierge.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(fixtures) = patch.fixtures {
            if let Some(products_path) = fixtures.products_path {
                self.fixtures.products_path = Some(products_path);
            }
            if let Some(orders_path) = fixtures.orders_path {
                self.fixtures.orders_path = Some(orders_path);
            }
        }

        if let Some(policy) = patch.policy {
            if let Some(cancel_window_secs) = policy.cancel_window_secs {
                self.policy.cancel_window_secs = cancel_window_secs;
            }
            if let Some(default_price_cap) = policy.default_price_cap {
                self.policy.default_price_cap = default_price_cap;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("CONCIERGE_FIXTURES_PRODUCTS_PATH") {
            self.fixtures.products_path = Some(PathBuf::from(value));
        }
        if let Some(value) = read_env("CONCIERGE_FIXTURES_ORDERS_PATH") {
            self.fixtures.orders_path = Some(PathBuf::from(value));
        }

        if let Some(value) = read_env("CONCIERGE_POLICY_CANCEL_WINDOW_SECS") {
            self.policy.cancel_window_secs =
                parse_i64("CONCIERGE_POLICY_CANCEL_WINDOW_SECS", &value)?;
        }
        if let Some(value) = read_env("CONCIERGE_POLICY_DEFAULT_PRICE_CAP") {
            self.policy.default_price_cap =
                parse_f64("CONCIERGE_POLICY_DEFAULT_PRICE_CAP", &value)?;
        }

        let log_level =
            read_env("CONCIERGE_LOGGING_LEVEL").or_else(|| read_env("CONCIERGE_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("CONCIERGE_LOGGING_FORMAT").or_else(|| read_env("CONCIERGE_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(products_path) = overrides.products_path {
            self.fixtures.products_path = Some(products_path);
        }
        if let Some(orders_path) = overrides.orders_path {
            self.fixtures.orders_path = Some(orders_path);
        }
        if let Some(cancel_window_secs) = overrides.cancel_window_secs {
            self.policy.cancel_window_secs = cancel_window_secs;
        }
        if let Some(default_price_cap) = overrides.default_price_cap {
            self.policy.default_price_cap = default_price_cap;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_fixtures(&self.fixtures)?;
        validate_policy(&self.policy)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

pub fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("concierge.toml"), PathBuf::from("config/concierge.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_fixtures(fixtures: &FixturesConfig) -> Result<(), ConfigError> {
    for (key, path) in [
        ("fixtures.products_path", fixtures.products_path.as_deref()),
        ("fixtures.orders_path", fixtures.orders_path.as_deref()),
    ] {
        if let Some(path) = path {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "{key} must not be empty (unset it to use the embedded fixtures)"
                )));
            }
        }
    }

    Ok(())
}

fn validate_policy(policy: &PolicyConfig) -> Result<(), ConfigError> {
    if policy.cancel_window_secs <= 0 || policy.cancel_window_secs % 60 != 0 {
        return Err(ConfigError::Validation(
            "policy.cancel_window_secs must be a positive whole number of minutes".to_string(),
        ));
    }

    if !policy.default_price_cap.is_finite() || policy.default_price_cap <= 0.0 {
        return Err(ConfigError::Validation(
            "policy.default_price_cap must be a positive amount".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_i64(key: &str, value: &str) -> Result<i64, ConfigError> {
    value.trim().parse::<i64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_f64(key: &str, value: &str) -> Result<f64, ConfigError> {
    value.trim().parse::<f64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    fixtures: Option<FixturesPatch>,
    policy: Option<PolicyPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct FixturesPatch {
    products_path: Option<PathBuf>,
    orders_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct PolicyPatch {
    cancel_window_secs: Option<i64>,
    default_price_cap: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
