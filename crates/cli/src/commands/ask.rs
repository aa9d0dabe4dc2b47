use concierge_agent::AgentRuntime;
use concierge_core::config::{AppConfig, LoadOptions};
use concierge_core::errors::ApplicationError;
use tracing::error;
use uuid::Uuid;

use crate::commands::CommandResult;
use crate::logging::init_logging;

#[derive(Clone, Debug)]
pub struct AskArgs {
    pub message: String,
    pub now: Option<String>,
    /// Print the trace JSON without the reply text.
    pub trace_only: bool,
}

pub fn run(options: &LoadOptions, args: &AskArgs) -> CommandResult {
    let config = match AppConfig::load(options.clone()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "ask",
                "config_validation",
                format!("config validation failed: {error}"),
                2,
            )
        }
    };
    init_logging(&config.logging);

    match answer(&config, args) {
        Ok(output) => CommandResult { exit_code: 0, output },
        Err(failure) => {
            let correlation_id = Uuid::new_v4().to_string();
            error!(
                event_name = "cli.ask.failed",
                correlation_id = %correlation_id,
                error = %failure,
                "ask command failed"
            );
            CommandResult::interface_failure("ask", &failure.into_interface(correlation_id))
        }
    }
}

fn answer(config: &AppConfig, args: &AskArgs) -> Result<String, ApplicationError> {
    let runtime = AgentRuntime::from_config(config)?;
    let reply = runtime.run(&args.message, args.now.as_deref())?;
    let trace_json =
        reply.trace_json().map_err(|error| ApplicationError::Serialization(error.to_string()))?;

    if args.trace_only {
        Ok(trace_json)
    } else {
        Ok(format!("{trace_json}\n\n{}", reply.final_message))
    }
}
