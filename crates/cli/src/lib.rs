pub mod commands;
pub mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use concierge_core::config::LoadOptions;

#[derive(Debug, Parser)]
#[command(
    name = "concierge",
    about = "Concierge shopping agent CLI",
    long_about = "Ask the rule-based shopping agent, replay the reference scenarios, and inspect configuration.",
    after_help = "Examples:\n  concierge ask \"Cancel order A1003 — email mira@example.com\" --now 2025-09-07T12:30:00Z\n  concierge scenarios\n  concierge config"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a concierge.toml config file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Run one message through the agent and print the trace and reply")]
    Ask {
        message: String,
        #[arg(long, help = "Reference time for order cancellation (ISO-8601)")]
        now: Option<String>,
        #[arg(long, help = "Print only the trace JSON")]
        json: bool,
    },
    #[command(about = "Replay the reference scenarios and check each trace against expectations")]
    Scenarios {
        #[arg(long, default_value = commands::scenarios::REFERENCE_NOW)]
        now: String,
    },
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let options = LoadOptions { config_path: cli.config, ..LoadOptions::default() };

    let result = match cli.command {
        Command::Ask { message, now, json } => commands::ask::run(
            &options,
            &commands::ask::AskArgs { message, now, trace_only: json },
        ),
        Command::Scenarios { now } => commands::scenarios::run(&options, &now),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run(&options) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
