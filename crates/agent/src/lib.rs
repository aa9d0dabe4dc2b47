//! Agent Runtime - deterministic routing, tool sequencing and policy for the shop concierge
//!
//! This crate turns one shopper message into a reply plus an auditable trace:
//! - Routes the message to exactly one intent (`router`)
//! - Extracts the fields each intent needs (`conversation`)
//! - Calls the shop tools in a fixed order and records every call (`tools`)
//! - Applies the cancellation window and discount-code refusal (`guardrails`)
//! - Renders fixed reply templates (`response`) and the trace (`trace`)
//!
//! # Architecture
//!
//! Each call is strictly linear:
//! 1. **Routing** (`router`) - keyword rule table, first match wins
//! 2. **Pipeline** (`runtime`) - product assist, order help, or other
//! 3. **Trace Emission** (`trace`) - fixed key order, lossless JSON
//!
//! # Key Types
//!
//! - `AgentRuntime` - Main orchestrator (see `runtime` module)
//! - `ToolGateway` - The only writer of the tool-call record
//! - `GuardrailPolicy` - Cancellation and discount rules
//!
//! # Safety Principle
//!
//! No decision is delegated to a model. Routing, extraction and policy are
//! plain rules over the message text and the fixture data.

pub mod conversation;
pub mod guardrails;
pub mod response;
pub mod router;
pub mod runtime;
pub mod tools;
pub mod trace;

pub use runtime::{run_agent, AgentError, AgentReply, AgentRuntime};
pub use trace::Trace;
