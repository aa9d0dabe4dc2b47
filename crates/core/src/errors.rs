use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid {field} timestamp `{value}`: {source}")]
    InvalidTimestamp {
        field: &'static str,
        value: String,
        #[source]
        source: chrono::ParseError,
    },
    #[error("order `{order_id}` is not present in the order fixture")]
    UnknownOrder { order_id: String },
}

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("could not read fixture file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse {kind} fixture `{origin}`: {source}")]
    Parse { kind: &'static str, origin: String, source: serde_json::Error },
    #[error("fixture validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error(transparent)]
    Fixture(#[from] FixtureError),
    #[error("trace serialization failure: {0}")]
    Serialization(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "Sorry, I couldn't work with that request. Please check the details and try again."
            }
            Self::ServiceUnavailable { .. } => {
                "Sorry, our store data is unavailable right now. Please try again shortly."
            }
            Self::Internal { .. } => "Sorry, something went wrong on our side.",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        let unassigned = "unassigned".to_owned();
        match value {
            // A malformed override timestamp is the caller's input; a malformed
            // fixture timestamp is a data fault. Both surface as bad data here.
            ApplicationError::Tool(error @ ToolError::InvalidTimestamp { .. }) => {
                Self::BadRequest { message: error.to_string(), correlation_id: unassigned }
            }
            ApplicationError::Tool(error @ ToolError::UnknownOrder { .. }) => {
                Self::ServiceUnavailable { message: error.to_string(), correlation_id: unassigned }
            }
            ApplicationError::Fixture(error) => {
                Self::ServiceUnavailable { message: error.to_string(), correlation_id: unassigned }
            }
            ApplicationError::Serialization(message) => {
                Self::Internal { message, correlation_id: unassigned }
            }
        }
    }
}
