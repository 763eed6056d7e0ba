use thiserror::Error;

use crate::operation::{ErrorInfo, OperationError};
use crate::remote::RemoteError;

#[derive(Debug, Error)]
pub enum JobflowError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("{0}")]
    Operation(#[from] OperationError),

    #[error("Not allowed to {action} as {role}")]
    Forbidden { action: &'static str, role: String },

    #[error("{operation} is still in flight")]
    Busy { operation: &'static str },

    #[error("No {what} with id {id}")]
    NotFound { what: &'static str, id: i64 },

    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl JobflowError {
    /// The inline message a failed remote call leaves next to its control.
    pub fn remote_info(&self) -> Option<&ErrorInfo> {
        match self {
            JobflowError::Operation(err) => err.remote_info(),
            _ => None,
        }
    }
}

/// Local shape checks that fail before any remote call is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: {message}")]
    Field {
        field: &'static str,
        message: &'static str,
    },

    #[error("unknown application status {0:?}; expected applied, reviewing, rejected or accepted")]
    UnknownStatus(String),
}

impl ValidationError {
    pub fn field(field: &'static str, message: &'static str) -> Self {
        ValidationError::Field { field, message }
    }

    /// Message shown under the offending input.
    pub fn message(&self) -> String {
        match self {
            ValidationError::Field { message, .. } => (*message).to_string(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_error_display() {
        let err = ValidationError::field("name", "Company already exists");
        assert_eq!(err.to_string(), "name: Company already exists");
        assert_eq!(err.message(), "Company already exists");
    }

    #[test]
    fn forbidden_display() {
        let err = JobflowError::Forbidden {
            action: "post a job",
            role: "candidate".into(),
        };
        assert_eq!(err.to_string(), "Not allowed to post a job as candidate");
    }

    #[test]
    fn remote_info_only_for_remote_failures() {
        let err = JobflowError::from(OperationError::Remote(ErrorInfo::new("Network unreachable")));
        assert_eq!(err.remote_info().unwrap().message, "Network unreachable");
        assert_eq!(err.to_string(), "Network unreachable");

        let err = JobflowError::Busy { operation: "save_job" };
        assert!(err.remote_info().is_none());
    }
}
