use std::fmt;

use crate::remote::RemoteError;

/// Normalized description of a failed remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    /// Human-readable message, shown inline next to the affected control.
    pub message: String,
    /// HTTP status when the failure came from the API layer.
    pub status: Option<u16>,
}

impl ErrorInfo {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl From<&RemoteError> for ErrorInfo {
    fn from(err: &RemoteError) -> Self {
        Self {
            message: err.message(),
            status: err.status(),
        }
    }
}

/// The four lifecycle phases of an operation, derived from its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    InFlight,
    Succeeded,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "IDLE"),
            Phase::InFlight => write!(f, "IN_FLIGHT"),
            Phase::Succeeded => write!(f, "SUCCEEDED"),
            Phase::Failed => write!(f, "FAILED"),
        }
    }
}

/// Lifecycle record for one async call type.
///
/// `data` survives failures: a later error never clears the last good value.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationState<T> {
    pub data: Option<T>,
    pub error: Option<ErrorInfo>,
    pub loading: bool,
}

impl<T> Default for OperationState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            loading: false,
        }
    }
}

impl<T> OperationState<T> {
    /// Loading wins over a stale error or stale data.
    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::InFlight
        } else if self.error.is_some() {
            Phase::Failed
        } else if self.data.is_some() {
            Phase::Succeeded
        } else {
            Phase::Idle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_is_idle() {
        let state: OperationState<Vec<u32>> = OperationState::default();
        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.data.is_none());
        assert!(!state.loading);
    }

    #[test]
    fn loading_takes_precedence() {
        let state = OperationState {
            data: Some(1),
            error: Some(ErrorInfo::new("boom")),
            loading: true,
        };
        assert_eq!(state.phase(), Phase::InFlight);
    }

    #[test]
    fn error_with_stale_data_is_failed() {
        let state = OperationState {
            data: Some(1),
            error: Some(ErrorInfo::new("boom")),
            loading: false,
        };
        assert_eq!(state.phase(), Phase::Failed);
    }

    #[test]
    fn error_info_from_remote_error() {
        let err = RemoteError::Api {
            status: 409,
            message: "duplicate key".into(),
        };
        let info = ErrorInfo::from(&err);
        assert_eq!(info.message, "duplicate key");
        assert_eq!(info.status, Some(409));
        assert_eq!(info.to_string(), "duplicate key");
    }

    #[test]
    fn phase_display() {
        assert_eq!(Phase::Idle.to_string(), "IDLE");
        assert_eq!(Phase::InFlight.to_string(), "IN_FLIGHT");
        assert_eq!(Phase::Succeeded.to_string(), "SUCCEEDED");
        assert_eq!(Phase::Failed.to_string(), "FAILED");
    }
}
