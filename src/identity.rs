use serde::{Deserialize, Serialize};

use crate::error::JobflowError;
use crate::remote::UserId;

pub const RECRUITER: &str = "recruiter";

/// Signed-in user as reported by the identity provider. Read-only here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    /// Role string chosen during onboarding (`recruiter` or `candidate`).
    #[serde(default)]
    pub role: Option<String>,
}

impl Identity {
    pub fn new(user_id: impl Into<UserId>, role: Option<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn is_recruiter(&self) -> bool {
        self.role.as_deref() == Some(RECRUITER)
    }

    pub fn role_name(&self) -> &str {
        self.role.as_deref().unwrap_or("none")
    }

    /// Gate for recruiter-only mutations.
    pub fn require_recruiter(&self, action: &'static str) -> Result<(), JobflowError> {
        if self.is_recruiter() {
            Ok(())
        } else {
            Err(JobflowError::Forbidden {
                action,
                role: self.role_name().to_string(),
            })
        }
    }
}
