use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::error::{JobflowError, ValidationError};
use crate::identity::Identity;
use crate::operation::{AsyncOperation, OperationState};
use crate::remote::api::AddJobCall;
use crate::remote::{Job, JobBoardApi};
use crate::validate::JobDraft;

/// How a submitted posting ended.
#[derive(Debug, Clone, PartialEq)]
pub enum PostOutcome {
    /// The store returned the new row; the form navigates to the jobs list.
    Created(Job),
    /// The call succeeded without a row; the form stays where it is.
    NotCreated,
}

/// Recruiter-only job posting form.
pub struct JobPoster<R: JobBoardApi> {
    viewer: Identity,
    op: AsyncOperation<AddJobCall<R>>,
}

impl<R: JobBoardApi> JobPoster<R> {
    pub fn new(api: Arc<R>, viewer: Identity) -> Self {
        Self {
            viewer,
            op: AsyncOperation::new("add_new_job", AddJobCall { api }, ()),
        }
    }

    pub fn state(&self) -> OperationState<Vec<Job>> {
        self.op.state()
    }

    pub fn is_submitting(&self) -> bool {
        self.op.is_loading()
    }

    /// Validate `draft` and create the job as an open posting.
    ///
    /// Validation failures are returned in full so the form can show one
    /// message per field; nothing is sent in that case. A submit while
    /// another is in flight returns [`JobflowError::Busy`].
    pub async fn submit(&self, draft: &JobDraft) -> Result<PostOutcome, PostError> {
        self.viewer.require_recruiter("post a job")?;
        if self.op.is_loading() {
            return Err(JobflowError::Busy {
                operation: self.op.name(),
            }
            .into());
        }
        let job = draft.validate(&self.viewer.user_id).map_err(PostError::Invalid)?;

        let rows = self.op.trigger(job).await.map_err(JobflowError::from)?;
        match rows.into_iter().next() {
            Some(job) => {
                info!(job_id = job.id, title = %job.title, "job posted");
                Ok(PostOutcome::Created(job))
            }
            None => {
                warn!("job creation returned no row");
                Ok(PostOutcome::NotCreated)
            }
        }
    }
}

/// Failure of a posting attempt: every invalid field, or anything else.
#[derive(Debug, Error)]
pub enum PostError {
    #[error("{} invalid field(s)", .0.len())]
    Invalid(Vec<ValidationError>),

    #[error(transparent)]
    Failed(#[from] JobflowError),
}

impl PostError {
    pub fn field_errors(&self) -> &[ValidationError] {
        match self {
            PostError::Invalid(errors) => errors,
            PostError::Failed(_) => &[],
        }
    }
}
