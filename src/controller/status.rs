use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use super::refresh::{Chained, RefreshStatus, mutate_then_refresh};
use crate::error::JobflowError;
use crate::identity::Identity;
use crate::operation::{AsyncOperation, OperationError, OperationState};
use crate::remote::api::{GetApplicationsCall, UpdateStatusCall};
use crate::remote::{Application, ApplicationStatus, JobBoardApi};

/// Review status control of one application, as seen by the recruiter.
///
/// The dropdown stays interactive while a change is in flight. Overlapping
/// changes are ordered by the operation's generation counter: only the most
/// recent one may set the confirmed status from its own result. Every change
/// that reached the server, superseded or not, is followed by a re-fetch of
/// the job's applications, and the re-fetched record is what ends up
/// displayed.
pub struct ApplicationCard<R: JobBoardApi> {
    application: Application,
    viewer: Identity,
    status: AsyncOperation<UpdateStatusCall<R>>,
    applications: AsyncOperation<GetApplicationsCall<R>>,
    confirmed: watch::Sender<ApplicationStatus>,
    pending: watch::Sender<Option<ApplicationStatus>>,
}

impl<R: JobBoardApi> ApplicationCard<R> {
    pub fn new(api: Arc<R>, application: Application, viewer: Identity) -> Self {
        let status = AsyncOperation::new(
            "update_application_status",
            UpdateStatusCall {
                api: Arc::clone(&api),
            },
            application.id,
        );
        let applications =
            AsyncOperation::new("get_applications", GetApplicationsCall { api }, application.job_id);
        let (confirmed, _) = watch::channel(application.status);
        let (pending, _) = watch::channel(None);
        Self {
            application,
            viewer,
            status,
            applications,
            confirmed,
            pending,
        }
    }

    pub fn application(&self) -> &Application {
        &self.application
    }

    /// Candidates see their own applications read-only.
    pub fn is_candidate(&self) -> bool {
        !self.viewer.is_recruiter()
    }

    pub fn is_updating(&self) -> bool {
        self.status.is_loading()
    }

    /// Value shown in the dropdown: the latest choice while it is in flight,
    /// the confirmed status otherwise.
    pub fn displayed_status(&self) -> ApplicationStatus {
        self.pending.borrow().unwrap_or_else(|| self.confirmed_status())
    }

    pub fn confirmed_status(&self) -> ApplicationStatus {
        *self.confirmed.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ApplicationStatus> {
        self.confirmed.subscribe()
    }

    /// The job's applications as last re-fetched after a status change.
    pub fn applications(&self) -> OperationState<Vec<Application>> {
        self.applications.state()
    }

    /// Validate `raw`, send it, then re-fetch the job's applications.
    pub async fn change_status(&self, raw: &str) -> Result<Chained<ApplicationStatus>, JobflowError> {
        self.viewer.require_recruiter("change an application status")?;
        let status: ApplicationStatus = raw.parse()?;
        self.pending.send_replace(Some(status));
        debug!(application_id = self.application.id, %status, "changing application status");

        let mutation = async {
            let choice = PendingChoice {
                card: self,
                mine: self.status.generation() + 1,
            };
            let result = self.status.trigger(status).await;
            drop(choice);
            match result {
                Ok(rows) => {
                    self.confirm_from(&rows);
                    Ok(())
                }
                // A newer change owns the state, but this one still landed.
                Err(OperationError::Superseded { .. }) => Ok(()),
                Err(err) => Err(JobflowError::from(err)),
            }
        };
        let chained = mutate_then_refresh(mutation, |_| true, &self.applications).await?;

        if chained.refresh == RefreshStatus::Completed {
            if let Some(rows) = self.applications.data() {
                self.confirm_from(&rows);
            }
        }
        let value = self.confirmed_status();
        info!(application_id = self.application.id, status = %value, "application status settled");
        Ok(Chained {
            value,
            refresh: chained.refresh,
        })
    }

    fn confirm_from(&self, rows: &[Application]) {
        if let Some(row) = rows.iter().find(|a| a.id == self.application.id) {
            self.confirmed.send_replace(row.status);
        }
    }
}

/// The dropdown's in-flight choice for one change.
///
/// Dropped when that change settles or is abandoned; clears the choice only
/// if no newer change has started since.
struct PendingChoice<'a, R: JobBoardApi> {
    card: &'a ApplicationCard<R>,
    mine: u64,
}

impl<R: JobBoardApi> Drop for PendingChoice<'_, R> {
    fn drop(&mut self) {
        if self.card.status.generation() == self.mine {
            self.card.pending.send_replace(None);
        }
    }
}
