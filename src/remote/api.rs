use std::future::Future;
use std::sync::Arc;

use super::error::RemoteError;
use super::types::{
    Application, ApplicationId, ApplicationStatus, Company, Job, JobFilter, JobId, NewCompany,
    NewJob, SaveJobRequest, SavedJob, StatusUpdate, UserId,
};
use crate::operation::RemoteCall;

/// The remote job-board store, as far as the client is concerned.
///
/// Mutations return the affected rows so callers can derive state from the
/// server's answer instead of from what they asked for.
pub trait JobBoardApi {
    fn get_jobs(
        &self,
        viewer: Option<&str>,
        filter: &JobFilter,
    ) -> impl Future<Output = Result<Vec<Job>, RemoteError>>;

    fn get_companies(&self) -> impl Future<Output = Result<Vec<Company>, RemoteError>>;

    fn add_new_company(
        &self,
        company: &NewCompany,
    ) -> impl Future<Output = Result<Vec<Company>, RemoteError>>;

    fn add_new_job(&self, job: &NewJob) -> impl Future<Output = Result<Vec<Job>, RemoteError>>;

    fn delete_job(&self, job_id: JobId) -> impl Future<Output = Result<Vec<Job>, RemoteError>>;

    /// Saves the job when `already_saved` is false, unsaves it otherwise.
    /// An empty result means "not saved".
    fn save_job(
        &self,
        request: &SaveJobRequest,
    ) -> impl Future<Output = Result<Vec<SavedJob>, RemoteError>>;

    fn update_application_status(
        &self,
        update: &StatusUpdate,
    ) -> impl Future<Output = Result<Vec<Application>, RemoteError>>;

    fn get_applications(
        &self,
        job_id: JobId,
    ) -> impl Future<Output = Result<Vec<Application>, RemoteError>>;
}

/// Job listing for a viewer (bound) and a filter (per call).
pub struct GetJobsCall<R> {
    pub api: Arc<R>,
}

impl<R: JobBoardApi> RemoteCall for GetJobsCall<R> {
    type Fixed = Option<UserId>;
    type Args = JobFilter;
    type Output = Vec<Job>;

    async fn call(&self, viewer: Option<UserId>, filter: JobFilter) -> Result<Vec<Job>, RemoteError> {
        self.api.get_jobs(viewer.as_deref(), &filter).await
    }
}

pub struct GetCompaniesCall<R> {
    pub api: Arc<R>,
}

impl<R: JobBoardApi> RemoteCall for GetCompaniesCall<R> {
    type Fixed = ();
    type Args = ();
    type Output = Vec<Company>;

    async fn call(&self, _: (), _: ()) -> Result<Vec<Company>, RemoteError> {
        self.api.get_companies().await
    }
}

pub struct AddCompanyCall<R> {
    pub api: Arc<R>,
}

impl<R: JobBoardApi> RemoteCall for AddCompanyCall<R> {
    type Fixed = ();
    type Args = NewCompany;
    type Output = Vec<Company>;

    async fn call(&self, _: (), company: NewCompany) -> Result<Vec<Company>, RemoteError> {
        self.api.add_new_company(&company).await
    }
}

pub struct AddJobCall<R> {
    pub api: Arc<R>,
}

impl<R: JobBoardApi> RemoteCall for AddJobCall<R> {
    type Fixed = ();
    type Args = NewJob;
    type Output = Vec<Job>;

    async fn call(&self, _: (), job: NewJob) -> Result<Vec<Job>, RemoteError> {
        self.api.add_new_job(&job).await
    }
}

/// Deletion of one job, bound at construction.
pub struct DeleteJobCall<R> {
    pub api: Arc<R>,
}

impl<R: JobBoardApi> RemoteCall for DeleteJobCall<R> {
    type Fixed = JobId;
    type Args = ();
    type Output = Vec<Job>;

    async fn call(&self, job_id: JobId, _: ()) -> Result<Vec<Job>, RemoteError> {
        self.api.delete_job(job_id).await
    }
}

pub struct SaveJobCall<R> {
    pub api: Arc<R>,
}

impl<R: JobBoardApi> RemoteCall for SaveJobCall<R> {
    type Fixed = ();
    type Args = SaveJobRequest;
    type Output = Vec<SavedJob>;

    async fn call(&self, _: (), request: SaveJobRequest) -> Result<Vec<SavedJob>, RemoteError> {
        self.api.save_job(&request).await
    }
}

/// Status change of one application, bound at construction.
pub struct UpdateStatusCall<R> {
    pub api: Arc<R>,
}

impl<R: JobBoardApi> RemoteCall for UpdateStatusCall<R> {
    type Fixed = ApplicationId;
    type Args = ApplicationStatus;
    type Output = Vec<Application>;

    async fn call(
        &self,
        application_id: ApplicationId,
        status: ApplicationStatus,
    ) -> Result<Vec<Application>, RemoteError> {
        let update = StatusUpdate {
            application_id,
            status,
        };
        self.api.update_application_status(&update).await
    }
}

/// Applications of one job, bound at construction.
pub struct GetApplicationsCall<R> {
    pub api: Arc<R>,
}

impl<R: JobBoardApi> RemoteCall for GetApplicationsCall<R> {
    type Fixed = JobId;
    type Args = ();
    type Output = Vec<Application>;

    async fn call(&self, job_id: JobId, _: ()) -> Result<Vec<Application>, RemoteError> {
        self.api.get_applications(job_id).await
    }
}
