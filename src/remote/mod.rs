pub mod api;
pub mod client;
pub mod error;
pub mod memory;
pub mod types;

pub use api::JobBoardApi;
pub use client::RestClient;
pub use error::RemoteError;
pub use memory::InMemoryBoard;
pub use types::{
    Application, ApplicationId, ApplicationStatus, Company, CompanyId, Job, JobFilter, JobId,
    LogoFile, NewCompany, NewJob, SaveJobRequest, SavedJob, StatusUpdate, UserId,
};
