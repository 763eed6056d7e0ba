//! Command dispatch: wires one CLI command to the controller that owns it and
//! renders the outcome.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::cli::Command;
use crate::controller::{
    ApplicationCard, CompanyDrawer, JobListing, JobPoster, PostError, PostOutcome, RefreshStatus,
};
use crate::error::JobflowError;
use crate::identity::Identity;
use crate::operation::{AsyncOperation, ErrorInfo};
use crate::remote::api::{GetApplicationsCall, GetCompaniesCall};
use crate::remote::{InMemoryBoard, JobBoardApi, JobFilter, JobId};
use crate::ui::{self, OperationProgress};
use crate::validate::{CompanyDraft, JobDraft, load_logo};

/// Runs commands for one signed-in user against one store.
pub struct App<R: JobBoardApi> {
    api: Arc<R>,
    viewer: Identity,
}

impl<R: JobBoardApi> App<R> {
    pub fn new(api: Arc<R>, viewer: Identity) -> Self {
        Self { api, viewer }
    }

    pub async fn run(&self, command: Command) -> Result<(), JobflowError> {
        info!(user = %self.viewer.user_id, role = self.viewer.role_name(), ?command, "running command");
        match command {
            Command::Jobs {
                location,
                company,
                search,
            } => {
                let filter = JobFilter {
                    location,
                    company_id: company,
                    search_query: search.filter(|q| !q.trim().is_empty()),
                };
                let listing = self.listing(filter).await?;
                ui::print_jobs(&listing.jobs());
                Ok(())
            }
            Command::Companies => {
                let companies = self.companies();
                let rows = spin("Loading companies", async {
                    companies.trigger(()).await.map_err(JobflowError::from)
                })
                .await?;
                ui::print_companies(&rows);
                Ok(())
            }
            Command::Save { job_id } => self.toggle_saved(job_id).await,
            Command::DeleteJob { job_id } => self.delete_job(job_id).await,
            Command::Applications { job_id } => self.applications(job_id).await,
            Command::Status {
                job,
                application_id,
                status,
            } => self.change_status(job, application_id, &status).await,
            Command::PostJob {
                title,
                description,
                location,
                company,
                requirements,
            } => {
                let draft = JobDraft {
                    title,
                    description,
                    location,
                    company_id: company,
                    requirements,
                };
                self.post_job(&draft).await
            }
            Command::AddCompany { name, logo } => {
                let logo = logo.as_deref().map(load_logo).transpose()?;
                self.add_company(CompanyDraft { name, logo }).await
            }
            Command::Demo => demo().await,
        }
    }

    fn companies(&self) -> AsyncOperation<GetCompaniesCall<R>> {
        AsyncOperation::new(
            "get_companies",
            GetCompaniesCall {
                api: Arc::clone(&self.api),
            },
            (),
        )
    }

    async fn listing(&self, filter: JobFilter) -> Result<JobListing<R>, JobflowError> {
        let listing = JobListing::new(Arc::clone(&self.api), self.viewer.clone()).with_filter(filter);
        spin("Loading jobs", listing.load()).await?;
        Ok(listing)
    }

    async fn toggle_saved(&self, job_id: JobId) -> Result<(), JobflowError> {
        let listing = self.listing(JobFilter::default()).await?;
        let card = listing
            .cards()
            .into_iter()
            .find(|c| c.job().id == job_id)
            .ok_or(JobflowError::NotFound { what: "job", id: job_id })?;

        let chained = spin("Saving", card.toggle_saved(&listing)).await?;
        let word = if chained.value { "Saved" } else { "Unsaved" };
        println!("{word} #{job_id} {}", card.job().title);
        report_refresh("jobs", &chained.refresh);
        Ok(())
    }

    async fn delete_job(&self, job_id: JobId) -> Result<(), JobflowError> {
        let listing = self.listing(JobFilter::default()).await?;
        let card = listing
            .cards()
            .into_iter()
            .find(|c| c.job().id == job_id)
            .ok_or(JobflowError::NotFound { what: "job", id: job_id })?;

        let chained = spin("Deleting job", card.delete(&listing)).await?;
        println!("Deleted #{job_id} {}", card.job().title);
        report_refresh("jobs", &chained.refresh);
        ui::print_jobs(&listing.jobs());
        Ok(())
    }

    async fn applications(&self, job_id: JobId) -> Result<(), JobflowError> {
        let op = AsyncOperation::new(
            "get_applications",
            GetApplicationsCall {
                api: Arc::clone(&self.api),
            },
            job_id,
        );
        let mut rows = spin("Loading applications", async {
            op.trigger(()).await.map_err(JobflowError::from)
        })
        .await?;
        if self.viewer.is_recruiter() {
            ui::print_applications(&rows);
            return Ok(());
        }
        // Candidates only see their own applications, titled by the job.
        rows.retain(|a| a.candidate_id == self.viewer.user_id);
        let listing = self.listing(JobFilter::default()).await?;
        let job = listing.jobs().into_iter().find(|j| j.id == job_id);
        ui::print_own_applications(&rows, job.as_ref());
        Ok(())
    }

    async fn change_status(
        &self,
        job_id: JobId,
        application_id: i64,
        raw: &str,
    ) -> Result<(), JobflowError> {
        let application = self
            .api
            .get_applications(job_id)
            .await?
            .into_iter()
            .find(|a| a.id == application_id)
            .ok_or(JobflowError::NotFound {
                what: "application",
                id: application_id,
            })?;
        let card = ApplicationCard::new(Arc::clone(&self.api), application, self.viewer.clone());

        let chained = spin("Updating status", card.change_status(raw)).await?;
        println!("Application #{application_id} is now {}", chained.value);
        report_refresh("applications", &chained.refresh);
        if let Some(rows) = card.applications().data {
            ui::print_applications(&rows);
        }
        Ok(())
    }

    async fn post_job(&self, draft: &JobDraft) -> Result<(), JobflowError> {
        let poster = JobPoster::new(Arc::clone(&self.api), self.viewer.clone());
        let progress = OperationProgress::start("Posting job");
        match poster.submit(draft).await {
            Ok(PostOutcome::Created(job)) => {
                progress.succeed(&format!("Posted #{} {}", job.id, job.title));
                Ok(())
            }
            Ok(PostOutcome::NotCreated) => {
                progress.fail("The job was not created");
                Ok(())
            }
            Err(PostError::Invalid(errors)) => {
                progress.clear();
                ui::print_field_errors(&errors);
                let first = errors.into_iter().next();
                Err(first.map_or_else(
                    || JobflowError::Config("invalid job draft".to_string()),
                    JobflowError::from,
                ))
            }
            Err(PostError::Failed(err)) => {
                progress.clear();
                Err(inline(poster.state().error.as_ref(), "add_new_job", err))
            }
        }
    }

    async fn add_company(&self, draft: CompanyDraft) -> Result<(), JobflowError> {
        let companies = self.companies();
        let known = spin("Loading companies", async {
            companies.trigger(()).await.map_err(JobflowError::from)
        })
        .await?;

        let drawer = CompanyDrawer::new(Arc::clone(&self.api), self.viewer.clone());
        drawer.open();
        drawer.set_name(draft.name);
        if let Some(logo) = draft.logo {
            drawer.set_logo(logo);
        }

        let progress = OperationProgress::start("Adding company");
        match drawer.submit(&known, &companies).await {
            Ok(chained) if chained.refresh == RefreshStatus::NotRequested => {
                progress.fail("The company was not created");
                Ok(())
            }
            Ok(chained) => {
                progress.succeed("Company added");
                report_refresh("companies", &chained.refresh);
                ui::print_companies(&companies.data().unwrap_or_default());
                Ok(())
            }
            Err(JobflowError::Validation(first)) => {
                progress.clear();
                ui::print_field_errors(&drawer.view().field_errors);
                Err(first.into())
            }
            Err(err) => {
                progress.clear();
                Err(inline(drawer.state().error.as_ref(), "add_new_company", err))
            }
        }
    }
}

/// Show a spinner while `fut` is loading; remote failures are printed inline.
async fn spin<T, F>(label: &str, fut: F) -> Result<T, JobflowError>
where
    F: Future<Output = Result<T, JobflowError>>,
{
    let progress = OperationProgress::start(label);
    let result = fut.await;
    progress.clear();
    if let Err(err) = &result {
        if let Some(info) = err.remote_info() {
            ui::print_inline_error(label, info);
        }
    }
    result
}

fn inline(info: Option<&ErrorInfo>, operation: &str, err: JobflowError) -> JobflowError {
    if let Some(info) = info {
        ui::print_inline_error(operation, info);
    }
    err
}

fn report_refresh(list: &str, status: &RefreshStatus) {
    match status {
        RefreshStatus::Completed => info!(list, "list refreshed"),
        RefreshStatus::NotRequested => {}
        RefreshStatus::Detached => info!(list, "list gone before refresh"),
        RefreshStatus::Failed(err) => println!("  {list} could not be refreshed: {err}"),
    }
}

/// Replays the ordering scenarios against a seeded in-memory board with
/// scripted latencies.
pub async fn demo() -> Result<(), JobflowError> {
    let board = Arc::new(InMemoryBoard::seeded());
    let candidate = Identity::new("user_candidate", Some("candidate".into()));
    let recruiter = Identity::new("user_recruiter", Some("recruiter".into()));

    println!("1. Two filter changes, the first one slower");
    let listing = JobListing::new(Arc::clone(&board), candidate.clone());
    board.push_delay(Duration::from_millis(400));
    board.push_delay(Duration::from_millis(100));
    let (first, second) = tokio::join!(
        listing.set_location(Some("Karnataka".into())),
        listing.set_location(Some("Goa".into())),
    );
    first?;
    second?;
    println!("   filter: {:?}", listing.filter().location);
    ui::print_jobs(&listing.jobs());

    println!("\n2. Saving a job while the network fails");
    listing.clear_filters().await?;
    let cards = listing.cards();
    let card = cards
        .iter()
        .find(|c| !c.is_my_job())
        .ok_or(JobflowError::NotFound { what: "job", id: 0 })?;
    board.push_delay(Duration::from_millis(200));
    board.fail_next("Network unreachable");
    let (result, shown) = tokio::join!(card.toggle_saved(&listing), async {
        card.saved().displayed()
    });
    println!("   shown while in flight: saved = {shown}");
    if let Err(err) = result {
        match err.remote_info() {
            Some(info) => ui::print_inline_error("save_job", info),
            None => return Err(err),
        }
    }
    println!("   after settling: saved = {}", card.saved().displayed());
    let chained = card.toggle_saved(&listing).await?;
    println!("   retried: saved = {}, listing {:?}", chained.value, chained.refresh);

    println!("\n3. Two status changes, the first one slower");
    let application = board
        .get_applications(card.job().id)
        .await?
        .into_iter()
        .next();
    let Some(application) = application else {
        println!("   no applications to review");
        return Ok(());
    };
    let review = ApplicationCard::new(Arc::clone(&board), application, recruiter);
    board.push_delay(Duration::from_millis(300));
    board.push_delay(Duration::from_millis(100));
    let (slow, fast) = tokio::join!(
        review.change_status("reviewing"),
        review.change_status("rejected"),
    );
    println!("   newer change confirmed: {}", fast?.value);
    println!("   older change landed later, re-fetched: {}", slow?.value);
    println!("   displayed: {}", review.displayed_status());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app(role: &str) -> (Arc<InMemoryBoard>, App<InMemoryBoard>) {
        let board = Arc::new(InMemoryBoard::seeded());
        let user = format!("user_{role}");
        let app = App::new(Arc::clone(&board), Identity::new(user, Some(role.to_string())));
        (board, app)
    }

    #[tokio::test]
    async fn save_command_round_trips() {
        let (board, app) = app("candidate");
        app.run(Command::Save { job_id: 3 }).await.unwrap();

        let jobs = board
            .get_jobs(Some("user_candidate"), &JobFilter::default())
            .await
            .unwrap();
        assert!(jobs.iter().any(|j| j.id == 3 && j.is_saved()));
    }

    #[tokio::test]
    async fn unknown_job_is_not_found() {
        let (_, app) = app("candidate");
        let err = app.run(Command::Save { job_id: 99 }).await.unwrap_err();
        assert!(matches!(err, JobflowError::NotFound { what: "job", id: 99 }));
    }

    #[tokio::test]
    async fn status_command_updates_server() {
        let (board, app) = app("recruiter");
        app.run(Command::Status {
            job: 3,
            application_id: 6,
            status: "accepted".into(),
        })
        .await
        .unwrap();

        let rows = board.get_applications(3).await.unwrap();
        let row = rows.iter().find(|a| a.id == 6).unwrap();
        assert_eq!(row.status, crate::remote::ApplicationStatus::Accepted);
    }

    #[tokio::test]
    async fn candidate_applications_look_up_the_job() {
        let (board, candidate) = app("candidate");
        candidate.run(Command::Applications { job_id: 3 }).await.unwrap();
        assert_eq!(board.calls("get_applications"), 1);
        assert_eq!(board.calls("get_jobs"), 1);

        let (board, recruiter) = app("recruiter");
        recruiter.run(Command::Applications { job_id: 3 }).await.unwrap();
        assert_eq!(board.calls("get_jobs"), 0);
    }

    #[tokio::test]
    async fn candidate_cannot_post_job() {
        let (board, app) = app("candidate");
        let err = app
            .run(Command::PostJob {
                title: "Data Engineer".into(),
                description: "Pipelines.".into(),
                location: "Goa".into(),
                company: Some(1),
                requirements: "- SQL".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, JobflowError::Forbidden { .. }));
        assert_eq!(board.calls("add_new_job"), 0);
    }

    #[tokio::test]
    async fn add_company_without_logo_is_invalid() {
        let (board, app) = app("recruiter");
        let err = app
            .run(Command::AddCompany {
                name: "Initech".into(),
                logo: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, JobflowError::Validation(_)));
        assert_eq!(board.calls("add_new_company"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn demo_runs_to_completion() {
        demo().await.unwrap();
    }
}
