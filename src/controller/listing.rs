use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use super::job_card::JobCard;
use super::refresh::Refresh;
use crate::error::JobflowError;
use crate::identity::Identity;
use crate::operation::{AsyncOperation, OperationError, OperationState};
use crate::remote::api::{GetCompaniesCall, GetJobsCall};
use crate::remote::{Company, CompanyId, Job, JobBoardApi, JobFilter};

/// The job listing surface: filters, the job list and the company options.
///
/// Each filter change re-fetches under the latest-invocation policy, so when
/// changes overlap the list always matches the filter that was set last.
pub struct JobListing<R: JobBoardApi> {
    api: Arc<R>,
    viewer: Identity,
    jobs: AsyncOperation<GetJobsCall<R>>,
    companies: AsyncOperation<GetCompaniesCall<R>>,
    filter: watch::Sender<JobFilter>,
}

impl<R: JobBoardApi> JobListing<R> {
    pub fn new(api: Arc<R>, viewer: Identity) -> Self {
        let jobs = AsyncOperation::new(
            "get_jobs",
            GetJobsCall {
                api: Arc::clone(&api),
            },
            Some(viewer.user_id.clone()),
        );
        let companies = AsyncOperation::new(
            "get_companies",
            GetCompaniesCall {
                api: Arc::clone(&api),
            },
            (),
        );
        let (filter, _) = watch::channel(JobFilter::default());
        Self {
            api,
            viewer,
            jobs,
            companies,
            filter,
        }
    }

    /// Start from `filter` instead of the empty one. Nothing is fetched.
    pub fn with_filter(self, filter: JobFilter) -> Self {
        self.filter.send_replace(filter);
        self
    }

    /// Fetch the company options and the jobs for the current filter.
    pub async fn load(&self) -> Result<(), JobflowError> {
        let (companies, jobs) = tokio::join!(self.companies.trigger(()), self.fetch());
        companies.map_err(JobflowError::from)?;
        jobs
    }

    pub fn jobs(&self) -> Vec<Job> {
        self.jobs.data().unwrap_or_default()
    }

    pub fn companies(&self) -> Vec<Company> {
        self.companies.data().unwrap_or_default()
    }

    pub fn state(&self) -> OperationState<Vec<Job>> {
        self.jobs.state()
    }

    pub fn is_loading(&self) -> bool {
        self.jobs.is_loading()
    }

    pub fn filter(&self) -> JobFilter {
        self.filter.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<OperationState<Vec<Job>>> {
        self.jobs.subscribe()
    }

    /// Cards for the jobs currently shown, bound to this listing's viewer.
    pub fn cards(&self) -> Vec<JobCard<R>> {
        self.jobs()
            .into_iter()
            .map(|job| JobCard::new(Arc::clone(&self.api), job, &self.viewer))
            .collect()
    }

    /// Submitting an empty search does nothing.
    pub async fn set_search(&self, query: &str) -> Result<(), JobflowError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(());
        }
        self.filter
            .send_modify(|f| f.search_query = Some(query.to_string()));
        self.fetch().await
    }

    pub async fn set_location(&self, location: Option<String>) -> Result<(), JobflowError> {
        self.filter.send_modify(|f| f.location = location);
        self.fetch().await
    }

    pub async fn set_company(&self, company_id: Option<CompanyId>) -> Result<(), JobflowError> {
        self.filter.send_modify(|f| f.company_id = company_id);
        self.fetch().await
    }

    pub async fn clear_filters(&self) -> Result<(), JobflowError> {
        self.filter.send_replace(JobFilter::default());
        self.fetch().await
    }

    /// Tear the surface down; settlements still in flight are dropped.
    pub fn dispose(&self) {
        self.jobs.dispose();
        self.companies.dispose();
    }

    async fn fetch(&self) -> Result<(), JobflowError> {
        match self.refresh().await {
            // The newer fetch owns the list.
            Err(OperationError::Superseded { .. }) | Ok(()) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

impl<R: JobBoardApi> Refresh for JobListing<R> {
    async fn refresh(&self) -> Result<(), OperationError> {
        let filter = self.filter();
        debug!(?filter, "fetching jobs");
        self.jobs.trigger(filter).await.map(drop)
    }

    fn is_live(&self) -> bool {
        self.jobs.is_live()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::controller::refresh::RefreshStatus;
    use crate::remote::InMemoryBoard;

    fn listing(board: &Arc<InMemoryBoard>) -> JobListing<InMemoryBoard> {
        JobListing::new(
            Arc::clone(board),
            Identity::new("user_candidate", Some("candidate".into())),
        )
    }

    #[tokio::test]
    async fn load_fetches_jobs_and_companies() {
        let board = Arc::new(InMemoryBoard::seeded());
        let listing = listing(&board);

        listing.load().await.unwrap();
        assert_eq!(listing.jobs().len(), 3);
        assert_eq!(listing.companies().len(), 2);
        assert!(!listing.is_loading());
    }

    #[tokio::test]
    async fn empty_search_is_ignored() {
        let board = Arc::new(InMemoryBoard::seeded());
        let listing = listing(&board);
        listing.load().await.unwrap();

        listing.set_search("   ").await.unwrap();
        assert_eq!(board.calls("get_jobs"), 1);
        assert!(listing.filter().is_empty());

        listing.set_search("rust").await.unwrap();
        let titles: Vec<String> = listing.jobs().into_iter().map(|j| j.title).collect();
        assert_eq!(titles, vec!["Rust Platform Engineer"]);
    }

    #[tokio::test]
    async fn filters_combine_and_clear() {
        let board = Arc::new(InMemoryBoard::seeded());
        let listing = listing(&board);
        listing.load().await.unwrap();
        let globex = listing
            .companies()
            .into_iter()
            .find(|c| c.name == "Globex")
            .unwrap();

        listing.set_location(Some("Karnataka".into())).await.unwrap();
        listing.set_company(Some(globex.id)).await.unwrap();
        assert_eq!(listing.jobs().len(), 1);

        listing.clear_filters().await.unwrap();
        assert!(listing.filter().is_empty());
        assert_eq!(listing.jobs().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_filter_changes_resolve_to_latest() {
        let board = Arc::new(InMemoryBoard::seeded());
        let listing = listing(&board);
        board.push_delay(Duration::from_millis(50));
        board.push_delay(Duration::from_millis(10));

        let (slow, fast) = tokio::join!(
            listing.set_location(Some("Karnataka".into())),
            listing.set_location(Some("Goa".into())),
        );
        slow.unwrap();
        fast.unwrap();

        let jobs = listing.jobs();
        assert_eq!(jobs.len(), 1);
        assert!(jobs.iter().all(|j| j.location == "Goa"));
        assert_eq!(listing.filter().location.as_deref(), Some("Goa"));
        assert!(!listing.is_loading());
    }

    #[tokio::test]
    async fn saving_from_a_card_refreshes_the_listing() {
        let board = Arc::new(InMemoryBoard::seeded());
        let listing = listing(&board);
        listing.load().await.unwrap();

        let cards = listing.cards();
        let card = cards.iter().find(|c| c.job().id == 3).unwrap();
        let chained = card.toggle_saved(&listing).await.unwrap();
        assert_eq!(chained.refresh, RefreshStatus::Completed);

        let job = listing.jobs().into_iter().find(|j| j.id == 3).unwrap();
        assert!(job.is_saved());
    }

    #[tokio::test]
    async fn disposed_listing_is_not_refreshed() {
        let board = Arc::new(InMemoryBoard::seeded());
        let listing = listing(&board);
        listing.load().await.unwrap();
        let cards = listing.cards();
        listing.dispose();

        let card = cards.iter().find(|c| c.job().id == 3).unwrap();
        let chained = card.toggle_saved(&listing).await.unwrap();
        assert_eq!(chained.refresh, RefreshStatus::Detached);
        assert_eq!(board.calls("get_jobs"), 1);
    }
}
