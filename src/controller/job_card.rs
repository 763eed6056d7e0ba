use std::sync::Arc;

use tracing::info;

use super::refresh::{Chained, Refresh, mutate_then_refresh};
use super::toggle::SavedJobToggle;
use crate::error::JobflowError;
use crate::identity::Identity;
use crate::operation::AsyncOperation;
use crate::remote::api::DeleteJobCall;
use crate::remote::{Job, JobBoardApi};

/// One job in a listing: save toggle for candidates, delete for the
/// recruiter who posted it. Both notify the listing through a refresh.
pub struct JobCard<R: JobBoardApi> {
    job: Job,
    is_my_job: bool,
    saved: SavedJobToggle<R>,
    delete: AsyncOperation<DeleteJobCall<R>>,
}

impl<R: JobBoardApi> JobCard<R> {
    pub fn new(api: Arc<R>, job: Job, viewer: &Identity) -> Self {
        let is_my_job = job.recruiter_id == viewer.user_id;
        let saved = SavedJobToggle::new(
            Arc::clone(&api),
            viewer.user_id.clone(),
            job.id,
            job.is_saved(),
        );
        let delete = AsyncOperation::new("delete_job", DeleteJobCall { api }, job.id);
        Self {
            job,
            is_my_job,
            saved,
            delete,
        }
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn is_my_job(&self) -> bool {
        self.is_my_job
    }

    pub fn saved(&self) -> &SavedJobToggle<R> {
        &self.saved
    }

    pub fn is_deleting(&self) -> bool {
        self.delete.is_loading()
    }

    /// Toggle the saved state, then refresh the owning list once the toggle
    /// has settled successfully.
    pub async fn toggle_saved<T: Refresh>(
        &self,
        on_action: &T,
    ) -> Result<Chained<bool>, JobflowError> {
        if self.is_my_job {
            return Err(JobflowError::Forbidden {
                action: "save a job you posted",
                role: "owner".to_string(),
            });
        }
        mutate_then_refresh(self.saved.toggle(), |_| true, on_action).await
    }

    /// Delete the job (poster only), then refresh the owning list.
    pub async fn delete<T: Refresh>(
        &self,
        on_action: &T,
    ) -> Result<Chained<Vec<Job>>, JobflowError> {
        if !self.is_my_job {
            return Err(JobflowError::Forbidden {
                action: "delete a job posted by someone else",
                role: "viewer".to_string(),
            });
        }
        let deletion = async { self.delete.trigger(()).await.map_err(JobflowError::from) };
        let chained = mutate_then_refresh(deletion, |_| true, on_action).await?;
        info!(job_id = self.job.id, removed = chained.value.len(), "job deleted");
        Ok(chained)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::refresh::RefreshStatus;
    use crate::controller::refresh::tests::CountingRefresh;
    use crate::remote::{InMemoryBoard, JobFilter};

    async fn card(
        board: &Arc<InMemoryBoard>,
        job_id: i64,
        viewer: &Identity,
    ) -> JobCard<InMemoryBoard> {
        let job = board
            .get_jobs(Some(viewer.user_id.as_str()), &JobFilter::default())
            .await
            .unwrap()
            .into_iter()
            .find(|j| j.id == job_id)
            .unwrap();
        JobCard::new(Arc::clone(board), job, viewer)
    }

    fn candidate() -> Identity {
        Identity::new("user_candidate", Some("candidate".into()))
    }

    fn recruiter() -> Identity {
        Identity::new("user_recruiter", Some("recruiter".into()))
    }

    #[tokio::test]
    async fn save_refreshes_listing_once() {
        let board = Arc::new(InMemoryBoard::seeded());
        let card = card(&board, 3, &candidate()).await;
        let listing = CountingRefresh::default();

        let chained = card.toggle_saved(&listing).await.unwrap();
        assert!(chained.value);
        assert_eq!(chained.refresh, RefreshStatus::Completed);
        assert_eq!(listing.count.get(), 1);
    }

    #[tokio::test]
    async fn failed_save_does_not_refresh() {
        let board = Arc::new(InMemoryBoard::seeded());
        let card = card(&board, 3, &candidate()).await;
        let listing = CountingRefresh::default();
        board.fail_next("Network unreachable");

        assert!(card.toggle_saved(&listing).await.is_err());
        assert_eq!(listing.count.get(), 0);
        assert!(!card.saved().displayed());
    }

    #[tokio::test]
    async fn poster_deletes_and_refreshes() {
        let board = Arc::new(InMemoryBoard::seeded());
        let card = card(&board, 3, &recruiter()).await;
        let listing = CountingRefresh::default();

        let chained = card.delete(&listing).await.unwrap();
        assert_eq!(chained.value.len(), 1);
        assert_eq!(listing.count.get(), 1);
        assert!(!card.is_deleting());

        let remaining = board.get_jobs(None, &JobFilter::default()).await.unwrap();
        assert!(remaining.iter().all(|j| j.id != 3));
    }

    #[tokio::test]
    async fn only_poster_may_delete() {
        let board = Arc::new(InMemoryBoard::seeded());
        let card = card(&board, 3, &candidate()).await;
        let listing = CountingRefresh::default();

        let err = card.delete(&listing).await.unwrap_err();
        assert!(matches!(err, JobflowError::Forbidden { .. }));
        assert_eq!(board.calls("delete_job"), 0);
    }

    #[tokio::test]
    async fn poster_cannot_save_own_job() {
        let board = Arc::new(InMemoryBoard::seeded());
        let card = card(&board, 3, &recruiter()).await;
        let listing = CountingRefresh::default();

        assert!(card.is_my_job());
        assert!(card.toggle_saved(&listing).await.is_err());
        assert_eq!(board.calls("save_job"), 0);
    }
}
