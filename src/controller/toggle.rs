use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::error::JobflowError;
use crate::operation::{AsyncOperation, OperationState};
use crate::remote::api::SaveJobCall;
use crate::remote::{JobBoardApi, JobId, SaveJobRequest, SavedJob, UserId};

/// What a saved-job control shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleView {
    /// Last state confirmed by the server.
    pub confirmed: bool,
    /// Intent shown while the mutation is in flight.
    pub pending: Option<bool>,
}

impl ToggleView {
    pub fn displayed(&self) -> bool {
        self.pending.unwrap_or(self.confirmed)
    }
}

/// Optimistic "saved" toggle for one `(user, job)` pair.
///
/// The intent is only ever displayed while the mutation is in flight. On
/// settlement the confirmed state is derived from the result shape (any row
/// means saved), so a failed mutation leaves nothing to roll back.
pub struct SavedJobToggle<R: JobBoardApi> {
    user_id: UserId,
    job_id: JobId,
    op: AsyncOperation<SaveJobCall<R>>,
    view: watch::Sender<ToggleView>,
}

impl<R: JobBoardApi> SavedJobToggle<R> {
    pub fn new(api: Arc<R>, user_id: UserId, job_id: JobId, saved_init: bool) -> Self {
        let (view, _) = watch::channel(ToggleView {
            confirmed: saved_init,
            pending: None,
        });
        Self {
            user_id,
            job_id,
            op: AsyncOperation::new("save_job", SaveJobCall { api }, ()),
            view,
        }
    }

    pub fn view(&self) -> ToggleView {
        *self.view.borrow()
    }

    pub fn displayed(&self) -> bool {
        self.view().displayed()
    }

    pub fn is_saved(&self) -> bool {
        self.view().confirmed
    }

    pub fn subscribe(&self) -> watch::Receiver<ToggleView> {
        self.view.subscribe()
    }

    pub fn state(&self) -> OperationState<Vec<SavedJob>> {
        self.op.state()
    }

    /// Flip the saved state. The request carries the state the user saw, and
    /// the server decides between save and unsave from it.
    ///
    /// The control is disabled while a toggle is in flight: a second call
    /// returns [`JobflowError::Busy`] without touching the server.
    pub async fn toggle(&self) -> Result<bool, JobflowError> {
        if self.op.is_loading() {
            return Err(JobflowError::Busy {
                operation: self.op.name(),
            });
        }

        let current = self.view.borrow().confirmed;
        let intent = Intent::show(&self.view, !current);
        debug!(job_id = self.job_id, from = current, "toggling saved job");

        let request = SaveJobRequest {
            user_id: self.user_id.clone(),
            job_id: self.job_id,
            already_saved: current,
        };
        let result = self.op.trigger(request).await;

        if let Ok(rows) = &result {
            self.view.send_modify(|v| v.confirmed = !rows.is_empty());
        }
        drop(intent);

        match result {
            Ok(_) => {
                let saved = self.is_saved();
                info!(job_id = self.job_id, saved, "saved job toggled");
                Ok(saved)
            }
            Err(err) => Err(err.into()),
        }
    }
}

/// Pending intent on display; withdrawn when the toggle settles or is dropped.
struct Intent<'a> {
    view: &'a watch::Sender<ToggleView>,
}

impl<'a> Intent<'a> {
    fn show(view: &'a watch::Sender<ToggleView>, saved: bool) -> Self {
        view.send_modify(|v| v.pending = Some(saved));
        Self { view }
    }
}

impl Drop for Intent<'_> {
    fn drop(&mut self) {
        self.view.send_if_modified(|v| v.pending.take().is_some());
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::remote::{InMemoryBoard, JobFilter};

    const JOB: JobId = 3;

    fn toggle_for(board: &Arc<InMemoryBoard>, saved_init: bool) -> SavedJobToggle<InMemoryBoard> {
        SavedJobToggle::new(Arc::clone(board), "user_c".into(), JOB, saved_init)
    }

    async fn saved_rows(board: &InMemoryBoard) -> usize {
        board
            .get_jobs(Some("user_c"), &JobFilter::default())
            .await
            .unwrap()
            .iter()
            .filter(|j| j.id == JOB)
            .map(|j| j.saved.len())
            .sum()
    }

    #[tokio::test]
    async fn save_then_unsave_leaves_no_residue() {
        let board = Arc::new(InMemoryBoard::seeded());
        let toggle = toggle_for(&board, false);

        assert!(toggle.toggle().await.unwrap());
        assert!(toggle.displayed());

        assert!(!toggle.toggle().await.unwrap());
        let view = toggle.view();
        assert!(!view.confirmed);
        assert_eq!(view.pending, None);
        assert_eq!(saved_rows(&board).await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn intent_is_displayed_while_in_flight() {
        let board = Arc::new(InMemoryBoard::seeded());
        board.push_delay(Duration::from_millis(50));
        let toggle = toggle_for(&board, false);

        let (result, ()) = tokio::join!(toggle.toggle(), async {
            assert!(toggle.displayed());
            assert!(!toggle.is_saved());
            assert!(toggle.state().loading);
        });

        assert!(result.unwrap());
        assert_eq!(toggle.view().pending, None);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_reverts_display_and_keeps_data() {
        let board = Arc::new(InMemoryBoard::seeded());
        let toggle = toggle_for(&board, false);
        assert!(toggle.toggle().await.unwrap());

        board.push_delay(Duration::from_millis(20));
        board.fail_next("Network unreachable");
        let (result, ()) = tokio::join!(toggle.toggle(), async {
            // Optimistically shown as unsaved.
            assert!(!toggle.displayed());
        });

        let err = result.unwrap_err();
        assert_eq!(err.remote_info().unwrap().message, "Network unreachable");
        assert!(toggle.displayed());
        let state = toggle.state();
        assert_eq!(state.error.unwrap().message, "Network unreachable");
        assert!(!state.loading);
        assert_eq!(state.data.map(|rows| rows.len()), Some(1));
    }

    #[tokio::test]
    async fn duplicate_save_is_not_an_error() {
        let board = Arc::new(InMemoryBoard::seeded());
        let first_card = toggle_for(&board, false);
        let stale_card = toggle_for(&board, false);

        assert!(first_card.toggle().await.unwrap());
        // The second card still believes the job is unsaved and asks again.
        assert!(stale_card.toggle().await.unwrap());
        assert!(stale_card.state().error.is_none());
        assert_eq!(stale_card.displayed(), first_card.displayed());
        assert_eq!(saved_rows(&board).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn second_toggle_while_in_flight_is_refused() {
        let board = Arc::new(InMemoryBoard::seeded());
        board.push_delay(Duration::from_millis(50));
        let toggle = toggle_for(&board, false);

        let (first, second) = tokio::join!(toggle.toggle(), toggle.toggle());

        assert!(first.unwrap());
        assert!(matches!(second, Err(JobflowError::Busy { operation: "save_job" })));
        assert_eq!(board.calls("save_job"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_toggle_withdraws_intent_and_stays_usable() {
        let board = Arc::new(InMemoryBoard::seeded());
        board.push_delay(Duration::from_millis(500));
        let toggle = toggle_for(&board, false);

        let abandoned = tokio::time::timeout(Duration::from_millis(10), toggle.toggle()).await;
        assert!(abandoned.is_err());

        let view = toggle.view();
        assert_eq!(view.pending, None);
        assert!(!view.confirmed);
        assert!(!toggle.displayed());
        assert!(!toggle.state().loading);

        assert!(toggle.toggle().await.unwrap());
        assert!(toggle.is_saved());
        assert_eq!(saved_rows(&board).await, 1);
    }
}
