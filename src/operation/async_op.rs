use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::state::{ErrorInfo, OperationState};
use crate::remote::RemoteError;

/// One remote function, seen from the lifecycle wrapper.
///
/// `Fixed` is bound once when the operation is built (a job id known for the
/// lifetime of a card, for example); `Args` is supplied on every trigger.
pub trait RemoteCall {
    type Fixed: Clone;
    type Args;
    type Output: Clone;

    fn call(
        &self,
        fixed: Self::Fixed,
        args: Self::Args,
    ) -> impl Future<Output = Result<Self::Output, RemoteError>>;
}

/// Decides which settlement owns the shared state when invocations overlap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SettlementPolicy {
    /// Only the most recently started invocation may write; older
    /// settlements are discarded and reported as [`OperationError::Superseded`].
    #[default]
    LatestInvocation,
    /// Every settlement writes, so whichever finishes last wins.
    LastSettled,
}

/// Why a trigger did not yield a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OperationError {
    #[error("{0}")]
    Remote(ErrorInfo),

    #[error("{operation}: invocation {generation} was superseded by invocation {latest}")]
    Superseded {
        operation: &'static str,
        generation: u64,
        latest: u64,
    },

    #[error("{operation}: settled after the operation was disposed")]
    Detached { operation: &'static str },
}

impl OperationError {
    /// The inline message for a remote failure, if this is one.
    pub fn remote_info(&self) -> Option<&ErrorInfo> {
        match self {
            OperationError::Remote(info) => Some(info),
            _ => None,
        }
    }
}

/// Lifecycle wrapper around a single [`RemoteCall`].
///
/// State is published through a watch channel that only [`trigger`](Self::trigger)
/// writes. Overlapping triggers are allowed; each captures a generation
/// number at start, and `loading` stays true until every outstanding
/// invocation has settled.
pub struct AsyncOperation<C: RemoteCall> {
    name: &'static str,
    call: C,
    fixed: C::Fixed,
    policy: SettlementPolicy,
    state: watch::Sender<OperationState<C::Output>>,
    generation: AtomicU64,
    outstanding: AtomicUsize,
    live: AtomicBool,
}

impl<C: RemoteCall> AsyncOperation<C> {
    pub fn new(name: &'static str, call: C, fixed: C::Fixed) -> Self {
        let (state, _) = watch::channel(OperationState::default());
        Self {
            name,
            call,
            fixed,
            policy: SettlementPolicy::default(),
            state,
            generation: AtomicU64::new(0),
            outstanding: AtomicUsize::new(0),
            live: AtomicBool::new(true),
        }
    }

    pub fn with_policy(mut self, policy: SettlementPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn policy(&self) -> SettlementPolicy {
        self.policy
    }

    /// Snapshot of the current `{data, error, loading}` triple.
    pub fn state(&self) -> OperationState<C::Output> {
        self.state.borrow().clone()
    }

    pub fn data(&self) -> Option<C::Output> {
        self.state.borrow().data.clone()
    }

    pub fn error(&self) -> Option<ErrorInfo> {
        self.state.borrow().error.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Binding for the one view that renders this operation.
    pub fn subscribe(&self) -> watch::Receiver<OperationState<C::Output>> {
        self.state.subscribe()
    }

    /// Generation of the most recently started invocation (0 before any).
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Detach the operation from its view. Invocations that settle afterwards
    /// write nothing and report [`OperationError::Detached`].
    pub fn dispose(&self) {
        if self.live.swap(false, Ordering::SeqCst) {
            debug!(operation = self.name, "operation disposed");
        }
    }

    pub fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    /// Invoke the remote call with the fixed arguments plus `args`.
    ///
    /// Returns the caller's own result so chained logic does not need to
    /// re-read shared state. Under [`SettlementPolicy::LatestInvocation`] a
    /// success that settles after a newer trigger started is discarded and
    /// returned as `Superseded`; a stale failure is still returned as
    /// `Remote` but does not overwrite the state.
    pub async fn trigger(&self, args: C::Args) -> Result<C::Output, OperationError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let outstanding = Outstanding::acquire(self, generation);
        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
        debug!(operation = self.name, generation, "invoking remote call");

        let result = self.call.call(self.fixed.clone(), args).await;

        let remaining = outstanding.release();
        if !self.is_live() {
            debug!(operation = self.name, generation, "dropping settlement of disposed operation");
            return Err(OperationError::Detached {
                operation: self.name,
            });
        }

        let latest = self.generation();
        let authoritative = match self.policy {
            SettlementPolicy::LatestInvocation => generation == latest,
            SettlementPolicy::LastSettled => true,
        };

        match result {
            Ok(value) if authoritative => {
                self.state.send_modify(|s| {
                    s.data = Some(value.clone());
                    s.error = None;
                    s.loading = remaining > 0;
                });
                debug!(operation = self.name, generation, "settled with data");
                Ok(value)
            }
            Ok(_) => {
                self.state.send_modify(|s| s.loading = remaining > 0);
                debug!(operation = self.name, generation, latest, "discarded stale settlement");
                Err(OperationError::Superseded {
                    operation: self.name,
                    generation,
                    latest,
                })
            }
            Err(err) => {
                let info = ErrorInfo::from(&err);
                warn!(operation = self.name, generation, error = %err, "remote call failed");
                self.state.send_modify(|s| {
                    if authoritative {
                        s.error = Some(info.clone());
                    }
                    s.loading = remaining > 0;
                });
                Err(OperationError::Remote(info))
            }
        }
    }
}

/// One invocation counted as outstanding.
///
/// Dropping the guard without [`release`](Self::release) means the trigger
/// future was dropped mid-call; the count is returned and `loading` is
/// recomputed so the operation does not stay busy forever.
struct Outstanding<'a, C: RemoteCall> {
    op: &'a AsyncOperation<C>,
    generation: u64,
    released: bool,
}

impl<'a, C: RemoteCall> Outstanding<'a, C> {
    fn acquire(op: &'a AsyncOperation<C>, generation: u64) -> Self {
        op.outstanding.fetch_add(1, Ordering::SeqCst);
        Self {
            op,
            generation,
            released: false,
        }
    }

    /// Invocations still outstanding after this one.
    fn release(mut self) -> usize {
        self.released = true;
        self.op.outstanding.fetch_sub(1, Ordering::SeqCst) - 1
    }
}

impl<C: RemoteCall> Drop for Outstanding<'_, C> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let remaining = self.op.outstanding.fetch_sub(1, Ordering::SeqCst) - 1;
        debug!(
            operation = self.op.name,
            generation = self.generation,
            "invocation dropped before settling"
        );
        if self.op.is_live() {
            self.op.state.send_modify(|s| s.loading = remaining > 0);
        }
    }
}
