use std::future::Future;

use tracing::debug;

use crate::operation::{AsyncOperation, OperationError, RemoteCall};

/// Something that can re-fetch the authoritative state of a list.
pub trait Refresh {
    fn refresh(&self) -> impl Future<Output = Result<(), OperationError>>;

    /// False once the surface that owns the list has gone away.
    fn is_live(&self) -> bool {
        true
    }
}

/// A zero-argument read operation is its own refresh target.
impl<C> Refresh for AsyncOperation<C>
where
    C: RemoteCall<Args = ()>,
{
    async fn refresh(&self) -> Result<(), OperationError> {
        self.trigger(()).await.map(drop)
    }

    fn is_live(&self) -> bool {
        AsyncOperation::is_live(self)
    }
}

/// What happened to the dependent refresh of a settled mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshStatus {
    Completed,
    /// The mutation's result did not satisfy the success predicate.
    NotRequested,
    /// The refresh target was disposed before the mutation settled.
    Detached,
    Failed(OperationError),
}

/// A settled mutation together with its dependent refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct Chained<T> {
    pub value: T,
    pub refresh: RefreshStatus,
}

/// Run `mutation`, then refresh `target` exactly once if the mutation
/// succeeded and `accept` holds for its result.
///
/// A failed mutation short-circuits: the error is returned and no refresh is
/// issued. A failed refresh does not undo the mutation; it is reported in
/// [`Chained::refresh`].
pub async fn mutate_then_refresh<T, E, Fut, P, R>(
    mutation: Fut,
    accept: P,
    target: &R,
) -> Result<Chained<T>, E>
where
    Fut: Future<Output = Result<T, E>>,
    P: FnOnce(&T) -> bool,
    R: Refresh,
{
    let value = mutation.await?;

    if !accept(&value) {
        debug!("mutation settled without an accepted result, skipping refresh");
        return Ok(Chained {
            value,
            refresh: RefreshStatus::NotRequested,
        });
    }
    if !target.is_live() {
        debug!("refresh target detached, skipping refresh");
        return Ok(Chained {
            value,
            refresh: RefreshStatus::Detached,
        });
    }

    let refresh = match target.refresh().await {
        Ok(()) => RefreshStatus::Completed,
        Err(OperationError::Detached { .. }) => RefreshStatus::Detached,
        Err(err) => RefreshStatus::Failed(err),
    };
    Ok(Chained { value, refresh })
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::operation::ErrorInfo;

    /// Refresh target that only counts invocations.
    #[derive(Default)]
    pub(crate) struct CountingRefresh {
        pub(crate) count: Cell<usize>,
        pub(crate) dead: Cell<bool>,
    }

    impl Refresh for CountingRefresh {
        async fn refresh(&self) -> Result<(), OperationError> {
            self.count.set(self.count.get() + 1);
            Ok(())
        }

        fn is_live(&self) -> bool {
            !self.dead.get()
        }
    }

    #[tokio::test]
    async fn accepted_result_refreshes_once() {
        let target = CountingRefresh::default();
        let chained = mutate_then_refresh(
            async { Ok::<_, OperationError>(vec![1]) },
            |v: &Vec<i32>| !v.is_empty(),
            &target,
        )
        .await
        .unwrap();
        assert_eq!(chained.refresh, RefreshStatus::Completed);
        assert_eq!(target.count.get(), 1);
    }

    #[tokio::test]
    async fn rejected_result_skips_refresh() {
        let target = CountingRefresh::default();
        let chained = mutate_then_refresh(
            async { Ok::<_, OperationError>(Vec::<i32>::new()) },
            |v: &Vec<i32>| !v.is_empty(),
            &target,
        )
        .await
        .unwrap();
        assert_eq!(chained.refresh, RefreshStatus::NotRequested);
        assert_eq!(target.count.get(), 0);
    }

    #[tokio::test]
    async fn failed_mutation_short_circuits() {
        let target = CountingRefresh::default();
        let err = mutate_then_refresh(
            async { Err::<Vec<i32>, _>(OperationError::Remote(ErrorInfo::new("boom"))) },
            |_: &Vec<i32>| true,
            &target,
        )
        .await
        .unwrap_err();
        assert_eq!(err.remote_info().unwrap().message, "boom");
        assert_eq!(target.count.get(), 0);
    }

    #[tokio::test]
    async fn detached_target_is_not_refreshed() {
        let target = CountingRefresh::default();
        target.dead.set(true);
        let chained =
            mutate_then_refresh(async { Ok::<_, OperationError>(1) }, |_: &i32| true, &target)
                .await
                .unwrap();
        assert_eq!(chained.refresh, RefreshStatus::Detached);
        assert_eq!(target.count.get(), 0);
    }
}
