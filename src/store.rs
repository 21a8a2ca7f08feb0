//! The boundary with the host state pipeline.
//!
//! The crate does not own a store. The host implements [`Store`], and every
//! effect invocation receives a [`StoreAccess`]: the capability to dispatch
//! messages and read the committed state, plus the scheduler the effect is
//! running on.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::scheduler::{BoxFuture, Scheduler, SharedScheduler, Task};

/// A host store.
///
/// `dispatch` may start a new update cycle recursively, including one that
/// runs through an [`Interceptor`](crate::Interceptor).
///
/// # Example
///
/// ```rust,ignore
/// struct AppStore { /* reducer, state, interceptor */ }
///
/// impl Store for AppStore {
///     type State = AppState;
///     type Message = AppMessage;
///
///     fn dispatch(&self, message: AppMessage) { /* ... */ }
///     fn get_state(&self) -> AppState { /* ... */ }
/// }
/// ```
pub trait Store: Send + Sync + 'static {
    /// The committed state snapshot type.
    type State;

    /// Messages accepted by `dispatch`.
    type Message;

    /// Apply a state transition.
    fn dispatch(&self, message: Self::Message);

    /// The current committed state at call time.
    fn get_state(&self) -> Self::State;
}

/// Capability injected into an effect when it runs.
///
/// Cheap to clone. Combinators pass the same access to every effect they run.
pub struct StoreAccess<S> {
    store: Arc<S>,
    scheduler: SharedScheduler,
}

impl<S> Clone for StoreAccess<S> {
    fn clone(&self) -> Self {
        StoreAccess {
            store: self.store.clone(),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<S> fmt::Debug for StoreAccess<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreAccess")
            .field("store", &"<store>")
            .field("scheduler", &"<scheduler>")
            .finish()
    }
}

impl<S: Store> StoreAccess<S> {
    /// Build an access handle for `store`, scheduling on `scheduler`.
    pub fn new(store: Arc<S>, scheduler: impl Scheduler) -> Self {
        Self::from_shared(store, Arc::new(scheduler))
    }

    pub(crate) fn from_shared(store: Arc<S>, scheduler: SharedScheduler) -> Self {
        StoreAccess { store, scheduler }
    }

    /// Dispatch a message to the host store.
    pub fn dispatch(&self, message: S::Message) {
        self.store.dispatch(message)
    }

    /// Read the committed state.
    pub fn get_state(&self) -> S::State {
        self.store.get_state()
    }

    /// Suspend on the scheduler's clock.
    pub fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        self.scheduler.sleep(duration)
    }

    /// The host store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    pub(crate) fn spawn(&self, task: Task) {
        self.scheduler.schedule(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ManualScheduler, RecordingStore};

    type TestStore = RecordingStore<&'static str, u8>;

    #[test]
    fn test_access_forwards_to_store() {
        let scheduler = ManualScheduler::new();
        let store = TestStore::new("ready", scheduler.clone());
        let access = StoreAccess::new(store.clone(), scheduler);

        access.dispatch(1);
        access.clone().dispatch(2);

        assert_eq!(access.get_state(), "ready");
        assert_eq!(store.actions(), vec![1, 2]);
        assert!(Arc::ptr_eq(access.store(), &store));
    }

    #[test]
    fn test_access_sleeps_on_its_scheduler() {
        let scheduler = ManualScheduler::new();
        let store = TestStore::new("ready", scheduler.clone());
        let access = StoreAccess::new(store, scheduler.clone());

        let mut done = scheduler.spawn(access.sleep(Duration::from_secs(3)));
        scheduler.advance(Duration::from_secs(2));
        assert_eq!(done.try_recv(), Ok(None));

        scheduler.advance(Duration::from_secs(1));
        assert_eq!(done.try_recv(), Ok(Some(())));
    }

    #[test]
    fn test_debug_hides_internals() {
        let scheduler = ManualScheduler::new();
        let access = StoreAccess::new(TestStore::new("x", scheduler.clone()), scheduler);

        assert_eq!(
            format!("{:?}", access),
            "StoreAccess { store: \"<store>\", scheduler: \"<scheduler>\" }"
        );
    }
}
