//! The asynchronous task boundary effects run on.
//!
//! Effects never run inline with the state update that produced them. The
//! interceptor hands every queued effect to a [`Scheduler`], which runs it
//! later. The scheduler also provides the timer used by
//! [`delay`](crate::effect::delay), so that a test scheduler can control both
//! when tasks run and what time it is.
//!
//! Two schedulers ship with the crate:
//!
//! - [`TokioScheduler`] (feature `async`, on by default) spawns onto a tokio
//!   runtime and sleeps with `tokio::time::sleep`.
//! - [`ManualScheduler`](crate::testing::ManualScheduler) runs tasks only when
//!   asked and advances a simulated clock by hand.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// A boxed future that is Send
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A unit of scheduled work.
pub type Task = BoxFuture<'static, ()>;

/// Defers tasks to an asynchronous boundary.
///
/// Implementations must never poll `task` from inside `schedule`: the caller
/// may be in the middle of a state update.
pub trait Scheduler: Send + Sync + 'static {
    /// Queue `task` to run later.
    fn schedule(&self, task: Task);

    /// A future that completes once `duration` has elapsed on this
    /// scheduler's clock.
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

impl<S: Scheduler + ?Sized> Scheduler for Arc<S> {
    fn schedule(&self, task: Task) {
        (**self).schedule(task)
    }

    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        (**self).sleep(duration)
    }
}

/// Shared, type-erased scheduler handle.
pub(crate) type SharedScheduler = Arc<dyn Scheduler>;

/// Scheduler backed by a tokio runtime.
///
/// # Example
///
/// ```
/// use undertow::TokioScheduler;
///
/// # tokio_test::block_on(async {
/// let scheduler = TokioScheduler::try_current().expect("inside a runtime");
/// # let _ = scheduler;
/// # });
/// ```
#[cfg(feature = "async")]
#[derive(Debug, Clone)]
pub struct TokioScheduler {
    handle: tokio::runtime::Handle,
}

#[cfg(feature = "async")]
impl TokioScheduler {
    /// Schedule onto the runtime behind `handle`.
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        TokioScheduler { handle }
    }

    /// Schedule onto the runtime the caller is running in, if any.
    pub fn try_current() -> Option<Self> {
        tokio::runtime::Handle::try_current().ok().map(Self::new)
    }
}

#[cfg(feature = "async")]
impl Scheduler for TokioScheduler {
    fn schedule(&self, task: Task) {
        // Detached; the join handle is not needed.
        drop(self.handle.spawn(task));
    }

    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}
