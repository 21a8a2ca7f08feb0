//! Commit first, then flush.
//!
//! The [`Interceptor`] sits in the host's dispatch path. For every message it
//! lets the rest of the pipeline (`next`) apply the update and notify its
//! synchronous listeners, then drains the [`EffectQueue`] and hands each
//! effect to the scheduler. Effects therefore always observe the state their
//! cycle produced, and never run inside it.
//!
//! # Example
//!
//! ```rust,ignore
//! impl Store for AppStore {
//!     type State = AppState;
//!     type Message = Msg;
//!
//!     fn dispatch(&self, msg: Msg) {
//!         let this = self.this.upgrade().expect("store alive");
//!         self.interceptor.intercept(&this, msg, |msg| {
//!             let mut state = self.state.lock().unwrap();
//!             *state = reduce(&state, msg, self.interceptor.queue());
//!         });
//!     }
//!
//!     fn get_state(&self) -> AppState {
//!         self.state.lock().unwrap().clone()
//!     }
//! }
//! ```

use std::fmt;
use std::sync::Arc;

use crate::queue::EffectQueue;
use crate::scheduler::{Scheduler, SharedScheduler};
use crate::store::{Store, StoreAccess};

/// Drains a store's effect queue after each committed update.
pub struct Interceptor<S> {
    queue: EffectQueue<S>,
    scheduler: SharedScheduler,
}

impl<S> fmt::Debug for Interceptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptor")
            .field("queue", &self.queue)
            .field("scheduler", &"<scheduler>")
            .finish()
    }
}

impl<S: Store> Interceptor<S> {
    /// An interceptor owning a fresh queue.
    pub fn new(scheduler: impl Scheduler) -> Self {
        Self::with_queue(EffectQueue::new(), scheduler)
    }

    /// An interceptor draining an existing queue.
    pub fn with_queue(queue: EffectQueue<S>, scheduler: impl Scheduler) -> Self {
        Interceptor {
            queue,
            scheduler: Arc::new(scheduler),
        }
    }

    /// The queue application code appends to.
    pub fn queue(&self) -> &EffectQueue<S> {
        &self.queue
    }

    /// The access handle effects of this interceptor run with.
    pub fn access(&self, store: Arc<S>) -> StoreAccess<S> {
        StoreAccess::from_shared(store, self.scheduler.clone())
    }

    /// Run `next` with `action`, flush the queue, return `action` unchanged.
    ///
    /// `next` must apply the update and run every synchronous listener
    /// before it returns.
    pub fn intercept<N>(&self, store: &Arc<S>, action: S::Message, next: N) -> S::Message
    where
        N: FnOnce(&S::Message),
    {
        next(&action);
        self.flush(store);
        action
    }

    /// Schedule every pending effect and clear the queue.
    ///
    /// Returns the number of effects scheduled. Effects are scheduled in the
    /// order they were queued; none of them is invoked before this returns.
    pub fn flush(&self, store: &Arc<S>) -> usize {
        let pending = self.queue.begin_flush();
        let count = pending.len();

        if count > 0 {
            tracing::debug!(count, "flushing effect queue");
            let access = self.access(store.clone());
            for job in pending {
                self.scheduler.schedule(job(access.clone()));
            }
        }

        self.queue.end_flush();
        count
    }
}
