//! Testing utilities for effects and stores
//!
//! This module provides deterministic stand-ins for the two things an effect
//! talks to: the scheduler and the host store.
//!
//! - [`ManualScheduler`] runs scheduled tasks only when asked and keeps a
//!   simulated clock that moves only when advanced.
//! - [`RecordingStore`] is a minimal host store. It records every dispatched
//!   message, optionally reduces state, and routes dispatches through an
//!   [`Interceptor`] like a real store would.
//!
//! # Examples
//!
//! ```rust
//! use std::time::Duration;
//! use undertow::testing::{ManualScheduler, RecordingStore};
//! use undertow::{Effect, StoreAccess};
//!
//! type Store = RecordingStore<u32, &'static str>;
//!
//! let scheduler = ManualScheduler::new();
//! let store = Store::new(0, scheduler.clone());
//!
//! let ping: Effect<Store> = Effect::new(|access: StoreAccess<Store>| async move {
//!     access.dispatch("ping");
//!     Ok(())
//! })
//! .delay(Duration::from_millis(100));
//!
//! store.queue().push(ping);
//! store.interceptor().flush(&store);
//!
//! scheduler.run_until_stalled();
//! assert!(store.actions().is_empty());
//!
//! scheduler.advance(Duration::from_millis(100));
//! assert_eq!(store.actions(), vec!["ping"]);
//! ```

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::task::{Context, Poll, Waker};
use std::time::Duration;

use futures::channel::oneshot;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::task::ArcWake;

use crate::interceptor::Interceptor;
use crate::queue::EffectQueue;
use crate::scheduler::{BoxFuture, Scheduler, Task};
use crate::store::{Store, StoreAccess};
use crate::sync::lock;

struct Clock {
    now: Duration,
    timers: Vec<(Duration, Waker)>,
}

struct SchedulerInner {
    inbox: Mutex<Vec<Task>>,
    running: Mutex<FuturesUnordered<Task>>,
    clock: Mutex<Clock>,
}

/// Deterministic scheduler with a simulated clock.
///
/// Scheduled tasks sit in an inbox until [`run_until_stalled`] polls them.
/// [`sleep`](Scheduler::sleep) futures complete only when [`advance`] moves
/// the clock past their deadline. Cloning yields another handle to the same
/// scheduler.
///
/// Do not call `pending` or `run_until_stalled` from inside a scheduled
/// task.
///
/// [`run_until_stalled`]: ManualScheduler::run_until_stalled
/// [`advance`]: ManualScheduler::advance
#[derive(Clone)]
pub struct ManualScheduler {
    inner: Arc<SchedulerInner>,
}

impl fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("now", &self.now())
            .field("inbox", &lock(&self.inner.inbox).len())
            .finish()
    }
}

impl Default for ManualScheduler {
    fn default() -> Self {
        Self::new()
    }
}

struct WakeFlag(AtomicBool);

impl ArcWake for WakeFlag {
    fn wake_by_ref(arc_self: &Arc<Self>) {
        arc_self.0.store(true, Ordering::SeqCst);
    }
}

impl ManualScheduler {
    /// A scheduler with no tasks and the clock at zero.
    pub fn new() -> Self {
        ManualScheduler {
            inner: Arc::new(SchedulerInner {
                inbox: Mutex::new(Vec::new()),
                running: Mutex::new(FuturesUnordered::new()),
                clock: Mutex::new(Clock {
                    now: Duration::ZERO,
                    timers: Vec::new(),
                }),
            }),
        }
    }

    /// Time elapsed on the simulated clock.
    pub fn now(&self) -> Duration {
        lock(&self.inner.clock).now
    }

    /// Tasks scheduled and not yet finished.
    pub fn pending(&self) -> usize {
        lock(&self.inner.inbox).len() + lock(&self.inner.running).len()
    }

    /// Poll tasks until none can make progress. Returns how many finished.
    ///
    /// Tasks scheduled by running tasks are picked up in the same call.
    pub fn run_until_stalled(&self) -> usize {
        let flag = Arc::new(WakeFlag(AtomicBool::new(false)));
        let waker = futures::task::waker(flag.clone());
        let mut cx = Context::from_waker(&waker);
        let mut completed = 0;

        let mut running = lock(&self.inner.running);
        loop {
            running.extend(lock(&self.inner.inbox).drain(..));
            flag.0.store(false, Ordering::SeqCst);

            match running.poll_next_unpin(&mut cx) {
                Poll::Ready(Some(())) => completed += 1,
                Poll::Ready(None) => {
                    if lock(&self.inner.inbox).is_empty() {
                        break;
                    }
                }
                Poll::Pending => {
                    let woken = flag.0.load(Ordering::SeqCst);
                    if !woken && lock(&self.inner.inbox).is_empty() {
                        break;
                    }
                }
            }
        }

        completed
    }

    /// Move the clock forward, wake due timers, and run until stalled.
    pub fn advance(&self, duration: Duration) -> usize {
        let due: Vec<Waker> = {
            let mut clock = lock(&self.inner.clock);
            clock.now += duration;
            let now = clock.now;
            let (due, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut clock.timers)
                .into_iter()
                .partition(|(deadline, _)| *deadline <= now);
            clock.timers = waiting;
            due.into_iter().map(|(_, waker)| waker).collect()
        };

        for waker in due {
            waker.wake();
        }

        self.run_until_stalled()
    }

    /// Schedule `fut` and receive its output once it finishes.
    pub fn spawn<F>(&self, fut: F) -> oneshot::Receiver<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.schedule(Box::pin(async move {
            let _ = tx.send(fut.await);
        }));
        rx
    }

    /// Schedule `fut`, run until stalled, and return its output if it
    /// finished.
    pub fn block_on<F>(&self, fut: F) -> Option<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        let mut rx = self.spawn(fut);
        self.run_until_stalled();
        rx.try_recv().ok().flatten()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, task: Task) {
        lock(&self.inner.inbox).push(task);
    }

    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        let deadline = self.now() + duration;
        Box::pin(ManualSleep {
            inner: self.inner.clone(),
            deadline,
        })
    }
}

struct ManualSleep {
    inner: Arc<SchedulerInner>,
    deadline: Duration,
}

impl Future for ManualSleep {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let mut clock = lock(&self.inner.clock);
        if clock.now >= self.deadline {
            Poll::Ready(())
        } else {
            let deadline = self.deadline;
            let registered = clock
                .timers
                .iter()
                .any(|(at, waker)| *at == deadline && waker.will_wake(cx.waker()));
            if !registered {
                clock.timers.push((deadline, cx.waker().clone()));
            }
            Poll::Pending
        }
    }
}

type Reducer<St, M> = Box<dyn Fn(&St, &M, &EffectQueue<RecordingStore<St, M>>) -> St + Send + Sync>;

/// A host store that records every dispatched message.
///
/// Dispatches go through an [`Interceptor`]: the message is recorded, the
/// reducer produces the next state (queueing effects through the queue it is
/// given), and then the queue is flushed onto the scheduler.
///
/// # Example
///
/// ```rust
/// use undertow::testing::{ManualScheduler, RecordingStore};
/// use undertow::{noop, Effect, EffectError, Store};
///
/// type Counter = RecordingStore<u32, u32>;
///
/// let scheduler = ManualScheduler::new();
/// let store = Counter::with_reducer(0, scheduler.clone(), |state, step, queue| {
///     queue.combine(state + step, [noop::<Counter, EffectError>()])
/// });
///
/// store.dispatch(2);
/// store.dispatch(3);
///
/// assert_eq!(store.get_state(), 5);
/// assert_eq!(store.actions(), vec![2, 3]);
/// assert_eq!(scheduler.pending(), 2);
/// ```
pub struct RecordingStore<St, M> {
    state: Mutex<St>,
    actions: Mutex<Vec<M>>,
    reducer: Reducer<St, M>,
    interceptor: Interceptor<RecordingStore<St, M>>,
    this: Weak<RecordingStore<St, M>>,
}

impl<St, M> fmt::Debug for RecordingStore<St, M>
where
    St: fmt::Debug,
    M: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingStore")
            .field("state", &*lock(&self.state))
            .field("actions", &*lock(&self.actions))
            .field("interceptor", &self.interceptor)
            .finish()
    }
}

impl<St, M> RecordingStore<St, M>
where
    St: Clone + Send + 'static,
    M: Clone + Send + 'static,
{
    /// A store whose state never changes.
    pub fn new(initial: St, scheduler: impl Scheduler) -> Arc<Self> {
        Self::with_reducer(initial, scheduler, |state, _, _| state.clone())
    }

    /// A store that reduces every message with `reducer`.
    pub fn with_reducer<R>(initial: St, scheduler: impl Scheduler, reducer: R) -> Arc<Self>
    where
        R: Fn(&St, &M, &EffectQueue<Self>) -> St + Send + Sync + 'static,
    {
        Arc::new_cyclic(|this| RecordingStore {
            state: Mutex::new(initial),
            actions: Mutex::new(Vec::new()),
            reducer: Box::new(reducer),
            interceptor: Interceptor::new(scheduler),
            this: this.clone(),
        })
    }

    /// Every message dispatched so far, in order.
    pub fn actions(&self) -> Vec<M> {
        lock(&self.actions).clone()
    }

    /// Forget recorded messages.
    pub fn clear_actions(&self) {
        lock(&self.actions).clear();
    }

    /// The interceptor in this store's dispatch path.
    pub fn interceptor(&self) -> &Interceptor<Self> {
        &self.interceptor
    }

    /// The queue drained by this store's interceptor.
    pub fn queue(&self) -> &EffectQueue<Self> {
        self.interceptor.queue()
    }

    /// An access handle for running effects against this store directly.
    pub fn access(self: &Arc<Self>) -> StoreAccess<Self> {
        self.interceptor.access(self.clone())
    }
}

impl<St, M> Store for RecordingStore<St, M>
where
    St: Clone + Send + 'static,
    M: Clone + Send + 'static,
{
    type State = St;
    type Message = M;

    fn dispatch(&self, message: M) {
        let Some(this) = self.this.upgrade() else {
            return;
        };

        self.interceptor.intercept(&this, message, |message| {
            lock(&self.actions).push(message.clone());
            let mut state = lock(&self.state);
            let next = (self.reducer)(&*state, message, self.interceptor.queue());
            *state = next;
        });
    }

    fn get_state(&self) -> St {
        lock(&self.state).clone()
    }
}

/// Assert the exact list of messages a [`RecordingStore`] has seen.
///
/// # Example
///
/// ```rust
/// use undertow::assert_dispatched;
/// use undertow::testing::{ManualScheduler, RecordingStore};
/// use undertow::Store;
///
/// let store = RecordingStore::<(), &str>::new((), ManualScheduler::new());
/// store.dispatch("a");
/// assert_dispatched!(store, ["a"]);
/// ```
#[macro_export]
macro_rules! assert_dispatched {
    ($store:expr, [$($action:expr),* $(,)?]) => {
        assert_eq!($store.actions(), ::std::vec![$($action),*]);
    };
}
