//! The per-store buffer of effects awaiting the end of the update cycle.
//!
//! Application code hands effects to the queue while producing the next
//! state, through [`EffectQueue::combine`] or the [`combine!`](crate::combine)
//! macro. Nothing runs yet. When the [`Interceptor`](crate::Interceptor) sees
//! the update committed it drains the queue and schedules every effect.
//!
//! A cycle moves through [`Phase::Idle`], [`Phase::Collecting`] and
//! [`Phase::Flushing`]. The pending list is swapped out at the start of a
//! flush, so anything pushed while flushing lands in the next cycle.

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::effect::Effect;
use crate::scheduler::Task;
use crate::store::{Store, StoreAccess};
use crate::sync::lock;

/// Where the queue is in its update cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing pending.
    Idle,
    /// Effects have been appended since the last flush.
    Collecting,
    /// The interceptor is scheduling the drained effects.
    Flushing,
}

pub(crate) type Job<S> = Box<dyn FnOnce(StoreAccess<S>) -> Task + Send>;

struct QueueState<S> {
    pending: Vec<Job<S>>,
    phase: Phase,
}

/// Ordered buffer of effects for one store.
///
/// Cloning yields another handle to the same queue.
///
/// # Example
///
/// ```rust,ignore
/// fn reduce(state: &AppState, msg: &Msg, queue: &EffectQueue<AppStore>) -> AppState {
///     match msg {
///         Msg::Load(id) => queue.combine(state.loading(), [fetch_user(*id)]),
///         _ => state.clone(),
///     }
/// }
/// ```
pub struct EffectQueue<S> {
    inner: Arc<Mutex<QueueState<S>>>,
}

impl<S> Clone for EffectQueue<S> {
    fn clone(&self) -> Self {
        EffectQueue {
            inner: self.inner.clone(),
        }
    }
}

impl<S> fmt::Debug for EffectQueue<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = lock(&self.inner);
        f.debug_struct("EffectQueue")
            .field("pending", &state.pending.len())
            .field("phase", &state.phase)
            .finish()
    }
}

impl<S: Store> Default for EffectQueue<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Store> EffectQueue<S> {
    /// An empty, idle queue.
    pub fn new() -> Self {
        EffectQueue {
            inner: Arc::new(Mutex::new(QueueState {
                pending: Vec::new(),
                phase: Phase::Idle,
            })),
        }
    }

    /// Append one effect to the current cycle.
    ///
    /// The effect is not invoked here. Its failure, once scheduled, is only
    /// logged at debug level.
    pub fn push<T, E>(&self, effect: Effect<S, T, E>)
    where
        T: Send + 'static,
        E: fmt::Debug + Send + 'static,
    {
        let job: Job<S> = Box::new(move |access: StoreAccess<S>| -> Task {
            Box::pin(async move {
                if let Err(error) = effect.run(access).await {
                    tracing::debug!(?error, "queued effect failed");
                }
            })
        });

        let mut state = lock(&self.inner);
        state.pending.push(job);
        if state.phase == Phase::Idle {
            state.phase = Phase::Collecting;
        }
        tracing::trace!(pending = state.pending.len(), "effect queued");
    }

    /// Return `next_state` unchanged after appending `effects` in order.
    ///
    /// This is the entry point application code calls while producing a new
    /// state. It may be called any number of times within one update.
    pub fn combine<St, T, E>(
        &self,
        next_state: St,
        effects: impl IntoIterator<Item = Effect<S, T, E>>,
    ) -> St
    where
        T: Send + 'static,
        E: fmt::Debug + Send + 'static,
    {
        for effect in effects {
            self.push(effect);
        }
        next_state
    }

    /// Number of effects waiting for the next flush.
    pub fn len(&self) -> usize {
        lock(&self.inner).pending.len()
    }

    /// Returns `true` if no effect is waiting.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The current cycle phase.
    pub fn phase(&self) -> Phase {
        lock(&self.inner).phase
    }

    pub(crate) fn begin_flush(&self) -> Vec<Job<S>> {
        let mut state = lock(&self.inner);
        state.phase = Phase::Flushing;
        std::mem::take(&mut state.pending)
    }

    pub(crate) fn end_flush(&self) {
        let mut state = lock(&self.inner);
        state.phase = if state.pending.is_empty() {
            Phase::Idle
        } else {
            Phase::Collecting
        };
    }
}

/// Return a state after appending effects of any types to a queue.
///
/// `combine!(queue, next_state, e1, e2)` evaluates `next_state`, pushes `e1`
/// then `e2`, and yields the state.
///
/// # Example
///
/// ```rust,ignore
/// let next = combine!(queue, state.loading(), fetch_user(id), log_visit(id));
/// ```
#[macro_export]
macro_rules! combine {
    ($queue:expr, $state:expr $(, $effect:expr)* $(,)?) => {{
        let queue = &$queue;
        let state = $state;
        $( queue.push($effect); )*
        state
    }};
}
