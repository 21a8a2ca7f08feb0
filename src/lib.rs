//! # Undertow
//!
//! > *What happens after the wave breaks.*
//!
//! A Rust library for deferred effects in unidirectional state stores.
//!
//! ## Philosophy
//!
//! A state update says **what changed**. An effect says **what should happen
//! as a result**. Undertow keeps the two apart:
//!
//! - The reducer returns the next state and *queues* effects alongside it
//! - The [`Interceptor`] commits the update and lets every synchronous
//!   listener see it
//! - Only then are the queued effects handed to a [`Scheduler`]
//!
//! Effects never run inside the update that produced them.
//!
//! ## Quick Example
//!
//! ```rust
//! use undertow::testing::{ManualScheduler, RecordingStore};
//! use undertow::{Effect, EffectQueue, Store, StoreAccess};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! enum Msg {
//!     Load,
//!     Loaded(String),
//! }
//!
//! type AppStore = RecordingStore<Option<String>, Msg>;
//!
//! fn load_greeting() -> Effect<AppStore> {
//!     Effect::new(|access: StoreAccess<AppStore>| async move {
//!         access.dispatch(Msg::Loaded("hello".to_string()));
//!         Ok(())
//!     })
//! }
//!
//! fn reduce(_state: &Option<String>, msg: &Msg, queue: &EffectQueue<AppStore>) -> Option<String> {
//!     match msg {
//!         Msg::Load => queue.combine(None, [load_greeting()]),
//!         Msg::Loaded(text) => Some(text.clone()),
//!     }
//! }
//!
//! let scheduler = ManualScheduler::new();
//! let store = AppStore::with_reducer(None, scheduler.clone(), reduce);
//!
//! store.dispatch(Msg::Load);
//! // The update is committed; the effect has not run yet.
//! assert_eq!(store.get_state(), None);
//!
//! scheduler.run_until_stalled();
//! assert_eq!(store.get_state(), Some("hello".to_string()));
//! assert_eq!(store.actions(), vec![Msg::Load, Msg::Loaded("hello".to_string())]);
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod effect;
pub mod either;
pub mod error;
pub mod interceptor;
pub mod queue;
pub mod scheduler;
pub mod store;
mod sync;
pub mod testing;

// Re-exports
pub use effect::{catch, catch_either, delay, fail, from_fn, noop, par, pure, sequence, Effect};
pub use either::Either;
pub use error::EffectError;
pub use interceptor::Interceptor;
pub use queue::{EffectQueue, Phase};
#[cfg(feature = "async")]
pub use scheduler::TokioScheduler;
pub use scheduler::{BoxFuture, Scheduler, Task};
pub use store::{Store, StoreAccess};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::effect::prelude::*;
    pub use crate::interceptor::Interceptor;
    pub use crate::scheduler::Scheduler;
}
