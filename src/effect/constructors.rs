//! Constructors for leaf effects.
//!
//! These build effects that do not wrap other effects. Use [`Effect::new`]
//! for arbitrary async work.

use crate::effect::Effect;
use crate::store::{Store, StoreAccess};

/// An effect that does nothing and succeeds with `()`.
///
/// The identity for composition: `noop().and_then(e)` behaves like `e`.
///
/// # Example
///
/// ```rust,ignore
/// let placeholder: Effect<AppStore> = noop();
/// ```
pub fn noop<S, E>() -> Effect<S, (), E>
where
    S: Store,
    E: Send + 'static,
{
    Effect::new(|_| futures::future::ok(()))
}

/// An effect that succeeds with `value` every time it runs.
pub fn pure<S, T, E>(value: T) -> Effect<S, T, E>
where
    S: Store,
    T: Clone + Send + Sync + 'static,
    E: Send + 'static,
{
    Effect::new(move |_| futures::future::ok(value.clone()))
}

/// An effect that fails with `error` every time it runs.
pub fn fail<S, T, E>(error: E) -> Effect<S, T, E>
where
    S: Store,
    T: Send + 'static,
    E: Clone + Send + Sync + 'static,
{
    Effect::new(move |_| futures::future::err(error.clone()))
}

/// An effect from a synchronous function of the store access.
///
/// `f` runs when the effect runs, never when it is built.
///
/// # Example
///
/// ```rust,ignore
/// let announce = from_fn(|access: &StoreAccess<AppStore>| {
///     let count = access.get_state().items.len();
///     access.dispatch(Msg::Announce(count));
///     Ok::<_, EffectError>(count)
/// });
/// ```
pub fn from_fn<S, T, E, F>(f: F) -> Effect<S, T, E>
where
    S: Store,
    T: Send + 'static,
    E: Send + 'static,
    F: Fn(&StoreAccess<S>) -> Result<T, E> + Send + Sync + 'static,
{
    Effect::new(move |access: StoreAccess<S>| futures::future::ready(f(&access)))
}
