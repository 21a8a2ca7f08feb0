//! Combinators that build effects out of other effects.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::effect::Effect;
use crate::either::Either;
use crate::store::{Store, StoreAccess};

/// Run effects one after another.
///
/// Each member starts only after the previous one succeeded. The first
/// failure halts the rest and becomes the failure of the whole sequence.
/// Yields `Some` of the last member's value, or `None` for an empty list.
///
/// # Example
///
/// ```rust,ignore
/// let effect = sequence(vec![save_draft(), publish(), notify()]);
/// ```
pub fn sequence<S, T, E>(effects: impl IntoIterator<Item = Effect<S, T, E>>) -> Effect<S, Option<T>, E>
where
    S: Store,
    T: Send + 'static,
    E: Send + 'static,
{
    let effects: Arc<[Effect<S, T, E>]> = effects.into_iter().collect();

    Effect::new(move |access: StoreAccess<S>| {
        let effects = effects.clone();
        async move {
            let mut last = None;
            for effect in effects.iter() {
                last = Some(effect.run(access.clone()).await?);
            }
            Ok(last)
        }
    })
}

/// Start every effect and return without waiting.
///
/// Each member is invoked in list order in the same turn as the composite,
/// and the future it returns is driven to completion on the scheduler. The
/// composite resolves with `()` once every member has been started. Member
/// results are discarded and member failures are not propagated; they are
/// only logged at debug level. Use [`sequence`] or `and_then` when
/// completion matters.
///
/// # Example
///
/// ```rust,ignore
/// let effect = par(vec![prefetch_avatar(id), prefetch_posts(id)]);
/// ```
pub fn par<S, T, E>(effects: impl IntoIterator<Item = Effect<S, T, E>>) -> Effect<S, (), E>
where
    S: Store,
    T: Send + 'static,
    E: fmt::Debug + Send + 'static,
{
    let effects: Arc<[Effect<S, T, E>]> = effects.into_iter().collect();

    Effect::new(move |access: StoreAccess<S>| {
        for (index, effect) in effects.iter().enumerate() {
            let member = effect.run(access.clone());
            access.spawn(Box::pin(async move {
                if let Err(error) = member.await {
                    tracing::debug!(index, ?error, "parallel effect failed");
                }
            }));
        }
        futures::future::ok(())
    })
}

/// Run `fallback` when `primary` fails.
///
/// On success the primary value is returned and `fallback` never runs. On
/// any failure `fallback` runs with the same access and its outcome becomes
/// the outcome of the composite.
///
/// # Example
///
/// ```rust,ignore
/// let effect = catch(fetch_from_network(id), fetch_from_cache(id));
/// ```
pub fn catch<S, T, E, E2>(primary: Effect<S, T, E>, fallback: Effect<S, T, E2>) -> Effect<S, T, E2>
where
    S: Store,
    T: Send + 'static,
    E: Send + 'static,
    E2: Send + 'static,
{
    Effect::new(move |access: StoreAccess<S>| {
        let first = primary.run(access.clone());
        let fallback = fallback.clone();
        async move {
            match first.await {
                Ok(value) => Ok(value),
                Err(_) => {
                    tracing::trace!("effect failed, running fallback");
                    fallback.run(access).await
                }
            }
        }
    })
}

/// [`catch`] for a fallback with a different result type.
///
/// Yields `Either::Left` with the primary value or `Either::Right` with the
/// fallback value.
pub fn catch_either<S, T, U, E, E2>(
    primary: Effect<S, T, E>,
    fallback: Effect<S, U, E2>,
) -> Effect<S, Either<T, U>, E2>
where
    S: Store,
    T: Send + 'static,
    U: Send + 'static,
    E: Send + 'static,
    E2: Send + 'static,
{
    catch(primary.map(Either::Left), fallback.map(Either::Right))
}

/// Suspend for `duration` on the scheduler clock, then run `effect`.
///
/// The wait is a timer, not a blocking sleep: other effects keep running.
/// The deadline is taken when the delayed effect starts running, not when it
/// is built.
pub fn delay<S, T, E>(duration: Duration, effect: Effect<S, T, E>) -> Effect<S, T, E>
where
    S: Store,
    T: Send + 'static,
    E: Send + 'static,
{
    Effect::new(move |access: StoreAccess<S>| {
        let sleep = access.sleep(duration);
        let effect = effect.clone();
        async move {
            sleep.await;
            effect.run(access).await
        }
    })
}

/// Chain effects of different types in order, yielding the last result.
///
/// `seq!(a, b, c)` is `a.and_then(b).and_then(c)`.
///
/// # Example
///
/// ```rust,ignore
/// let effect = seq!(log_in(creds), load_settings(), show_home());
/// ```
#[macro_export]
macro_rules! seq {
    ($first:expr $(, $rest:expr)* $(,)?) => {
        $first $(.and_then($rest))*
    };
}

/// Fire-and-forget fan-out over effects of different result types.
///
/// `par!(a, b)` is `par(vec![a.discard(), b.discard()])`.
///
/// # Example
///
/// ```rust,ignore
/// let effect = par!(prefetch_avatar(id), prefetch_posts(id));
/// ```
#[macro_export]
macro_rules! par {
    ($($effect:expr),+ $(,)?) => {
        $crate::effect::par(::std::vec![$($crate::Effect::discard($effect)),+])
    };
}
