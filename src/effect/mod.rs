//! Deferred effects and the algebra for composing them.
//!
//! An [`Effect`] is a value describing asynchronous work over a
//! [`StoreAccess`]. Building one does nothing; running it does. Every
//! combinator returns a new effect and leaves its inputs untouched, so an
//! effect can be stored, cloned, queued and run any number of times. Each run
//! performs the underlying work again.
//!
//! # Composition at a glance
//!
//! | Combinator | Runs | Result |
//! |------------|------|--------|
//! | `a.and_then(b)` | `a`, then `b` if `a` succeeded | `b`'s result |
//! | `a.fmap(f)` | `a`, then `f(result)` if `a` succeeded | the produced effect's result |
//! | `a.map(f)` | `a` | `f(result)` |
//! | [`sequence`] / [`seq!`](crate::seq) | each member in order, halting on failure | last result |
//! | [`par`] / [`par!`](crate::par) | starts every member, without waiting | `()` |
//! | [`catch`] / `a.catch(b)` | `a`, then `b` only if `a` failed | whichever ran last |
//! | [`delay`] / `a.delay(d)` | `a` after `d` on the scheduler clock | `a`'s result |
//! | [`noop`] | nothing | `()` |
//!
//! # Example
//!
//! ```rust,ignore
//! use undertow::prelude::*;
//!
//! fn fetch_user(api: Api, id: u64) -> Effect<AppStore> {
//!     Effect::new(move |access: StoreAccess<AppStore>| {
//!         let api = api.clone();
//!         async move {
//!             match api.fetch_user(id).await {
//!                 Ok(user) => access.dispatch(Msg::UserLoaded(user)),
//!                 Err(_) => access.dispatch(Msg::UserFailed),
//!             }
//!             Ok(())
//!         }
//!     })
//! }
//!
//! let refresh = fetch_user(api.clone(), 1)
//!     .and_then(fetch_user(api, 2))
//!     .delay(Duration::from_secs(5));
//! ```

mod combinators;
mod constructors;
pub mod prelude;

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::Instrument as _;

use crate::either::Either;
use crate::error::EffectError;
use crate::scheduler::BoxFuture;
use crate::store::{Store, StoreAccess};

pub use combinators::{catch, catch_either, delay, par, sequence};
pub use constructors::{fail, from_fn, noop, pure};

type RunFn<S, T, E> =
    Arc<dyn Fn(StoreAccess<S>) -> BoxFuture<'static, Result<T, E>> + Send + Sync>;

/// Deferred asynchronous work over a store.
///
/// `Effect<S, T, E>` runs against a [`StoreAccess<S>`] and produces
/// `Ok(T)` or fails with `E`.
///
/// # Type Parameters
///
/// * `S` - The host store the effect dispatches to
/// * `T` - The success value (defaults to `()`)
/// * `E` - The failure (defaults to [`EffectError`])
pub struct Effect<S, T = (), E = EffectError> {
    run_fn: RunFn<S, T, E>,
}

impl<S, T, E> Clone for Effect<S, T, E> {
    fn clone(&self) -> Self {
        Effect {
            run_fn: self.run_fn.clone(),
        }
    }
}

// Manual Debug implementation since Fn is not Debug
impl<S, T, E> fmt::Debug for Effect<S, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("run_fn", &"<function>")
            .finish()
    }
}

impl<S, T, E> Effect<S, T, E>
where
    S: Store,
    T: Send + 'static,
    E: Send + 'static,
{
    /// Wrap an async function over the store access.
    ///
    /// `f` is not called here. It is called once per [`run`](Self::run).
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let greet = Effect::new(|access: StoreAccess<AppStore>| async move {
    ///     access.dispatch(Msg::Greet);
    ///     Ok(())
    /// });
    /// ```
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(StoreAccess<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Effect {
            run_fn: Arc::new(move |access: StoreAccess<S>| -> BoxFuture<'static, Result<T, E>> {
                Box::pin(f(access))
            }),
        }
    }

    /// Invoke the effect.
    pub fn run(&self, access: StoreAccess<S>) -> BoxFuture<'static, Result<T, E>> {
        (self.run_fn)(access)
    }

    /// Run `next` after this effect succeeds, discarding this effect's value.
    ///
    /// If this effect fails, `next` never runs and the failure propagates.
    pub fn and_then<U>(self, next: Effect<S, U, E>) -> Effect<S, U, E>
    where
        U: Send + 'static,
    {
        Effect::new(move |access: StoreAccess<S>| {
            let first = self.run(access.clone());
            let next = next.clone();
            async move {
                first.await?;
                next.run(access).await
            }
        })
    }

    /// Feed this effect's value into `f` and run the effect it returns.
    ///
    /// `f` is only called after this effect succeeds, with the same access.
    pub fn fmap<U, F>(self, f: F) -> Effect<S, U, E>
    where
        U: Send + 'static,
        F: Fn(T) -> Effect<S, U, E> + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Effect::new(move |access: StoreAccess<S>| {
            let first = self.run(access.clone());
            let f = f.clone();
            async move {
                let value = first.await?;
                f(value).run(access).await
            }
        })
    }

    /// Transform the success value.
    pub fn map<U, F>(self, f: F) -> Effect<S, U, E>
    where
        U: Send + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Effect::new(move |access: StoreAccess<S>| {
            let run = self.run(access);
            let f = f.clone();
            async move { run.await.map(|value| f(value)) }
        })
    }

    /// Transform the failure.
    pub fn map_err<E2, F>(self, f: F) -> Effect<S, T, E2>
    where
        E2: Send + 'static,
        F: Fn(E) -> E2 + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        Effect::new(move |access: StoreAccess<S>| {
            let run = self.run(access);
            let f = f.clone();
            async move { run.await.map_err(|err| f(err)) }
        })
    }

    /// Drop the success value.
    pub fn discard(self) -> Effect<S, (), E> {
        self.map(|_| ())
    }

    /// Run `fallback` if this effect fails. See [`catch`].
    pub fn catch<E2>(self, fallback: Effect<S, T, E2>) -> Effect<S, T, E2>
    where
        E2: Send + 'static,
    {
        catch(self, fallback)
    }

    /// Run `fallback` if this effect fails, keeping both result types.
    /// See [`catch_either`].
    pub fn catch_either<U, E2>(self, fallback: Effect<S, U, E2>) -> Effect<S, Either<T, U>, E2>
    where
        U: Send + 'static,
        E2: Send + 'static,
    {
        catch_either(self, fallback)
    }

    /// Wait `duration` on the scheduler clock before running. See [`delay`].
    pub fn delay(self, duration: Duration) -> Self {
        delay(duration, self)
    }

    /// Run inside a tracing span.
    ///
    /// A fresh clone of `span` is entered for every run.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let effect = fetch_user(api, id)
    ///     .instrument(tracing::debug_span!("fetch_user", user_id = id));
    /// ```
    pub fn instrument(self, span: tracing::Span) -> Self {
        Effect::new(move |access: StoreAccess<S>| self.run(access).instrument(span.clone()))
    }
}

impl<S, T> Effect<S, T, EffectError>
where
    S: Store,
    T: Send + 'static,
{
    /// Add a context layer to failures.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let effect = fetch_user(api, id).context("loading profile");
    /// ```
    pub fn context(self, msg: impl Into<String>) -> Self {
        let msg = msg.into();
        self.map_err(move |err| err.context(msg.clone()))
    }
}

#[cfg(test)]
mod tests;
