//! The outcome of a fallback whose result type differs from the primary's.
//!
//! [`catch_either`](crate::effect::catch_either) yields `Left` when the
//! primary effect succeeded and `Right` when the fallback ran. Neither side
//! is an error: both are successful outcomes of the composite.
//!
//! # Examples
//!
//! ```rust
//! use undertow::Either;
//!
//! let fresh: Either<u32, &str> = Either::Left(42);
//! let cached: Either<u32, &str> = Either::Right("stale");
//!
//! assert_eq!(fresh.fold(|n| n.to_string(), |s| s.to_string()), "42");
//! assert!(cached.is_right());
//! ```

/// A value that is either `Left(L)` or `Right(R)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Either<L, R> {
    /// The primary side
    Left(L),
    /// The fallback side
    Right(R),
}

impl<L, R> Either<L, R> {
    /// Returns `true` if this is a `Left` value.
    #[inline]
    pub fn is_left(&self) -> bool {
        matches!(self, Either::Left(_))
    }

    /// Returns `true` if this is a `Right` value.
    #[inline]
    pub fn is_right(&self) -> bool {
        matches!(self, Either::Right(_))
    }

    /// The left value, if any.
    #[inline]
    pub fn into_left(self) -> Option<L> {
        match self {
            Either::Left(l) => Some(l),
            Either::Right(_) => None,
        }
    }

    /// The right value, if any.
    #[inline]
    pub fn into_right(self) -> Option<R> {
        match self {
            Either::Left(_) => None,
            Either::Right(r) => Some(r),
        }
    }

    /// Transform both variants.
    ///
    /// # Example
    ///
    /// ```rust
    /// use undertow::Either;
    ///
    /// let left: Either<i32, &str> = Either::Left(1);
    /// assert_eq!(left.bimap(|x| x + 1, |s| s.len()), Either::Left(2));
    /// ```
    #[inline]
    pub fn bimap<L2, R2, F, G>(self, f: F, g: G) -> Either<L2, R2>
    where
        F: FnOnce(L) -> L2,
        G: FnOnce(R) -> R2,
    {
        match self {
            Either::Left(l) => Either::Left(f(l)),
            Either::Right(r) => Either::Right(g(r)),
        }
    }

    /// Fold both variants into a single value.
    #[inline]
    pub fn fold<T, F, G>(self, left_fn: F, right_fn: G) -> T
    where
        F: FnOnce(L) -> T,
        G: FnOnce(R) -> T,
    {
        match self {
            Either::Left(l) => left_fn(l),
            Either::Right(r) => right_fn(r),
        }
    }
}

impl<T> Either<T, T> {
    /// The value, whichever side it is on.
    #[inline]
    pub fn into_inner(self) -> T {
        match self {
            Either::Left(v) | Either::Right(v) => v,
        }
    }
}
