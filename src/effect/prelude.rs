//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use undertow::prelude::*;
//! ```
//!
//! Brings in the [`Effect`] type, every constructor and combinator, the
//! store boundary types, and the `seq!`/`par!`/`combine!` macros.

pub use crate::effect::Effect;
pub use crate::either::Either;
pub use crate::error::EffectError;
pub use crate::queue::EffectQueue;
pub use crate::store::{Store, StoreAccess};

// Functions and macros sharing a name (`par`) come in through one import.
pub use crate::{
    catch, catch_either, combine, delay, fail, from_fn, noop, par, pure, seq, sequence,
};
