//! Opaque effect failures with a context trail
//!
//! The effect algebra treats failure as a boolean outcome: an effect either
//! succeeded or it failed. [`EffectError`] is the default error type carried by
//! effects. It holds a human readable message, an optional underlying source
//! error, and a trail of context messages accumulated as the failure travels
//! outward through composed effects.
//!
//! # Examples
//!
//! ```
//! use undertow::EffectError;
//!
//! let err = EffectError::new("connection refused")
//!     .context("fetching user")
//!     .context("loading profile page");
//!
//! assert_eq!(err.message(), "connection refused");
//! assert_eq!(err.context_trail(), &["fetching user", "loading profile page"]);
//! ```

use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

/// Failure of an effect.
///
/// Cloning is cheap: the source error is shared.
///
/// # Examples
///
/// ```
/// use undertow::EffectError;
///
/// let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such user");
/// let err = EffectError::from_source(io).context("fetching user");
///
/// println!("{}", err);
/// // Output:
/// // Error: no such user
/// //   -> fetching user
/// ```
#[derive(Clone)]
pub struct EffectError {
    message: String,
    source: Option<Arc<dyn StdError + Send + Sync>>,
    context: Vec<String>,
}

impl EffectError {
    /// Create a failure from a message.
    pub fn new(message: impl Into<String>) -> Self {
        EffectError {
            message: message.into(),
            source: None,
            context: Vec::new(),
        }
    }

    /// Wrap an underlying error. The message is taken from its `Display`.
    pub fn from_source<E>(source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        EffectError {
            message: source.to_string(),
            source: Some(Arc::new(source)),
            context: Vec::new(),
        }
    }

    /// Add a context layer.
    ///
    /// Context messages are kept in the order they were added, innermost
    /// first.
    pub fn context(mut self, msg: impl Into<String>) -> Self {
        self.context.push(msg.into());
        self
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The context trail, innermost first.
    pub fn context_trail(&self) -> &[String] {
        &self.context
    }
}

impl fmt::Debug for EffectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectError")
            .field("message", &self.message)
            .field("source", &self.source.as_ref().map(|_| "<error>"))
            .field("context", &self.context)
            .finish()
    }
}

impl fmt::Display for EffectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {}", self.message)?;

        for ctx in &self.context {
            write!(f, "\n  -> {}", ctx)?;
        }

        Ok(())
    }
}

impl StdError for EffectError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_deref()
            .map(|err| err as &(dyn StdError + 'static))
    }
}

// Sources are compared by presence only; `dyn Error` has no equality.
impl PartialEq for EffectError {
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message
            && self.context == other.context
            && self.source.is_some() == other.source.is_some()
    }
}

impl Eq for EffectError {}

impl From<&str> for EffectError {
    fn from(message: &str) -> Self {
        EffectError::new(message)
    }
}

impl From<String> for EffectError {
    fn from(message: String) -> Self {
        EffectError::new(message)
    }
}
