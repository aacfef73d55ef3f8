//! The skip signal: a step result that ends the chain without failing it.

use crate::error::Result;

/// Result of a gate or workflow step.
///
/// Together with the surrounding `Result` this is the tri-state
/// `Proceed(value) | Skipped | Failed(error)`. Once a step yields `Skipped`,
/// nothing chained after it runs and the chain itself ends as `Skipped`.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow<T> {
    Proceed(T),
    Skipped,
}

/// A step that can proceed, be skipped, or fail.
pub type Outcome<T> = Result<Flow<T>>;

impl<T> Flow<T> {
    pub fn is_proceed(&self) -> bool {
        matches!(self, Flow::Proceed(_))
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Flow::Skipped)
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Flow<U> {
        match self {
            Flow::Proceed(value) => Flow::Proceed(f(value)),
            Flow::Skipped => Flow::Skipped,
        }
    }

    /// Chain another step; a skipped flow stays skipped and `f` never runs.
    pub fn and_then<U, F: FnOnce(T) -> Flow<U>>(self, f: F) -> Flow<U> {
        match self {
            Flow::Proceed(value) => f(value),
            Flow::Skipped => Flow::Skipped,
        }
    }

    /// Chain an asynchronous step with the same skip semantics as [`Flow::and_then`].
    pub async fn then<U, F, Fut>(self, f: F) -> Outcome<U>
    where
        F: FnOnce(T) -> Fut,
        Fut: std::future::Future<Output = Outcome<U>>,
    {
        match self {
            Flow::Proceed(value) => f(value).await,
            Flow::Skipped => Ok(Flow::Skipped),
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Flow::Proceed(value) => Some(value),
            Flow::Skipped => None,
        }
    }
}

impl<T> From<Option<T>> for Flow<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Flow::Proceed(value),
            None => Flow::Skipped,
        }
    }
}

/// Unwrap a proceeding step, or return early from the enclosing function
/// with `Ok(Flow::Skipped)` / the error.
///
/// ```
/// use project_janitor::promiser::{when, Flow, Outcome};
/// use project_janitor::proceed;
///
/// async fn guarded(go: bool) -> Outcome<&'static str> {
///     proceed!(when(go).await);
///     Ok(Flow::Proceed("ran"))
/// }
/// ```
#[macro_export]
macro_rules! proceed {
    ($outcome:expr) => {
        match $outcome {
            ::std::result::Result::Ok($crate::promiser::Flow::Proceed(value)) => value,
            ::std::result::Result::Ok($crate::promiser::Flow::Skipped) => {
                return ::std::result::Result::Ok($crate::promiser::Flow::Skipped)
            }
            ::std::result::Result::Err(error) => {
                return ::std::result::Result::Err(::std::convert::From::from(error))
            }
        }
    };
}
