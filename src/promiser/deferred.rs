//! Values that are available now, on demand, or after an asynchronous wait.

use futures::future::BoxFuture;
use std::future::Future;

use crate::error::{JanitorError, Result};

/// A value that may be a literal, a producer, an asynchronous computation,
/// or a producer of an asynchronous computation.
///
/// Every variant resolves into exactly one asynchronous `Result<T>` through
/// [`Deferred::resolve`]. Resolution consumes the value, so no variant can be
/// invoked or awaited twice.
pub enum Deferred<'a, T> {
    /// Available immediately.
    Value(T),
    /// Computed on demand; an `Err` is the synchronous failure path.
    Supplier(Box<dyn FnOnce() -> Result<T> + Send + 'a>),
    /// Available once the computation settles.
    Future(BoxFuture<'a, Result<T>>),
    /// Produces the computation on demand.
    Lazy(Box<dyn FnOnce() -> BoxFuture<'a, Result<T>> + Send + 'a>),
}

impl<'a, T: Send + 'a> Deferred<'a, T> {
    pub fn value(value: T) -> Self {
        Self::Value(value)
    }

    pub fn supplier<F>(supplier: F) -> Self
    where
        F: FnOnce() -> Result<T> + Send + 'a,
    {
        Self::Supplier(Box::new(supplier))
    }

    pub fn future<Fut>(future: Fut) -> Self
    where
        Fut: Future<Output = Result<T>> + Send + 'a,
    {
        Self::Future(Box::pin(future))
    }

    pub fn lazy<F, Fut>(producer: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'a,
        Fut: Future<Output = Result<T>> + Send + 'a,
    {
        Self::Lazy(Box::new(move || Box::pin(producer())))
    }

    /// A computation that has already failed.
    pub fn failed(error: JanitorError) -> Self {
        Self::Future(Box::pin(async move { Err(error) }))
    }

    pub async fn resolve(self) -> Result<T> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Supplier(supplier) => supplier(),
            Self::Future(future) => future.await,
            Self::Lazy(producer) => producer().await,
        }
    }
}

impl<'a, T> From<T> for Deferred<'a, T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

impl<T> std::fmt::Debug for Deferred<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            Self::Value(_) => "Value",
            Self::Supplier(_) => "Supplier",
            Self::Future(_) => "Future",
            Self::Lazy(_) => "Lazy",
        };
        f.debug_tuple("Deferred").field(&kind).finish()
    }
}

/// Resolve any [`Deferred`] variant into its value.
pub async fn resolve<'a, T: Send + 'a>(deferred: Deferred<'a, T>) -> Result<T> {
    deferred.resolve().await
}
