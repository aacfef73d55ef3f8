//! Sequencing, fan-out, gating and aggregation over deferred steps.

use futures::future::try_join_all;
use std::future::Future;

use super::deferred::Deferred;
use super::flow::{Flow, Outcome};
use crate::error::{JanitorError, Result};

/// Run `task` over `items` strictly in order.
///
/// The task for item `i + 1` is not created until the task for item `i` has
/// settled. The first failure stops the iteration; the remaining items are
/// never visited. Results are returned in input order.
pub async fn for_each<I, T, U, F, Fut>(items: I, mut task: F) -> Result<Vec<U>>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<U>>,
{
    let mut results = Vec::new();
    for item in items {
        results.push(task(item).await?);
    }
    Ok(results)
}

/// Run `task` over every item concurrently and collect the results in input order.
///
/// All tasks are created before any is awaited. The first failure settles the
/// whole computation; tasks still pending at that point are dropped, and
/// nothing already done is undone.
pub async fn for_all<I, T, U, F, Fut>(items: I, task: F) -> Result<Vec<U>>
where
    I: IntoIterator<Item = T>,
    F: FnMut(T) -> Fut,
    Fut: Future<Output = Result<U>>,
{
    try_join_all(items.into_iter().map(task)).await
}

/// Proceed when the condition resolves to `true`, otherwise skip.
pub async fn only_if(condition: Deferred<'_, bool>) -> Outcome<()> {
    Ok(if condition.resolve().await? {
        Flow::Proceed(())
    } else {
        Flow::Skipped
    })
}

/// Proceed when the condition resolves to `false`, otherwise skip.
pub async fn only_if_not(condition: Deferred<'_, bool>) -> Outcome<()> {
    Ok(if condition.resolve().await? {
        Flow::Skipped
    } else {
        Flow::Proceed(())
    })
}

/// Gate on a literal or deferred boolean.
pub async fn when<'a>(condition: impl Into<Deferred<'a, bool>>) -> Outcome<()> {
    only_if(condition.into()).await
}

/// Whether `predicate` holds for at least one item.
///
/// Every item is visited in order even after the first match.
pub async fn if_any<'a, I, T, P>(items: I, mut predicate: P) -> Result<bool>
where
    I: IntoIterator<Item = T>,
    P: FnMut(T) -> Deferred<'a, bool>,
{
    let gates = for_each(items, |item| only_if(predicate(item))).await?;
    Ok(gates.iter().any(Flow::is_proceed))
}

/// Whether `predicate` holds for every item.
///
/// Every item is visited in order even after the first mismatch.
pub async fn if_all<'a, I, T, P>(items: I, mut predicate: P) -> Result<bool>
where
    I: IntoIterator<Item = T>,
    P: FnMut(T) -> Deferred<'a, bool>,
{
    let misses = for_each(items, |item| only_if_not(predicate(item))).await?;
    Ok(!misses.iter().any(Flow::is_proceed))
}

/// How an [`attempt`] settled.
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T> {
    /// The task and its deferred result completed.
    Completed(T),
    /// The deferred result failed and the handler has consumed the error.
    Handled,
    /// The task failed before producing anything and the handler has consumed the error.
    Thrown,
}

impl<T> Attempt<T> {
    pub fn is_failed(&self) -> bool {
        !matches!(self, Attempt::Completed(_))
    }

    pub fn completed(self) -> Option<T> {
        match self {
            Attempt::Completed(value) => Some(value),
            _ => None,
        }
    }
}

/// Run `task` and route any failure to `on_error`.
///
/// `task` fails synchronously by returning `Err`, or later through the
/// deferred value it returns. Either way `on_error` receives the error exactly
/// once; it is never called when everything succeeds.
pub async fn attempt<'a, T, F, H, HFut>(task: F, on_error: H) -> Attempt<T>
where
    T: Send + 'a,
    F: FnOnce() -> Result<Deferred<'a, T>>,
    H: FnOnce(JanitorError) -> HFut,
    HFut: Future<Output = ()>,
{
    let deferred = match task() {
        Ok(deferred) => deferred,
        Err(error) => {
            on_error(error).await;
            return Attempt::Thrown;
        }
    };

    match deferred.resolve().await {
        Ok(value) => Attempt::Completed(value),
        Err(error) => {
            on_error(error).await;
            Attempt::Handled
        }
    }
}
