//! Deferred-step composition
//!
//! A small set of combinators for sequencing asynchronous steps that may be
//! skipped or may fail:
//! - [`Deferred`] unifies literal, produced and asynchronous values
//! - [`Flow`] marks a step as proceeding or skipped; errors travel in the outer `Result`
//! - [`for_each`] / [`for_all`] iterate sequentially / concurrently
//! - [`when`], [`if_any`], [`if_all`] gate on boolean conditions
//! - [`attempt`] funnels every failure into one error handler
//!
//! # Example
//!
//! ```
//! use project_janitor::promiser::{for_each, when, Deferred, Flow};
//!
//! # tokio_test::block_on(async {
//! let gate = when(Deferred::supplier(|| Ok(true))).await.unwrap();
//! assert_eq!(gate, Flow::Proceed(()));
//!
//! let doubled = for_each(vec![1, 2, 3], |n| async move { Ok(n * 2) }).await.unwrap();
//! assert_eq!(doubled, vec![2, 4, 6]);
//! # });
//! ```

mod combinators;
mod deferred;
mod flow;

#[cfg(test)]
mod tests;

pub use combinators::{
    attempt, for_all, for_each, if_all, if_any, only_if, only_if_not, when, Attempt,
};
pub use deferred::{resolve, Deferred};
pub use flow::{Flow, Outcome};
