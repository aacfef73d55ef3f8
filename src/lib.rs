//! # Project Janitor
//!
//! Batch clean-up for a workspace: run a configured list of editor commands
//! over every matching file, save what changed, and rename files according to
//! regex rules.
//!
//! ## Usage
//!
//! ```bash
//! janitor clean-project [--yes] [-C dir]
//! janitor validate-names
//! janitor clean-document src/main.ts
//! ```
//!
//! ## Modules
//!
//! - `promiser` - Deferred values, the skip signal and the step combinators
//! - `config` - Settings sources and the per-run janitor configuration
//! - `env` - Host capability traits with headless and mock implementations
//! - `files` - File specs and the move/duplicate/remove/create dialogs
//! - `janitor` - The clean-up and rename workflows
//! - `logging` - Named logger writing to the host output channel
pub mod config;
pub mod env;
pub mod error;
pub mod files;
pub mod janitor;
pub mod logging;
pub mod promiser;

pub use error::{JanitorError, Result};
pub use janitor::{JanitorCommand, ProjectJanitor, RunReport, RunStatus};
