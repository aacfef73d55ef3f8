//! Host environment abstraction
//!
//! Everything the janitor needs from its surroundings (editor commands,
//! open documents, dialogs, the file system and an output channel) is a
//! capability trait. Workflows only ever see a [`HostEnv`] of trait objects.
//!
//! # Architecture
//!
//! - **Traits**: [`CommandEnv`], [`WorkspaceEnv`], [`WindowEnv`], [`FileEnv`],
//!   [`OutputChannel`] and the [`Document`] handle
//! - **Headless implementations**: a filesystem-backed editor with terminal
//!   prompts, used by the `janitor` binary
//! - **Mock implementations**: an in-memory editor with scripted dialogs and
//!   an event log, used by tests
//! - **Combined environment**: [`HostEnv`] bundles all capabilities together
//!
//! # Usage
//!
//! ```no_run
//! use project_janitor::env::HostEnv;
//!
//! let host = HostEnv::headless(".", false);
//! ```

mod app;
mod headless;
mod mock;
mod real;
mod terminal;
mod traits;

pub use app::HostEnv;
pub use headless::{
    insert_final_newline, trim_trailing_whitespace, FileDocument, HeadlessEditor,
    CLOSE_ACTIVE_EDITOR, CLOSE_ALL_EDITORS, CLOSE_EDITORS_IN_GROUP, FORMAT_DOCUMENT,
    INSERT_FINAL_NEWLINE, PIPE_PREFIX, TRIM_TRAILING_WHITESPACE,
};
pub use mock::{MockChannel, MockDocument, MockEditor};
pub use real::{ConsoleChannel, RealFileEnv};
pub use terminal::TerminalPrompter;
pub use traits::{
    CommandEnv, Document, DocumentRef, FileEnv, InputBoxOptions, MessageLevel, OutputChannel,
    ProjectFile, QuickPickItem, WindowEnv, WorkspaceEnv,
};
