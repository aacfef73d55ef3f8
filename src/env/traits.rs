//! Host capability traits
//!
//! The janitor never talks to an editor, a terminal or the file system
//! directly. Every interaction goes through one of these traits so workflows
//! can run against the headless host or an in-memory mock.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::PatternSet;
use crate::error::Result;

/// A file handle returned by workspace enumeration.
pub type ProjectFile = PathBuf;

/// An open text document.
#[async_trait]
pub trait Document: Send + Sync {
    /// Absolute path of the backing file.
    fn path(&self) -> &Path;

    /// Workspace-relative, `/`-separated path.
    fn relative_path(&self) -> &str;

    /// Current buffer contents.
    fn text(&self) -> String;

    /// Whether the buffer has unsaved edits.
    fn is_dirty(&self) -> bool;

    /// Write the buffer to disk.
    async fn save(&self) -> Result<()>;
}

pub type DocumentRef = Arc<dyn Document>;

/// Runs named editor commands against the focused document.
#[async_trait]
pub trait CommandEnv: Send + Sync {
    async fn execute(&self, command: &str) -> Result<()>;
}

/// Workspace files and open documents.
#[async_trait]
pub trait WorkspaceEnv: Send + Sync {
    fn root(&self) -> &Path;

    /// Express `path` relative to the workspace root with `/` separators.
    fn as_relative_path(&self, path: &Path) -> String {
        let relative = path.strip_prefix(self.root()).unwrap_or(path);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    async fn find_files(&self, include: &PatternSet, exclude: &PatternSet)
        -> Result<Vec<ProjectFile>>;

    async fn open_document(&self, path: &Path) -> Result<DocumentRef>;

    /// Every document currently open.
    fn text_documents(&self) -> Vec<DocumentRef>;

    fn active_document(&self) -> Option<DocumentRef>;

    async fn save_all(&self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickPickItem {
    pub label: String,
    pub description: Option<String>,
}

impl QuickPickItem {
    pub fn new(label: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            label: label.into(),
            description: description.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBoxOptions {
    pub prompt: String,
    pub value: Option<String>,
    /// Character range of `value` to preselect.
    pub value_selection: Option<(usize, usize)>,
}

/// Dialogs and editor focus.
#[async_trait]
pub trait WindowEnv: Send + Sync {
    async fn show_text_document(&self, document: &DocumentRef) -> Result<()>;

    /// `None` when the input was dismissed.
    async fn show_input_box(&self, options: InputBoxOptions) -> Result<Option<String>>;

    /// Index of the chosen item, `None` when dismissed.
    async fn show_quick_pick(&self, items: &[QuickPickItem]) -> Result<Option<usize>>;

    /// The chosen button, `None` when dismissed or when there are no buttons.
    async fn show_message(
        &self,
        level: MessageLevel,
        text: &str,
        buttons: &[&str],
    ) -> Result<Option<String>>;

    /// A modal dialog with a single action button.
    async fn show_modal_confirm(&self, text: &str, action: &str) -> Result<bool>;
}

/// File system primitives.
#[async_trait]
pub trait FileEnv: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    async fn rename(&self, from: &Path, to: &Path) -> Result<()>;

    /// Copy a file or a directory tree.
    async fn copy(&self, from: &Path, to: &Path) -> Result<()>;

    /// Remove a file or a directory tree; a missing path is not an error.
    async fn remove(&self, path: &Path) -> Result<()>;

    async fn ensure_dir(&self, path: &Path) -> Result<()>;

    /// Create an empty file (and its parents) unless it already exists.
    async fn create_file(&self, path: &Path) -> Result<()>;
}

/// A visible diagnostic channel.
pub trait OutputChannel: Send + Sync {
    fn append_line(&self, line: &str);
}
