//! Combined host environment
//!
//! Bundles every capability the janitor needs into one cloneable value.

use std::path::PathBuf;
use std::sync::Arc;

use super::headless::HeadlessEditor;
use super::mock::{MockChannel, MockEditor};
use super::real::{ConsoleChannel, RealFileEnv};
use super::terminal::TerminalPrompter;
use super::traits::{CommandEnv, FileEnv, OutputChannel, WindowEnv, WorkspaceEnv};

/// Combined host environment
///
/// Can be constructed over a real workspace directory or over an in-memory
/// [`MockEditor`] for testing.
///
/// # Examples
///
/// ```
/// use project_janitor::env::{HostEnv, MockChannel, MockEditor};
///
/// let editor = MockEditor::new();
/// let channel = MockChannel::new();
/// let host = HostEnv::mock(&editor, &channel);
/// assert_eq!(host.workspace.root(), std::path::Path::new("/workspace"));
/// ```
#[derive(Clone)]
pub struct HostEnv {
    pub commands: Arc<dyn CommandEnv>,
    pub workspace: Arc<dyn WorkspaceEnv>,
    pub window: Arc<dyn WindowEnv>,
    pub fs: Arc<dyn FileEnv>,
    pub output: Arc<dyn OutputChannel>,
}

impl HostEnv {
    /// Host over the workspace directory `root`, prompting on the terminal.
    ///
    /// With `assume_yes` every prompt takes its first answer.
    pub fn headless(root: impl Into<PathBuf>, assume_yes: bool) -> Self {
        let editor = Arc::new(HeadlessEditor::new(root, TerminalPrompter::new(assume_yes)));
        Self {
            commands: editor.clone(),
            workspace: editor.clone(),
            window: editor,
            fs: Arc::new(RealFileEnv::new()),
            output: Arc::new(ConsoleChannel::new()),
        }
    }

    /// Host backed entirely by `editor`, logging into `channel`.
    pub fn mock(editor: &MockEditor, channel: &MockChannel) -> Self {
        let editor = Arc::new(editor.clone());
        Self {
            commands: editor.clone(),
            workspace: editor.clone(),
            window: editor.clone(),
            fs: editor,
            output: Arc::new(channel.clone()),
        }
    }

    /// Create a custom environment with specific implementations
    pub fn custom(
        commands: Arc<dyn CommandEnv>,
        workspace: Arc<dyn WorkspaceEnv>,
        window: Arc<dyn WindowEnv>,
        fs: Arc<dyn FileEnv>,
        output: Arc<dyn OutputChannel>,
    ) -> Self {
        Self {
            commands,
            workspace,
            window,
            fs,
            output,
        }
    }
}
