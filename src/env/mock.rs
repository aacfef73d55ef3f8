//! Mock environment implementations for testing
//!
//! These implementations use in-memory data structures and provide controlled,
//! predictable behavior for testing without a real editor or file system.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use super::headless::{CLOSE_ACTIVE_EDITOR, CLOSE_ALL_EDITORS, CLOSE_EDITORS_IN_GROUP};
use super::traits::{
    CommandEnv, Document, DocumentRef, FileEnv, InputBoxOptions, MessageLevel, OutputChannel,
    ProjectFile, QuickPickItem, WindowEnv, WorkspaceEnv,
};
use crate::config::PatternSet;
use crate::error::{JanitorError, Result};

type Transform = Arc<dyn Fn(&str) -> String + Send + Sync>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
struct MockState {
    disk: BTreeMap<PathBuf, String>,
    /// Enumeration order of `disk`, as files were added.
    listing: Vec<PathBuf>,
    dirs: BTreeSet<PathBuf>,
    documents: Vec<Arc<MockDocument>>,
    active: Option<PathBuf>,
    transforms: HashMap<String, Transform>,
    failing_commands: HashMap<String, String>,
    failing_paths: BTreeSet<PathBuf>,
    quick_picks: VecDeque<Option<usize>>,
    messages: VecDeque<Option<String>>,
    confirms: VecDeque<bool>,
    inputs: VecDeque<Option<String>>,
    events: Vec<String>,
    dialogs: Vec<String>,
}

impl MockState {
    fn relative(root: &Path, path: &Path) -> String {
        path.strip_prefix(root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }

    fn document(&self, path: &Path) -> Option<Arc<MockDocument>> {
        self.documents.iter().find(|d| d.path == path).cloned()
    }

    fn insert_file(&mut self, path: PathBuf, content: String) {
        if self.disk.insert(path.clone(), content).is_none() {
            self.listing.push(path);
        }
    }

    fn remove_file(&mut self, path: &Path) -> Option<String> {
        self.listing.retain(|p| p != path);
        self.disk.remove(path)
    }

    fn entries_under(&self, path: &Path) -> Vec<PathBuf> {
        self.listing
            .iter()
            .filter(|p| p.as_path() == path || p.starts_with(path))
            .cloned()
            .collect()
    }
}

/// An open document in the mock editor.
pub struct MockDocument {
    path: PathBuf,
    relative: String,
    text: Mutex<String>,
    dirty: Mutex<bool>,
    state: Weak<Mutex<MockState>>,
}

impl MockDocument {
    fn set_text(&self, text: String) {
        let mut current = lock(&self.text);
        if *current != text {
            *current = text;
            *lock(&self.dirty) = true;
        }
    }
}

#[async_trait]
impl Document for MockDocument {
    fn path(&self) -> &Path {
        &self.path
    }

    fn relative_path(&self) -> &str {
        &self.relative
    }

    fn text(&self) -> String {
        lock(&self.text).clone()
    }

    fn is_dirty(&self) -> bool {
        *lock(&self.dirty)
    }

    async fn save(&self) -> Result<()> {
        let shared = self
            .state
            .upgrade()
            .ok_or_else(|| JanitorError::Document(format!("{} is closed", self.relative)))?;
        let text = self.text();
        let mut state = lock(&shared);
        state.insert_file(self.path.clone(), text);
        state.events.push(format!("save:{}", self.relative));
        *lock(&self.dirty) = false;
        Ok(())
    }
}

/// In-memory editor host.
///
/// One value implements every editor capability; clones share state so a
/// test can keep a handle while the janitor owns another.
///
/// # Examples
///
/// ```
/// use project_janitor::env::MockEditor;
///
/// let editor = MockEditor::new();
/// editor.add_file("src/a.ts", "let a = 1;");
/// editor.on_command("format", |text| text.replace("1", "2"));
///
/// assert_eq!(editor.file("src/a.ts"), Some("let a = 1;".to_string()));
/// ```
#[derive(Clone)]
pub struct MockEditor {
    root: PathBuf,
    state: Arc<Mutex<MockState>>,
}

impl MockEditor {
    pub fn new() -> Self {
        Self::with_root("/workspace")
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        lock(&self.state)
    }

    /// Absolute path of a workspace-relative file.
    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    fn relative(&self, path: &Path) -> String {
        MockState::relative(&self.root, path)
    }

    /// Add a file to the mock disk.
    pub fn add_file(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.path(relative);
        self.state().insert_file(path.clone(), content.to_string());
        path
    }

    /// Saved contents of a file.
    pub fn file(&self, relative: &str) -> Option<String> {
        self.state().disk.get(&self.path(relative)).cloned()
    }

    /// Relative paths of every file on the mock disk, in enumeration order.
    pub fn files(&self) -> Vec<String> {
        let state = self.state();
        state.listing.iter().map(|p| self.relative(p)).collect()
    }

    fn open(&self, path: &Path) -> Result<Arc<MockDocument>> {
        let mut state = self.state();
        if let Some(document) = state.document(path) {
            return Ok(document);
        }
        let text = state
            .disk
            .get(path)
            .cloned()
            .ok_or_else(|| JanitorError::Document(format!("File not found: {}", path.display())))?;
        let document = Arc::new(MockDocument {
            path: path.to_path_buf(),
            relative: self.relative(path),
            text: Mutex::new(text),
            dirty: Mutex::new(false),
            state: Arc::downgrade(&self.state),
        });
        state.documents.push(document.clone());
        Ok(document)
    }

    /// Open a file with unsaved edits.
    pub fn open_dirty(&self, relative: &str, text: &str) -> Result<()> {
        let document = self.open(&self.path(relative))?;
        document.set_text(text.to_string());
        *lock(&document.dirty) = true;
        Ok(())
    }

    /// Open a file and focus it.
    pub fn activate(&self, relative: &str) -> Result<()> {
        let document = self.open(&self.path(relative))?;
        self.state().active = Some(document.path.clone());
        Ok(())
    }

    /// Relative paths of open documents.
    pub fn open_documents(&self) -> Vec<String> {
        self.state()
            .documents
            .iter()
            .map(|d| d.relative.clone())
            .collect()
    }

    /// Rewrite the focused buffer with `transform` whenever `command` runs.
    pub fn on_command<F>(&self, command: &str, transform: F)
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.state()
            .transforms
            .insert(command.to_string(), Arc::new(transform));
    }

    /// Make `command` fail with `message`.
    pub fn fail_command(&self, command: &str, message: &str) {
        self.state()
            .failing_commands
            .insert(command.to_string(), message.to_string());
    }

    /// Make file operations touching `relative` fail.
    pub fn fail_path(&self, relative: &str) {
        let path = self.path(relative);
        self.state().failing_paths.insert(path);
    }

    pub fn answer_quick_pick(&self, answer: Option<usize>) {
        self.state().quick_picks.push_back(answer);
    }

    pub fn answer_message(&self, answer: Option<&str>) {
        self.state()
            .messages
            .push_back(answer.map(str::to_string));
    }

    pub fn answer_confirm(&self, answer: bool) {
        self.state().confirms.push_back(answer);
    }

    pub fn answer_input(&self, answer: Option<&str>) {
        self.state().inputs.push_back(answer.map(str::to_string));
    }

    /// Editor events in order: `open:`, `show:`, `exec:`, `save:`, `rename:`,
    /// `copy:`, `remove:`, `create:`, `mkdir:`.
    pub fn events(&self) -> Vec<String> {
        self.state().events.clone()
    }

    /// Dialogs shown in order: `pick:`, `input:`, `modal:`, `info:`,
    /// `warning:`, `error:`.
    pub fn dialogs(&self) -> Vec<String> {
        self.state().dialogs.clone()
    }

    /// Dialog entries with the given prefix, prefix stripped.
    pub fn dialogs_of(&self, prefix: &str) -> Vec<String> {
        let prefix = format!("{prefix}:");
        self.dialogs()
            .iter()
            .filter_map(|d| d.strip_prefix(&prefix).map(str::to_string))
            .collect()
    }

    fn check_path(&self, state: &MockState, path: &Path) -> Result<()> {
        if state.failing_paths.contains(path) {
            return Err(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                format!("permission denied: {}", path.display()),
            )
            .into());
        }
        Ok(())
    }
}

impl Default for MockEditor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandEnv for MockEditor {
    async fn execute(&self, command: &str) -> Result<()> {
        let (active, transform) = {
            let mut state = self.state();
            state.events.push(format!("exec:{command}"));

            if let Some(message) = state.failing_commands.get(command) {
                return Err(JanitorError::command(command, message.clone()));
            }
            if command == CLOSE_ALL_EDITORS || command == CLOSE_EDITORS_IN_GROUP {
                state.documents.clear();
                state.active = None;
                return Ok(());
            }
            if command == CLOSE_ACTIVE_EDITOR {
                if let Some(active) = state.active.take() {
                    state.documents.retain(|d| d.path != active);
                }
                return Ok(());
            }

            let active = state.active.clone().and_then(|p| state.document(&p));
            (active, state.transforms.get(command).cloned())
        };

        if let (Some(document), Some(transform)) = (active, transform) {
            let text = transform(&document.text());
            document.set_text(text);
        }
        Ok(())
    }
}

#[async_trait]
impl WorkspaceEnv for MockEditor {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn find_files(
        &self,
        include: &PatternSet,
        exclude: &PatternSet,
    ) -> Result<Vec<ProjectFile>> {
        let state = self.state();
        Ok(state
            .listing
            .iter()
            .filter(|path| {
                let relative = self.relative(path);
                include.matches(&relative) && !exclude.matches(&relative)
            })
            .cloned()
            .collect())
    }

    async fn open_document(&self, path: &Path) -> Result<DocumentRef> {
        let document = self.open(path)?;
        self.state()
            .events
            .push(format!("open:{}", document.relative));
        let document: DocumentRef = document;
        Ok(document)
    }

    fn text_documents(&self) -> Vec<DocumentRef> {
        self.state()
            .documents
            .iter()
            .map(|d| d.clone() as DocumentRef)
            .collect()
    }

    fn active_document(&self) -> Option<DocumentRef> {
        let state = self.state();
        let active = state.active.as_ref()?;
        state.document(active).map(|d| d as DocumentRef)
    }

    async fn save_all(&self) -> Result<()> {
        let dirty: Vec<_> = self
            .state()
            .documents
            .iter()
            .filter(|d| d.is_dirty())
            .cloned()
            .collect();
        for document in dirty {
            document.save().await?;
        }
        Ok(())
    }
}

#[async_trait]
impl WindowEnv for MockEditor {
    async fn show_text_document(&self, document: &DocumentRef) -> Result<()> {
        let opened = self.open(document.path())?;
        let mut state = self.state();
        state.events.push(format!("show:{}", opened.relative));
        state.active = Some(opened.path.clone());
        Ok(())
    }

    async fn show_input_box(&self, options: InputBoxOptions) -> Result<Option<String>> {
        let mut state = self.state();
        state.dialogs.push(format!("input:{}", options.prompt));
        Ok(state.inputs.pop_front().unwrap_or(None))
    }

    async fn show_quick_pick(&self, items: &[QuickPickItem]) -> Result<Option<usize>> {
        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
        let mut state = self.state();
        state.dialogs.push(format!("pick:{}", labels.join("|")));
        Ok(state.quick_picks.pop_front().unwrap_or(Some(0)))
    }

    async fn show_message(
        &self,
        level: MessageLevel,
        text: &str,
        buttons: &[&str],
    ) -> Result<Option<String>> {
        let tag = match level {
            MessageLevel::Info => "info",
            MessageLevel::Warning => "warning",
            MessageLevel::Error => "error",
        };
        let mut state = self.state();
        state.dialogs.push(format!("{tag}:{text}"));
        if buttons.is_empty() {
            return Ok(None);
        }
        Ok(state
            .messages
            .pop_front()
            .flatten()
            .filter(|answer| buttons.contains(&answer.as_str())))
    }

    async fn show_modal_confirm(&self, text: &str, _action: &str) -> Result<bool> {
        let mut state = self.state();
        state.dialogs.push(format!("modal:{text}"));
        Ok(state.confirms.pop_front().unwrap_or(false))
    }
}

#[async_trait]
impl FileEnv for MockEditor {
    fn exists(&self, path: &Path) -> bool {
        let state = self.state();
        state.dirs.contains(path) || !state.entries_under(path).is_empty()
    }

    fn is_dir(&self, path: &Path) -> bool {
        let state = self.state();
        state.dirs.contains(path) || state.listing.iter().any(|p| p != path && p.starts_with(path))
    }

    async fn rename(&self, from: &Path, to: &Path) -> Result<()> {
        let mut state = self.state();
        self.check_path(&state, from)?;
        let entries = state.entries_under(from);
        if entries.is_empty() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("No such file: {}", from.display()),
            )
            .into());
        }
        for entry in entries {
            let target = match entry.strip_prefix(from) {
                Ok(rest) if !rest.as_os_str().is_empty() => to.join(rest),
                _ => to.to_path_buf(),
            };
            if let Some(content) = state.remove_file(&entry) {
                state.insert_file(target, content);
            }
        }
        state
            .events
            .push(format!("rename:{}->{}", self.relative(from), self.relative(to)));
        Ok(())
    }

    async fn copy(&self, from: &Path, to: &Path) -> Result<()> {
        let mut state = self.state();
        self.check_path(&state, from)?;
        let entries = state.entries_under(from);
        if entries.is_empty() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("No such file: {}", from.display()),
            )
            .into());
        }
        for entry in entries {
            let target = match entry.strip_prefix(from) {
                Ok(rest) if !rest.as_os_str().is_empty() => to.join(rest),
                _ => to.to_path_buf(),
            };
            let content = state.disk.get(&entry).cloned().unwrap_or_default();
            state.insert_file(target, content);
        }
        state
            .events
            .push(format!("copy:{}->{}", self.relative(from), self.relative(to)));
        Ok(())
    }

    async fn remove(&self, path: &Path) -> Result<()> {
        let mut state = self.state();
        self.check_path(&state, path)?;
        for entry in state.entries_under(path) {
            state.remove_file(&entry);
        }
        state.dirs.retain(|d| !d.starts_with(path));
        state.events.push(format!("remove:{}", self.relative(path)));
        Ok(())
    }

    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        let mut state = self.state();
        self.check_path(&state, path)?;
        if state.dirs.insert(path.to_path_buf()) {
            state.events.push(format!("mkdir:{}", self.relative(path)));
        }
        Ok(())
    }

    async fn create_file(&self, path: &Path) -> Result<()> {
        let mut state = self.state();
        self.check_path(&state, path)?;
        if !state.disk.contains_key(path) {
            state.insert_file(path.to_path_buf(), String::new());
        }
        state.events.push(format!("create:{}", self.relative(path)));
        Ok(())
    }
}

/// Output channel that records every line.
#[derive(Debug, Clone, Default)]
pub struct MockChannel {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MockChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        lock(&self.lines).clone()
    }

    /// Whether any line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        lock(&self.lines).iter().any(|line| line.contains(needle))
    }
}

impl OutputChannel for MockChannel {
    fn append_line(&self, line: &str) {
        lock(&self.lines).push(line.to_string());
    }
}
