//! Filesystem-backed editor host for running the janitor outside an editor
//!
//! Documents are in-memory buffers loaded from disk and written back on save.
//! Editor commands are a small built-in set plus `pipe:` commands that run
//! the buffer through an external formatter.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use walkdir::WalkDir;

use super::terminal::TerminalPrompter;
use super::traits::{
    CommandEnv, Document, DocumentRef, InputBoxOptions, MessageLevel, ProjectFile,
    QuickPickItem, WindowEnv, WorkspaceEnv,
};
use crate::config::PatternSet;
use crate::error::{JanitorError, Result};

pub const CLOSE_ALL_EDITORS: &str = "workbench.action.closeAllEditors";
pub const CLOSE_EDITORS_IN_GROUP: &str = "workbench.action.closeEditorsInGroup";
pub const CLOSE_ACTIVE_EDITOR: &str = "workbench.action.closeActiveEditor";
pub const TRIM_TRAILING_WHITESPACE: &str = "editor.action.trimTrailingWhitespace";
pub const INSERT_FINAL_NEWLINE: &str = "editor.action.insertFinalNewline";
pub const FORMAT_DOCUMENT: &str = "editor.action.formatDocument";
pub const PIPE_PREFIX: &str = "pipe:";

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Strip spaces and tabs at the end of every line, keeping line endings.
pub fn trim_trailing_whitespace(text: &str) -> String {
    text.split('\n')
        .map(|line| match line.strip_suffix('\r') {
            Some(body) => format!("{}\r", body.trim_end_matches(&[' ', '\t'][..])),
            None => line.trim_end_matches(&[' ', '\t'][..]).to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Append a newline to non-empty text that lacks one.
pub fn insert_final_newline(text: &str) -> String {
    if text.is_empty() || text.ends_with('\n') {
        text.to_string()
    } else {
        format!("{text}\n")
    }
}

/// A text buffer backed by a file.
#[derive(Debug)]
pub struct FileDocument {
    path: PathBuf,
    relative: String,
    text: Mutex<String>,
    dirty: Mutex<bool>,
}

impl FileDocument {
    pub async fn load(path: &Path, relative: String) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            JanitorError::Document(format!("Cannot open {}: {e}", path.display()))
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            relative,
            text: Mutex::new(text),
            dirty: Mutex::new(false),
        })
    }

    /// Replace the buffer; only a real change marks it dirty.
    pub fn set_text(&self, text: String) {
        let mut current = lock(&self.text);
        if *current != text {
            *current = text;
            *lock(&self.dirty) = true;
        }
    }
}

#[async_trait]
impl Document for FileDocument {
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
        let text = self.text();
        tokio::fs::write(&self.path, text).await?;
        *lock(&self.dirty) = false;
        tracing::debug!("Saved {}", self.relative);
        Ok(())
    }
}

#[derive(Default)]
struct EditorState {
    documents: Vec<Arc<FileDocument>>,
    active: Option<PathBuf>,
}

impl EditorState {
    fn document(&self, path: &Path) -> Option<Arc<FileDocument>> {
        self.documents.iter().find(|d| d.path == path).cloned()
    }
}

/// Editor host over a workspace directory.
pub struct HeadlessEditor {
    root: PathBuf,
    prompter: TerminalPrompter,
    state: Mutex<EditorState>,
}

impl HeadlessEditor {
    pub fn new(root: impl Into<PathBuf>, prompter: TerminalPrompter) -> Self {
        Self {
            root: root.into(),
            prompter,
            state: Mutex::new(EditorState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, EditorState> {
        lock(&self.state)
    }

    fn active(&self) -> Result<Arc<FileDocument>> {
        let state = self.state();
        state
            .active
            .as_ref()
            .and_then(|path| state.document(path))
            .ok_or_else(|| JanitorError::Document("No active editor".to_string()))
    }

    async fn open(&self, path: &Path) -> Result<Arc<FileDocument>> {
        let existing = self.state().document(path);
        if let Some(document) = existing {
            return Ok(document);
        }
        let document = Arc::new(FileDocument::load(path, self.as_relative_path(path)).await?);

        let mut state = self.state();
        // Another caller may have opened it while the file was read.
        if let Some(existing) = state.document(path) {
            return Ok(existing);
        }
        state.documents.push(document.clone());
        Ok(document)
    }

    /// Run the buffer through `program args...` and take its stdout.
    async fn pipe(&self, command: &str, spec: &str) -> Result<()> {
        let document = self.active()?;
        let words = shell_words::split(spec)
            .map_err(|e| JanitorError::command(command, format!("cannot parse: {e}")))?;
        let file = document.path().display().to_string();
        let mut words = words.into_iter().map(|w| w.replace("{file}", &file));
        let program = words
            .next()
            .ok_or_else(|| JanitorError::command(command, "no program given"))?;

        let mut child = Command::new(&program)
            .args(words)
            .current_dir(&self.root)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| JanitorError::command(command, format!("cannot start {program}: {e}")))?;

        let text = document.text();
        let writer = child
            .stdin
            .take()
            .map(|mut stdin| tokio::spawn(async move { stdin.write_all(text.as_bytes()).await }));
        let output = child.wait_with_output().await?;
        let written = match writer {
            Some(writer) => writer
                .await
                .map_err(|e| JanitorError::command(command, e.to_string()))?,
            None => Ok(()),
        };
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(JanitorError::command(
                command,
                format!("{program} exited with {}: {}", output.status, stderr.trim()),
            ));
        }
        match written {
            // Programs handed `{file}` may exit without reading stdin.
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                tracing::debug!("{program} exited before reading the buffer");
            }
            written => written?,
        }

        document.set_text(String::from_utf8_lossy(&output.stdout).into_owned());
        Ok(())
    }

    fn transform(&self, transform: impl FnOnce(&str) -> String) -> Result<()> {
        let document = self.active()?;
        let text = transform(&document.text());
        document.set_text(text);
        Ok(())
    }
}

#[async_trait]
impl CommandEnv for HeadlessEditor {
    async fn execute(&self, command: &str) -> Result<()> {
        tracing::debug!("Executing {command}");
        match command {
            CLOSE_ALL_EDITORS | CLOSE_EDITORS_IN_GROUP => {
                let mut state = self.state();
                state.documents.clear();
                state.active = None;
                Ok(())
            }
            CLOSE_ACTIVE_EDITOR => {
                let mut state = self.state();
                if let Some(active) = state.active.take() {
                    state.documents.retain(|d| d.path != active);
                }
                Ok(())
            }
            TRIM_TRAILING_WHITESPACE => self.transform(trim_trailing_whitespace),
            INSERT_FINAL_NEWLINE => self.transform(insert_final_newline),
            FORMAT_DOCUMENT => {
                self.transform(|text| insert_final_newline(&trim_trailing_whitespace(text)))
            }
            _ => match command.strip_prefix(PIPE_PREFIX) {
                Some(spec) => self.pipe(command, spec).await,
                None => Err(JanitorError::command(command, "unknown command")),
            },
        }
    }
}

#[async_trait]
impl WorkspaceEnv for HeadlessEditor {
    fn root(&self) -> &Path {
        &self.root
    }

    async fn find_files(
        &self,
        include: &PatternSet,
        exclude: &PatternSet,
    ) -> Result<Vec<ProjectFile>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(false) {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = self.as_relative_path(entry.path());
            if include.matches(&relative) && !exclude.matches(&relative) {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    async fn open_document(&self, path: &Path) -> Result<DocumentRef> {
        let document: DocumentRef = self.open(path).await?;
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
impl WindowEnv for HeadlessEditor {
    async fn show_text_document(&self, document: &DocumentRef) -> Result<()> {
        let opened = self.open(document.path()).await?;
        self.state().active = Some(opened.path.clone());
        tracing::debug!("Showing {}", opened.relative);
        Ok(())
    }

    async fn show_input_box(&self, options: InputBoxOptions) -> Result<Option<String>> {
        self.prompter
            .prompt_text(&options.prompt, options.value.as_deref())
            .await
    }

    async fn show_quick_pick(&self, items: &[QuickPickItem]) -> Result<Option<usize>> {
        let labels: Vec<String> = items
            .iter()
            .map(|item| match &item.description {
                Some(description) => format!("{} ({description})", item.label),
                None => item.label.clone(),
            })
            .collect();
        self.prompter.prompt_choice("Choose an option:", &labels).await
    }

    async fn show_message(
        &self,
        level: MessageLevel,
        text: &str,
        buttons: &[&str],
    ) -> Result<Option<String>> {
        if buttons.is_empty() {
            match level {
                MessageLevel::Info => println!("{text}"),
                MessageLevel::Warning => eprintln!("warning: {text}"),
                MessageLevel::Error => eprintln!("error: {text}"),
            }
            return Ok(None);
        }

        let labels: Vec<String> = buttons.iter().map(|b| b.to_string()).collect();
        let choice = self.prompter.prompt_choice(text, &labels).await?;
        Ok(choice.map(|index| labels[index].clone()))
    }

    async fn show_modal_confirm(&self, text: &str, action: &str) -> Result<bool> {
        self.prompter
            .prompt_yes_no(&format!("{text} {action}?"))
            .await
    }
}
