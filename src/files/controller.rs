use std::path::{Path, PathBuf};

use super::spec::FileSpec;
use crate::env::{DocumentRef, HostEnv, InputBoxOptions, CLOSE_ACTIVE_EDITOR};
use crate::error::{JanitorError, Result};
use crate::promiser::{Flow, Outcome};
use crate::proceed;

#[derive(Debug, Clone, Default)]
pub struct MoveFileDialogOptions {
    pub prompt: String,
    /// Prefill the full source path instead of its file name.
    pub show_full_path: bool,
    /// Source path; the active document when `None`.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct NewFileDialogOptions {
    pub prompt: String,
    /// Resolve against the workspace root instead of the active document's directory.
    pub relative_to_root: bool,
}

/// Character range of the file name in `value`, excluding its extension.
///
/// Names without an extension, and dot files like `.editorconfig`, select
/// the whole file name.
pub fn filename_selection(value: &str) -> (usize, usize) {
    let basename = value.rsplit(&['/', '\\'][..]).next().unwrap_or(value);
    let len = value.chars().count();
    let start = len - basename.chars().count();

    match basename.rfind('.') {
        Some(dot) if dot > 0 => (start, start + basename[..dot].chars().count()),
        _ => (start, len),
    }
}

/// Dialog-driven file operations.
///
/// Dialog methods return `Flow::Skipped` when the user dismisses or declines.
/// A dialog that needs the active document fails with
/// [`JanitorError::Undefined`] when there is none.
#[derive(Clone)]
pub struct FileController {
    host: HostEnv,
}

impl FileController {
    pub fn new(host: HostEnv) -> Self {
        Self { host }
    }

    fn active_path(&self) -> Option<PathBuf> {
        self.host
            .workspace
            .active_document()
            .map(|document| document.path().to_path_buf())
    }

    pub async fn show_move_file_dialog(&self, options: MoveFileDialogOptions) -> Outcome<FileSpec> {
        let source = options
            .path
            .or_else(|| self.active_path())
            .ok_or(JanitorError::Undefined)?;

        let value = if options.show_full_path {
            source.display().to_string()
        } else {
            file_name(&source)
        };
        let selection = filename_selection(&value);

        let input = self
            .host
            .window
            .show_input_box(InputBoxOptions {
                prompt: options.prompt,
                value: Some(value),
                value_selection: Some(selection),
            })
            .await?;

        Ok(match input.filter(|target| !target.is_empty()) {
            Some(target) => {
                let target = parent_dir(&source).join(target);
                Flow::Proceed(FileSpec::with_target(source, target))
            }
            None => Flow::Skipped,
        })
    }

    pub async fn show_new_file_dialog(&self, options: NewFileDialogOptions) -> Outcome<FileSpec> {
        let base = match self.active_path() {
            Some(active) if !options.relative_to_root => parent_dir(&active),
            _ => self.host.workspace.root().to_path_buf(),
        };

        let input = self
            .host
            .window
            .show_input_box(InputBoxOptions {
                prompt: options.prompt,
                ..Default::default()
            })
            .await?;

        Ok(match input.filter(|target| !target.is_empty()) {
            Some(target) => {
                let target = base.join(target);
                Flow::Proceed(FileSpec::with_target(base, target))
            }
            None => Flow::Skipped,
        })
    }

    pub async fn show_remove_file_dialog(&self) -> Outcome<FileSpec> {
        let source = self.active_path().ok_or(JanitorError::Undefined)?;
        let message = format!(
            "Are you sure you want to delete '{}'?",
            file_name(&source)
        );

        let confirmed = self
            .host
            .window
            .show_modal_confirm(&message, "Delete")
            .await?;
        Ok(if confirmed {
            Flow::Proceed(FileSpec::new(source))
        } else {
            Flow::Skipped
        })
    }

    pub async fn move_file(&self, file: &mut FileSpec) -> Outcome<()> {
        proceed!(self.ensure_writable_file(file).await);
        file.move_file(self.host.fs.as_ref()).await?;
        Ok(Flow::Proceed(()))
    }

    pub async fn duplicate(&self, file: &FileSpec) -> Outcome<FileSpec> {
        proceed!(self.ensure_writable_file(file).await);
        let copy = file.duplicate(self.host.fs.as_ref()).await?;
        Ok(Flow::Proceed(copy))
    }

    pub async fn remove(&self, file: &FileSpec) -> Result<()> {
        file.remove(self.host.fs.as_ref()).await.map_err(|e| {
            tracing::debug!("Remove failed: {e}");
            JanitorError::Raw(format!(
                "Error deleting file '{}'.",
                file.src_path.display()
            ))
        })
    }

    pub async fn create(&self, file: &FileSpec, is_dir: bool) -> Outcome<FileSpec> {
        proceed!(self.ensure_writable_file(file).await);
        let created = file
            .create(self.host.fs.as_ref(), is_dir)
            .await
            .map_err(|e| {
                tracing::debug!("Create failed: {e}");
                let target = file.target_path.as_deref().unwrap_or(&file.src_path);
                JanitorError::Raw(format!("Error creating file '{}'.", target.display()))
            })?;
        Ok(Flow::Proceed(created))
    }

    /// Open and reveal the source file; directories are not opened.
    pub async fn open_file_in_editor(&self, file: &FileSpec) -> Result<Option<DocumentRef>> {
        if self.host.fs.is_dir(&file.src_path) {
            return Ok(None);
        }
        let document = self.host.workspace.open_document(&file.src_path).await?;
        self.host.window.show_text_document(&document).await?;
        Ok(Some(document))
    }

    pub async fn close_current_file_editor(&self) -> Result<()> {
        self.host.commands.execute(CLOSE_ACTIVE_EDITOR).await
    }

    /// Ask before overwriting an existing target; declining skips.
    pub async fn ensure_writable_file(&self, file: &FileSpec) -> Outcome<()> {
        if !file.exists(self.host.fs.as_ref()) {
            return Ok(Flow::Proceed(()));
        }

        let target = file.target()?;
        let message = format!("File '{}' already exists.", target.display());
        let overwrite = self
            .host
            .window
            .show_modal_confirm(&message, "Overwrite")
            .await?;
        Ok(if overwrite {
            Flow::Proceed(())
        } else {
            Flow::Skipped
        })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{MockChannel, MockEditor};

    fn controller() -> (FileController, MockEditor) {
        let editor = MockEditor::new();
        let host = HostEnv::mock(&editor, &MockChannel::new());
        (FileController::new(host), editor)
    }

    #[test]
    fn test_filename_selection() {
        assert_eq!(filename_selection("index.ts"), (0, 5));
        assert_eq!(filename_selection("/ws/src/index.spec.ts"), (8, 18));
        assert_eq!(filename_selection("Makefile"), (0, 8));
        assert_eq!(filename_selection(".editorconfig"), (0, 13));
        assert_eq!(filename_selection("src/.env"), (4, 8));
    }

    #[tokio::test]
    async fn test_move_dialog_resolves_against_source_directory() {
        let (controller, editor) = controller();
        editor.add_file("src/a.ts", "");
        editor.activate("src/a.ts").unwrap();
        editor.answer_input(Some("b.ts"));

        let spec = controller
            .show_move_file_dialog(MoveFileDialogOptions {
                prompt: "Move to".into(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(
            spec,
            Flow::Proceed(FileSpec::with_target(
                editor.path("src/a.ts"),
                editor.path("src/b.ts")
            ))
        );
        assert_eq!(editor.dialogs(), vec!["input:Move to"]);
    }

    #[tokio::test]
    async fn test_dismissed_dialog_skips() {
        let (controller, editor) = controller();
        editor.add_file("a.ts", "");
        editor.activate("a.ts").unwrap();
        editor.answer_input(None);

        let outcome = controller
            .show_move_file_dialog(MoveFileDialogOptions::default())
            .await
            .unwrap();
        assert!(outcome.is_skipped());
    }

    #[tokio::test]
    async fn test_dialogs_without_active_document_are_undefined() {
        let (controller, _editor) = controller();
        assert!(matches!(
            controller.show_remove_file_dialog().await,
            Err(JanitorError::Undefined)
        ));
        assert!(matches!(
            controller
                .show_move_file_dialog(MoveFileDialogOptions::default())
                .await,
            Err(JanitorError::Undefined)
        ));
    }

    #[tokio::test]
    async fn test_remove_dialog_asks_for_confirmation() {
        let (controller, editor) = controller();
        editor.add_file("src/old.ts", "");
        editor.activate("src/old.ts").unwrap();
        editor.answer_confirm(true);

        let spec = controller.show_remove_file_dialog().await.unwrap();
        assert_eq!(spec, Flow::Proceed(FileSpec::new(editor.path("src/old.ts"))));
        assert_eq!(
            editor.dialogs_of("modal"),
            vec!["Are you sure you want to delete 'old.ts'?"]
        );
    }

    #[tokio::test]
    async fn test_new_file_dialog_uses_root_without_active_document() {
        let (controller, editor) = controller();
        editor.answer_input(Some("docs/readme.md"));

        let spec = controller
            .show_new_file_dialog(NewFileDialogOptions::default())
            .await
            .unwrap();
        assert_eq!(
            spec,
            Flow::Proceed(FileSpec::with_target(
                editor.path(""),
                editor.path("docs/readme.md")
            ))
        );
    }

    #[tokio::test]
    async fn test_declining_overwrite_skips_move() {
        let (controller, editor) = controller();
        editor.add_file("a.ts", "a");
        editor.add_file("b.ts", "b");
        editor.answer_confirm(false);

        let mut spec = FileSpec::with_target(editor.path("a.ts"), editor.path("b.ts"));
        let outcome = controller.move_file(&mut spec).await.unwrap();

        assert!(outcome.is_skipped());
        assert_eq!(editor.file("b.ts"), Some("b".to_string()));
        assert_eq!(editor.dialogs_of("modal"), vec![format!(
            "File '{}' already exists.",
            editor.path("b.ts").display()
        )]);
    }

    #[tokio::test]
    async fn test_remove_failure_is_reported_as_raw_message() {
        let (controller, editor) = controller();
        editor.add_file("locked.ts", "");
        editor.fail_path("locked.ts");

        let err = controller
            .remove(&FileSpec::new(editor.path("locked.ts")))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Error: Error deleting file '{}'.", editor.path("locked.ts").display())
        );
    }

    #[tokio::test]
    async fn test_open_file_in_editor_skips_directories() {
        let (controller, editor) = controller();
        editor.add_file("src/a.ts", "");

        let opened = controller
            .open_file_in_editor(&FileSpec::new(editor.path("src")))
            .await
            .unwrap();
        assert!(opened.is_none());

        let opened = controller
            .open_file_in_editor(&FileSpec::new(editor.path("src/a.ts")))
            .await
            .unwrap();
        assert!(opened.is_some());
        assert_eq!(editor.events(), vec!["open:src/a.ts", "show:src/a.ts"]);
    }
}
