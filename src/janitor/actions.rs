use std::future::Future;
use std::path::{Path, PathBuf};

use super::{FileRename, ProjectJanitor, RunReport, RunStatus, WorkflowState};
use crate::files::{MoveFileDialogOptions, NewFileDialogOptions};
use crate::promiser::{attempt, Attempt, Deferred, Flow, Outcome};
use crate::proceed;

impl ProjectJanitor {
    /// Run a file action under the error handler.
    async fn run_action<F, Fut>(&self, name: &str, action: F) -> RunReport
    where
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Outcome<Vec<FileRename>>> + Send,
    {
        tracing::debug!("Running file action {name}");
        let outcome = attempt(|| Ok(Deferred::lazy(action)), |error| self.on_error(error)).await;

        match outcome {
            Attempt::Completed(Flow::Proceed(renames)) => {
                let mut report = RunReport::new(RunStatus::Completed);
                report.renames = renames;
                report.history.push(WorkflowState::Done);
                report
            }
            Attempt::Completed(Flow::Skipped) => {
                let mut report = RunReport::new(RunStatus::Cancelled);
                report.history.push(WorkflowState::Cancelled);
                report
            }
            Attempt::Handled | Attempt::Thrown => {
                let mut report = RunReport::new(RunStatus::Failed);
                report.history.push(WorkflowState::Failed);
                report
            }
        }
    }

    fn relative(&self, path: &Path) -> String {
        self.host.workspace.as_relative_path(path)
    }

    fn is_active(&self, path: &Path) -> bool {
        self.host
            .workspace
            .active_document()
            .map_or(false, |document| document.path() == path)
    }

    /// Make `path` the active document, reporting a failure like any action.
    pub async fn open(&self, path: &Path) -> RunReport {
        self.run_action("open", || async move {
            self.focus(path).await?;
            Ok(Flow::Proceed(Vec::new()))
        })
        .await
    }

    /// Ask for a new location for `path` (or the active document) and move it there.
    pub async fn move_file(&self, path: Option<PathBuf>) -> RunReport {
        self.run_action("move", || async move {
            let options = MoveFileDialogOptions {
                prompt: "New location".to_string(),
                show_full_path: false,
                path,
            };
            let mut file = proceed!(self.files.show_move_file_dialog(options).await);
            let source = file.src_path.clone();
            let was_active = self.is_active(&source);

            proceed!(self.files.move_file(&mut file).await);
            let rename = FileRename::new(self.relative(&source), self.relative(&file.src_path));
            self.logger.info(&format!("Moved {rename}"));

            if was_active {
                self.files.close_current_file_editor().await?;
            }
            self.files.open_file_in_editor(&file).await?;
            Ok(Flow::Proceed(vec![rename]))
        })
        .await
    }

    /// Ask for a name and copy `path` (or the active document) to it.
    pub async fn duplicate_file(&self, path: Option<PathBuf>) -> RunReport {
        self.run_action("duplicate", || async move {
            let options = MoveFileDialogOptions {
                prompt: "Duplicate as".to_string(),
                show_full_path: false,
                path,
            };
            let file = proceed!(self.files.show_move_file_dialog(options).await);
            let copy = proceed!(self.files.duplicate(&file).await);
            self.logger.info(&format!(
                "Duplicated {} as {}",
                self.relative(&file.src_path),
                self.relative(&copy.src_path)
            ));

            self.files.open_file_in_editor(&copy).await?;
            Ok(Flow::Proceed(Vec::new()))
        })
        .await
    }

    /// Ask to delete the active document and remove it.
    pub async fn remove_file(&self) -> RunReport {
        self.run_action("remove", || async move {
            let file = proceed!(self.files.show_remove_file_dialog().await);
            self.files.remove(&file).await?;
            self.logger
                .info(&format!("Removed {}", self.relative(&file.src_path)));

            self.files.close_current_file_editor().await?;
            Ok(Flow::Proceed(Vec::new()))
        })
        .await
    }

    /// Ask for a name and create a file, or a directory when the name ends with `/`.
    ///
    /// Names resolve against the active document's directory unless
    /// `relative_to_root` is set or nothing is open.
    pub async fn new_file(&self, relative_to_root: bool) -> RunReport {
        self.run_action("new", || async move {
            let options = NewFileDialogOptions {
                prompt: "File or folder name (end a folder with /)".to_string(),
                relative_to_root,
            };
            let file = proceed!(self.files.show_new_file_dialog(options).await);
            let is_dir = file
                .target()?
                .to_string_lossy()
                .ends_with(&['/', '\\'][..]);

            let created = proceed!(self.files.create(&file, is_dir).await);
            self.logger
                .info(&format!("Created {}", self.relative(&created.src_path)));

            if !is_dir {
                self.files.open_file_in_editor(&created).await?;
            }
            Ok(Flow::Proceed(Vec::new()))
        })
        .await
    }
}
