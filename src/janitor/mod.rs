//! The Project Janitor workflows
//!
//! Three actions are exposed as [`JanitorCommand`]s:
//! - clean up the active document
//! - clean up every project file matching the include/exclude patterns
//! - validate file names against the configured rename rules
//!
//! Project workflows run as a [`Pipeline`] of stages. A stage either proceeds,
//! skips the rest of the run (the user declined, or there is nothing to do),
//! or fails. Every failure, including one raised while loading settings, goes
//! to [`ProjectJanitor::on_error`] exactly once.

use async_trait::async_trait;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

mod actions;
mod clean;
pub mod diff;
pub mod pipeline;
pub mod rename;


pub use diff::{DiffLine, LineDiff};
pub use pipeline::{Pipeline, RunReport, RunState, RunStatus, Stage, StageRunner, WorkflowState};
pub use rename::{compare_paths, plan_renames, FileRename};

use crate::config::{JanitorConfig, Settings};
use crate::env::{HostEnv, MessageLevel, CLOSE_ALL_EDITORS, CLOSE_EDITORS_IN_GROUP};
use crate::error::{JanitorError, Result};
use crate::files::{FileController, FileSpec};
use crate::logging::{Logger, DIAGNOSTIC_TARGET};
use crate::promiser::{attempt, for_all, for_each, Attempt, Deferred, Flow, Outcome};
use crate::proceed;

/// Name of the output channel and logger.
pub const EXTENSION_NAME: &str = "Project Janitor";

/// Prefix of every command id.
pub const COMMAND_PREFIX: &str = "janitor";

/// An invokable workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JanitorCommand {
    CleanUpActiveDocument,
    CleanUpProject,
    ValidateFileNames,
}

impl JanitorCommand {
    pub const ALL: [JanitorCommand; 3] = [
        JanitorCommand::CleanUpActiveDocument,
        JanitorCommand::CleanUpProject,
        JanitorCommand::ValidateFileNames,
    ];

    fn method(&self) -> &'static str {
        match self {
            JanitorCommand::CleanUpActiveDocument => "cleanUpActiveDocument",
            JanitorCommand::CleanUpProject => "cleanUpProject",
            JanitorCommand::ValidateFileNames => "validateFileNames",
        }
    }

    /// Host command id, e.g. `janitor.cleanUpProject`.
    pub fn id(&self) -> String {
        format!("{COMMAND_PREFIX}.{}", self.method())
    }
}

impl fmt::Display for JanitorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{COMMAND_PREFIX}.{}", self.method())
    }
}

impl FromStr for JanitorCommand {
    type Err = JanitorError;

    /// Accepts the full id or the bare method name.
    fn from_str(s: &str) -> Result<Self> {
        let method = s
            .strip_prefix(COMMAND_PREFIX)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(s);
        Self::ALL
            .into_iter()
            .find(|command| command.method() == method)
            .ok_or_else(|| JanitorError::Config(format!("Unknown command '{s}'")))
    }
}

/// Runs the janitor workflows against a host.
///
/// Settings are read anew at the start of every run.
pub struct ProjectJanitor {
    host: HostEnv,
    settings: Arc<dyn Settings>,
    logger: Logger,
    files: FileController,
}

impl ProjectJanitor {
    pub fn new(host: HostEnv, settings: Arc<dyn Settings>) -> Self {
        let logger = Logger::new(EXTENSION_NAME, host.output.clone());
        Self::with_logger(host, settings, logger)
    }

    pub fn with_logger(host: HostEnv, settings: Arc<dyn Settings>, logger: Logger) -> Self {
        let files = FileController::new(host.clone());
        Self {
            host,
            settings,
            logger,
            files,
        }
    }

    pub fn host(&self) -> &HostEnv {
        &self.host
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub async fn invoke(&self, command: JanitorCommand) -> RunReport {
        tracing::info!("Invoking {command}");
        match command {
            JanitorCommand::CleanUpActiveDocument => self.clean_up_active_document().await,
            JanitorCommand::CleanUpProject => self.clean_up_project().await,
            JanitorCommand::ValidateFileNames => self.validate_file_names().await,
        }
    }

    /// Open `path` and make it the active document.
    pub async fn focus(&self, path: &Path) -> Result<()> {
        self.files
            .open_file_in_editor(&FileSpec::new(path))
            .await?
            .ok_or_else(|| JanitorError::File(format!("{} is a directory", path.display())))?;
        Ok(())
    }

    pub async fn clean_up_active_document(&self) -> RunReport {
        let Some(document) = self.host.workspace.active_document() else {
            self.logger.info("No active document.");
            let mut report = RunReport::new(RunStatus::NothingToDo);
            report.history.push(WorkflowState::Done);
            return report;
        };

        let outcome = attempt(
            move || {
                let config = self.load_config()?;
                Ok(Deferred::future(async move {
                    self.clean_up_document(&config, document).await
                }))
            },
            |error| self.on_error(error),
        )
        .await;

        match outcome {
            Attempt::Completed(edited) => {
                let mut report = RunReport::new(RunStatus::Completed);
                report.edited = usize::from(edited);
                report.history.push(WorkflowState::FilesProcessed);
                report.history.push(WorkflowState::Done);
                report
            }
            Attempt::Handled | Attempt::Thrown => {
                let mut report = RunReport::new(RunStatus::Failed);
                report.history.push(WorkflowState::Failed);
                report
            }
        }
    }

    pub async fn clean_up_project(&self) -> RunReport {
        self.run_pipeline(JanitorCommand::CleanUpProject, Pipeline::clean_up_project)
            .await
    }

    pub async fn validate_file_names(&self) -> RunReport {
        self.run_pipeline(JanitorCommand::ValidateFileNames, |_| {
            Pipeline::validate_file_names()
        })
        .await
    }

    fn load_config(&self) -> Result<JanitorConfig> {
        JanitorConfig::from_settings(self.settings.as_ref())
    }

    async fn run_pipeline<B>(&self, command: JanitorCommand, build: B) -> RunReport
    where
        B: FnOnce(&JanitorConfig) -> Pipeline,
    {
        let mut slot: Option<RunState> = None;
        let outcome = {
            let slot = &mut slot;
            attempt(
                move || {
                    let slot = slot;
                    let config = self.load_config()?;
                    let pipeline = build(&config);
                    let state = slot.insert(RunState::new(command, config));
                    Ok(Deferred::future(async move {
                        pipeline.execute(self, state).await
                    }))
                },
                |error| self.on_error(error),
            )
            .await
        };

        match slot {
            Some(state) => state.into_report(outcome.is_failed()),
            None => {
                let mut report = RunReport::new(RunStatus::Failed);
                report.history.push(WorkflowState::Failed);
                report
            }
        }
    }

    /// Report a failure on the output channel and in one error dialog.
    ///
    /// A failure without a value is only traced. Nothing here can fail the
    /// caller: a dialog that cannot be shown is traced instead.
    pub async fn on_error(&self, error: JanitorError) {
        if let JanitorError::Undefined = error {
            tracing::error!(target: DIAGNOSTIC_TARGET, "{error}");
            return;
        }

        let message = error.to_string();
        self.logger.error(&message);
        if error.is_recognized() {
            tracing::debug!("{error:?}");
        }

        if let Err(e) = self
            .host
            .window
            .show_message(MessageLevel::Error, &message, &[])
            .await
        {
            tracing::error!(target: DIAGNOSTIC_TARGET, "Failed to report '{message}': {e}");
        }
    }

    async fn apply_renames(&self, renames: &[FileRename]) -> Result<()> {
        let root = self.host.workspace.root();
        let fs = self.host.fs.as_ref();

        for_all(renames, |rename| async move {
            self.logger
                .info(&format!("Renaming {} to {}", rename.from, rename.to));
            let mut file = FileSpec::with_target(root.join(&rename.from), root.join(&rename.to));
            file.move_file(fs).await
        })
        .await?;
        Ok(())
    }
}

#[async_trait]
impl StageRunner for ProjectJanitor {
    async fn run_stage(&self, stage: Stage, state: &mut RunState) -> Outcome<()> {
        match stage {
            Stage::Confirm => {
                self.confirm(
                    state.config.skip_confirmation,
                    "Make sure you've backed up your code first.",
                )
                .await
            }
            Stage::RequireRules => {
                if state.config.rename_rules.is_empty() {
                    self.logger.warn("No rules configured");
                    self.host
                        .window
                        .show_message(MessageLevel::Error, "No rules configured", &[])
                        .await?;
                    return Ok(Flow::Skipped);
                }
                Ok(Flow::Proceed(()))
            }
            Stage::CheckUnsaved => self.check_for_unsaved_work().await,
            Stage::CloseEditors => {
                self.host.commands.execute(CLOSE_ALL_EDITORS).await?;
                Ok(Flow::Proceed(()))
            }
            Stage::EnumerateFiles => {
                match state.command {
                    JanitorCommand::ValidateFileNames => self.logger.info("Validating file names..."),
                    _ => self.logger.info("Cleaning up project..."),
                }
                let found = self
                    .host
                    .workspace
                    .find_files(&state.config.include, &state.config.exclude)
                    .await?;
                let mut files: Vec<_> = found
                    .into_iter()
                    .map(|file| (self.host.workspace.as_relative_path(&file), file))
                    .collect();
                files.sort_by(|(a, _), (b, _)| compare_paths(a, b));
                state.files = files.into_iter().map(|(_, file)| file).collect();
                Ok(Flow::Proceed(()))
            }
            Stage::ProcessFiles => {
                self.logger
                    .info(&format!("Cleaning up {} files:", state.files.len()));
                let config = &state.config;
                let edited = for_each(state.files.iter(), |file| {
                    self.clean_up_file(config, file)
                })
                .await?;
                state.edited = edited.into_iter().filter(|edited| *edited).count();
                Ok(Flow::Proceed(()))
            }
            Stage::PlanRenames => {
                self.logger
                    .info(&format!("Validating {} file names:", state.files.len()));
                let paths: Vec<String> = state
                    .files
                    .iter()
                    .map(|file| self.host.workspace.as_relative_path(file))
                    .collect();
                state.renames =
                    plan_renames(paths.iter().map(String::as_str), &state.config.rename_rules);
                for rename in &state.renames {
                    self.logger.info(&format!(" - {rename}"));
                }
                Ok(Flow::Proceed(()))
            }
            Stage::ConfirmRenames => {
                if state.renames.is_empty() {
                    self.logger.info("All file names are valid.");
                    return Ok(Flow::Proceed(()));
                }
                let message = format!("Rename {} files", state.renames.len());
                proceed!(self.confirm(state.config.skip_confirmation, &message).await);
                Ok(Flow::Proceed(()))
            }
            Stage::ApplyRenames => {
                self.apply_renames(&state.renames).await?;
                Ok(Flow::Proceed(()))
            }
            Stage::Report => {
                match state.command {
                    JanitorCommand::ValidateFileNames => self.logger.info("Done."),
                    _ => self
                        .logger
                        .info(&format!("Modified {} files.", state.edited)),
                }
                Ok(Flow::Proceed(()))
            }
            Stage::CloseEditorsAgain => {
                self.host.commands.execute(CLOSE_EDITORS_IN_GROUP).await?;
                Ok(Flow::Proceed(()))
            }
        }
    }
}
