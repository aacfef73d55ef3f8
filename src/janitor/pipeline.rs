//! Workflow stages and the executor that runs them in order

use async_trait::async_trait;
use std::fmt;

use super::rename::FileRename;
use super::JanitorCommand;
use crate::config::JanitorConfig;
use crate::env::ProjectFile;
use crate::promiser::{Flow, Outcome};

/// One named step of a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Confirm,
    RequireRules,
    CheckUnsaved,
    CloseEditors,
    EnumerateFiles,
    ProcessFiles,
    PlanRenames,
    ConfirmRenames,
    ApplyRenames,
    Report,
    CloseEditorsAgain,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Confirm => "confirm",
            Stage::RequireRules => "require-rules",
            Stage::CheckUnsaved => "check-unsaved",
            Stage::CloseEditors => "close-editors",
            Stage::EnumerateFiles => "enumerate-files",
            Stage::ProcessFiles => "process-files",
            Stage::PlanRenames => "plan-renames",
            Stage::ConfirmRenames => "confirm-renames",
            Stage::ApplyRenames => "apply-renames",
            Stage::Report => "report",
            Stage::CloseEditorsAgain => "close-editors-again",
        }
    }

    /// State entered when the stage proceeds.
    pub fn reached(&self) -> WorkflowState {
        match self {
            Stage::Confirm => WorkflowState::Confirmed,
            Stage::RequireRules => WorkflowState::RulesPresent,
            Stage::CheckUnsaved => WorkflowState::CheckedUnsaved,
            Stage::CloseEditors => WorkflowState::EditorsClosed,
            Stage::EnumerateFiles => WorkflowState::FilesEnumerated,
            Stage::ProcessFiles => WorkflowState::FilesProcessed,
            Stage::PlanRenames => WorkflowState::RenamesPlanned,
            Stage::ConfirmRenames => WorkflowState::RenamesConfirmed,
            Stage::ApplyRenames => WorkflowState::RenamesApplied,
            Stage::Report => WorkflowState::Reported,
            Stage::CloseEditorsAgain => WorkflowState::EditorsClosedAgain,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowState {
    Pending,
    Confirmed,
    Cancelled,
    RulesPresent,
    CheckedUnsaved,
    EditorsClosed,
    FilesEnumerated,
    FilesProcessed,
    RenamesPlanned,
    RenamesConfirmed,
    RenamesApplied,
    Reported,
    EditorsClosedAgain,
    Done,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every stage proceeded.
    Completed,
    /// The user declined a confirmation or the save prompt.
    Cancelled,
    /// There was nothing to act on.
    NothingToDo,
    /// A failure was reported through the error handler.
    Failed,
}

/// How a workflow run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub status: RunStatus,
    pub history: Vec<WorkflowState>,
    /// Files whose text changed and were saved.
    pub edited: usize,
    pub renames: Vec<FileRename>,
}

impl RunReport {
    pub fn new(status: RunStatus) -> Self {
        Self {
            status,
            history: vec![WorkflowState::Pending],
            edited: 0,
            renames: Vec::new(),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == RunStatus::Failed
    }

    /// The last state the run reached.
    pub fn final_state(&self) -> WorkflowState {
        self.history
            .last()
            .copied()
            .unwrap_or(WorkflowState::Pending)
    }
}

/// Mutable state threaded through the stages of one run.
#[derive(Debug)]
pub struct RunState {
    pub command: JanitorCommand,
    pub config: JanitorConfig,
    pub files: Vec<ProjectFile>,
    pub edited: usize,
    pub renames: Vec<FileRename>,
    history: Vec<WorkflowState>,
    skipped_at: Option<Stage>,
}

impl RunState {
    pub fn new(command: JanitorCommand, config: JanitorConfig) -> Self {
        Self {
            command,
            config,
            files: Vec::new(),
            edited: 0,
            renames: Vec::new(),
            history: vec![WorkflowState::Pending],
            skipped_at: None,
        }
    }

    pub fn history(&self) -> &[WorkflowState] {
        &self.history
    }

    /// The gate that ended the run, if one did.
    pub fn skipped_at(&self) -> Option<Stage> {
        self.skipped_at
    }

    fn enter(&mut self, state: WorkflowState) {
        tracing::debug!("Workflow state: {state:?}");
        self.history.push(state);
    }

    /// Close the run into a report. `failed` overrides the stage outcome.
    pub fn into_report(mut self, failed: bool) -> RunReport {
        let status = if failed {
            if self.history.last() != Some(&WorkflowState::Failed) {
                self.enter(WorkflowState::Failed);
            }
            RunStatus::Failed
        } else {
            match self.skipped_at {
                None => RunStatus::Completed,
                Some(Stage::RequireRules) => RunStatus::NothingToDo,
                Some(_) => RunStatus::Cancelled,
            }
        };
        RunReport {
            status,
            history: self.history,
            edited: self.edited,
            renames: self.renames,
        }
    }
}

/// Runs the work behind each stage.
#[async_trait]
pub trait StageRunner: Send + Sync {
    async fn run_stage(&self, stage: Stage, state: &mut RunState) -> Outcome<()>;
}

/// An ordered list of stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    pub fn clean_up_project(config: &JanitorConfig) -> Self {
        let mut stages = vec![
            Stage::Confirm,
            Stage::CheckUnsaved,
            Stage::CloseEditors,
            Stage::EnumerateFiles,
            Stage::ProcessFiles,
            Stage::Report,
        ];
        if config.close_after_cleanup {
            stages.push(Stage::CloseEditorsAgain);
        }
        Self::new(stages)
    }

    pub fn validate_file_names() -> Self {
        Self::new(vec![
            Stage::RequireRules,
            Stage::CheckUnsaved,
            Stage::CloseEditors,
            Stage::EnumerateFiles,
            Stage::PlanRenames,
            Stage::ConfirmRenames,
            Stage::ApplyRenames,
            Stage::Report,
        ])
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Run every stage in order.
    ///
    /// A skipped stage ends the run in `Cancelled` and a failing stage in
    /// `Failed`; no later stage runs in either case.
    pub async fn execute(&self, runner: &dyn StageRunner, state: &mut RunState) -> Outcome<()> {
        for stage in &self.stages {
            tracing::debug!("Running stage {stage}");
            match runner.run_stage(*stage, state).await {
                Ok(Flow::Proceed(())) => state.enter(stage.reached()),
                Ok(Flow::Skipped) => {
                    tracing::debug!("Stage {stage} skipped the rest of the run");
                    state.skipped_at = Some(*stage);
                    state.enter(WorkflowState::Cancelled);
                    return Ok(Flow::Skipped);
                }
                Err(error) => {
                    state.enter(WorkflowState::Failed);
                    return Err(error);
                }
            }
        }
        state.enter(WorkflowState::Done);
        Ok(Flow::Proceed(()))
    }
}
