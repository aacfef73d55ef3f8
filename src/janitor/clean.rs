use std::path::Path;

use super::diff::LineDiff;
use super::ProjectJanitor;
use crate::config::JanitorConfig;
use crate::env::{DocumentRef, MessageLevel, QuickPickItem};
use crate::error::Result;
use crate::promiser::{for_each, if_any, only_if, Deferred, Flow, Outcome};

const SAVE_PROMPT: &str = "Save all your files before running clean up.";
const SAVE_ALL: &str = "Save all";
const CANCEL: &str = "Cancel";

impl ProjectJanitor {
    pub(super) async fn clean_up_file(&self, config: &JanitorConfig, file: &Path) -> Result<bool> {
        self.logger
            .trace(&format!("Cleaning up {}", file.display()));
        let document = self.host.workspace.open_document(file).await?;
        self.clean_up_document(config, document).await
    }

    /// Run the applicable commands on `document` and save it if they changed it.
    ///
    /// Returns whether the document was edited.
    pub(super) async fn clean_up_document(
        &self,
        config: &JanitorConfig,
        document: DocumentRef,
    ) -> Result<bool> {
        let baseline = document.text();
        self.host.window.show_text_document(&document).await?;

        let commands = config.commands_for(document.relative_path());
        for_each(commands, |command| self.host.commands.execute(command)).await?;

        let text = document.text();
        if !document.is_dirty() || text == baseline {
            return Ok(false);
        }

        self.logger
            .info(&format!(" - {}", document.relative_path()));
        let (added, removed) = if config.show_diff {
            let diff = LineDiff::compute(&baseline, &text);
            for line in &diff.lines {
                self.logger.info(&format!("   {line}"));
            }
            (diff.added(), diff.removed())
        } else {
            LineDiff::count(&baseline, &text)
        };
        self.logger
            .debug(&format!("   {added} lines added, {removed} lines removed"));

        document.save().await?;
        Ok(true)
    }

    /// Reveal every dirty document, then ask to save them all.
    ///
    /// Skips when there are unsaved documents and the user does not save.
    pub(super) async fn check_for_unsaved_work(&self) -> Outcome<()> {
        let documents = self.host.workspace.text_documents();
        let window = self.host.window.as_ref();

        let needs_save = if_any(documents, |document| {
            Deferred::lazy(move || async move {
                if !document.is_dirty() {
                    return Ok(false);
                }
                window.show_text_document(&document).await?;
                Ok(true)
            })
        })
        .await?;

        if !needs_save {
            return Ok(Flow::Proceed(()));
        }
        only_if(Deferred::future(self.prompt_save())).await
    }

    async fn prompt_save(&self) -> Result<bool> {
        let answer = self
            .host
            .window
            .show_message(MessageLevel::Error, SAVE_PROMPT, &[SAVE_ALL, CANCEL])
            .await?;

        if answer.as_deref() == Some(SAVE_ALL) {
            self.host.workspace.save_all().await?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Gate on an explicit "Continue" unless confirmation is skipped.
    pub(super) async fn confirm(&self, skip_confirmation: bool, message: &str) -> Outcome<()> {
        if skip_confirmation {
            return Ok(Flow::Proceed(()));
        }

        let items = [
            QuickPickItem::new("Continue", Some(message)),
            QuickPickItem::new(CANCEL, None),
        ];
        let window = self.host.window.as_ref();
        only_if(Deferred::future(async move {
            let choice = window.show_quick_pick(&items).await?;
            Ok(choice == Some(0))
        }))
        .await
    }
}
