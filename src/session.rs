use std::collections::BTreeSet;

use crate::dialogs::{DialogFallback, DialogResponder};
use crate::document::{LineId, SubtitleDocument, SubtitleLine};
use crate::environment::Environment;
use crate::project::Project;
use crate::selection::{Selection, SelectionError};

// @module: Session context of one headless run

/// Everything a macro can see and change during a run
pub struct Session<'env> {
    // @field: Shared collaborators
    env: &'env Environment,

    // @field: The loaded document, mutated in place
    document: SubtitleDocument,

    // @field: Video, timecodes and keyframes
    project: Project,

    // @field: Active line and selection
    selection: Selection,

    // @field: Prompt answers
    dialogs: DialogResponder,
}

impl<'env> Session<'env> {
    pub fn new(
        env: &'env Environment,
        document: SubtitleDocument,
        project: Project,
        selection: Selection,
        dialogs: DialogResponder,
    ) -> Self {
        Self {
            env,
            document,
            project,
            selection,
            dialogs,
        }
    }

    /// The environment outlives the session, so the reference is handed out
    /// with its own lifetime and does not borrow the session.
    pub fn env(&self) -> &'env Environment {
        self.env
    }

    pub fn document(&self) -> &SubtitleDocument {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut SubtitleDocument {
        &mut self.document
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
    }

    /// Replace the selection; every id must belong to the document
    pub fn set_selection_and_active(
        &mut self,
        selected: BTreeSet<LineId>,
        active: LineId,
    ) -> Result<(), SelectionError> {
        self.selection = Selection::new(&self.document, active, selected)?;
        Ok(())
    }

    pub fn active_line(&self) -> Option<&SubtitleLine> {
        self.document.get(self.selection.active())
    }

    /// Selected lines in document order
    pub fn selected_lines(&self) -> Vec<&SubtitleLine> {
        self.document
            .lines()
            .iter()
            .filter(|line| self.selection.contains(line.id))
            .collect()
    }

    pub fn dialogs(&self) -> &DialogResponder {
        &self.dialogs
    }

    pub fn dialogs_mut(&mut self) -> &mut DialogResponder {
        &mut self.dialogs
    }

    /// Consume the session, keeping what the run reports on
    pub fn finish(self) -> (SubtitleDocument, Vec<DialogFallback>) {
        (self.document, self.dialogs.into_fallbacks())
    }
}
