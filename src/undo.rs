//! Undo/redo history of completed rename runs.
//!
//! Each completed run becomes an [`UndoAction`]. Undoing replays the inverse
//! of its successes through the orchestrator; redoing replays the inverse of
//! the undo. Entries that failed originally are never part of the inverse, so
//! a replay only touches objects that actually moved.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::rename::{Orchestrator, RenameResults};

/// Whether the history currently has something to undo or redo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryState {
    pub can_undo: bool,
    pub can_redo: bool,
}

/// One reversible rename run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UndoAction {
    results: RenameResults,
}

impl UndoAction {
    pub fn new(results: RenameResults) -> Self {
        Self { results }
    }

    /// Outcome of the most recent execution (original run, undo or redo).
    pub fn results(&self) -> &RenameResults {
        &self.results
    }

    pub fn has_successes(&self) -> bool {
        !self.results.successes.is_empty()
    }

    /// Revert every success of the last execution.
    pub async fn undo(&mut self, orchestrator: &Orchestrator, cancel: &CancellationToken) -> &RenameResults {
        self.replay(orchestrator, cancel, "undo").await
    }

    /// Re-apply what the last undo reverted.
    pub async fn redo(&mut self, orchestrator: &Orchestrator, cancel: &CancellationToken) -> &RenameResults {
        self.replay(orchestrator, cancel, "redo").await
    }

    async fn replay(
        &mut self,
        orchestrator: &Orchestrator,
        cancel: &CancellationToken,
        what: &str,
    ) -> &RenameResults {
        let inverse = self.results.inverse_entries();
        let two_pass =
            self.results.used_two_pass || orchestrator.check(&inverse).requires_two_pass();
        debug!(what, entries = inverse.len(), two_pass, "replaying inverse rename");
        self.results = orchestrator.run(inverse, two_pass, cancel).await;
        &self.results
    }
}

type Observer = Box<dyn Fn(HistoryState) + Send + Sync>;

/// Two LIFO stacks of [`UndoAction`]s.
#[derive(Default)]
pub struct UndoStack {
    undo: Vec<UndoAction>,
    redo: Vec<UndoAction>,
    observer: Option<Observer>,
}

impl std::fmt::Debug for UndoStack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoStack")
            .field("undo", &self.undo.len())
            .field("redo", &self.redo.len())
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl UndoStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get told whenever `can_undo` / `can_redo` may have changed.
    pub fn set_observer(&mut self, observer: impl Fn(HistoryState) + Send + Sync + 'static) {
        self.observer = Some(Box::new(observer));
    }

    /// Record a fresh action; any redo history is discarded.
    pub fn push(&mut self, action: UndoAction) {
        self.undo.push(action);
        self.redo.clear();
        self.notify();
    }

    pub fn push_to_redo(&mut self, action: UndoAction) {
        self.redo.push(action);
        self.notify();
    }

    /// Put a redone action back on the undo stack, keeping the redo history.
    pub fn restore(&mut self, action: UndoAction) {
        self.undo.push(action);
        self.notify();
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn state(&self) -> HistoryState {
        HistoryState {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
        }
    }

    /// Pop and undo the newest action. The caller decides where it goes next.
    pub async fn undo(
        &mut self,
        orchestrator: &Orchestrator,
        cancel: &CancellationToken,
    ) -> Option<UndoAction> {
        let mut action = self.undo.pop()?;
        self.notify();
        action.undo(orchestrator, cancel).await;
        Some(action)
    }

    /// Pop and redo the newest undone action. The caller decides where it goes next.
    pub async fn redo(
        &mut self,
        orchestrator: &Orchestrator,
        cancel: &CancellationToken,
    ) -> Option<UndoAction> {
        let mut action = self.redo.pop()?;
        self.notify();
        action.redo(orchestrator, cancel).await;
        Some(action)
    }

    /// Undo, then keep the action redoable if anything was reverted.
    pub async fn undo_and_track(
        &mut self,
        orchestrator: &Orchestrator,
        cancel: &CancellationToken,
    ) -> Option<RenameResults> {
        let action = self.undo(orchestrator, cancel).await?;
        let results = action.results().clone();
        info!(
            reverted = results.success_count(),
            failed = results.failure_count(),
            "undo finished"
        );
        if action.has_successes() {
            self.push_to_redo(action);
        }
        Some(results)
    }

    /// Redo, then keep the action undoable if anything was re-applied.
    pub async fn redo_and_track(
        &mut self,
        orchestrator: &Orchestrator,
        cancel: &CancellationToken,
    ) -> Option<RenameResults> {
        let action = self.redo(orchestrator, cancel).await?;
        let results = action.results().clone();
        info!(
            reapplied = results.success_count(),
            failed = results.failure_count(),
            "redo finished"
        );
        if action.has_successes() {
            self.restore(action);
        }
        Some(results)
    }

    fn notify(&self) {
        if let Some(observer) = &self.observer {
            observer(self.state());
        }
    }
}
