//! Undo/redo history that stays valid under concurrent remote edits
//!
//! Both stacks hold *inverse* operations: popping the undo stack yields the
//! operation that reverts the latest local edit. While an undo is being
//! performed, whatever the caller [`add`](UndoManager::add)s lands on the
//! redo stack (and vice versa), so undoing an undo is a redo.
//!
//! Remote operations are folded in with [`transform`](UndoManager::transform)
//! so queued entries always apply to the current document.

use crate::error::{Result, SyncError};
use crate::ot::{OperationMeta, OperationMetadata, WrappedOperation};
use std::collections::VecDeque;

/// Default number of entries kept per stack
pub const DEFAULT_MAX_DEPTH: usize = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UndoMode {
    #[default]
    Idle,
    Undoing,
    Redoing,
}

/// Bounded undo and redo stacks of wrapped inverse operations
#[derive(Debug, Clone)]
pub struct UndoManager<M = OperationMeta> {
    max_depth: usize,
    mode: UndoMode,
    /// Cleared after an undo pushes a redo entry: the next local edit must
    /// not be folded into an entry it did not produce.
    compose_allowed: bool,
    undo_stack: VecDeque<WrappedOperation<M>>,
    redo_stack: VecDeque<WrappedOperation<M>>,
}

impl<M: OperationMetadata> UndoManager<M> {
    /// Create a manager keeping at most `max_depth` entries per stack
    pub fn new(max_depth: usize) -> Result<Self> {
        if max_depth == 0 {
            return Err(SyncError::InvalidArgument(
                "max undo depth must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            max_depth,
            mode: UndoMode::Idle,
            compose_allowed: true,
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
        })
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn mode(&self) -> UndoMode {
        self.mode
    }

    /// Record `operation`.
    ///
    /// When idle, `compose` folds it into the newest undo entry instead of
    /// pushing a new one (one undo step per typing gesture).
    pub fn add(&mut self, operation: WrappedOperation<M>, compose: bool) -> Result<()> {
        match self.mode {
            UndoMode::Undoing => {
                push_bounded(&mut self.redo_stack, operation, self.max_depth);
                self.compose_allowed = false;
            }
            UndoMode::Redoing => {
                push_bounded(&mut self.undo_stack, operation, self.max_depth);
                self.compose_allowed = true;
            }
            UndoMode::Idle => {
                let composed = match self.undo_stack.back() {
                    Some(top) if self.compose_allowed && compose => {
                        // The new inverse runs first, then the older one
                        Some(operation.compose(top)?)
                    }
                    _ => None,
                };

                match composed {
                    Some(composed) => {
                        self.undo_stack.pop_back();
                        self.undo_stack.push_back(composed);
                    }
                    None => push_bounded(&mut self.undo_stack, operation, self.max_depth),
                }

                self.compose_allowed = true;
                self.redo_stack.clear();
            }
        }

        Ok(())
    }

    /// Newest undo entry
    pub fn last(&self) -> Option<&WrappedOperation<M>> {
        self.undo_stack.back()
    }

    /// Rebase both stacks over a remote `operation`.
    ///
    /// Stacks are walked from the newest entry down, each entry passing the
    /// transformed remote operation on to the next older one. Entries that
    /// become no-ops are dropped.
    pub fn transform(&mut self, operation: &WrappedOperation<M>) -> Result<()> {
        let undo_stack = transform_stack(&self.undo_stack, operation)?;
        let redo_stack = transform_stack(&self.redo_stack, operation)?;

        self.undo_stack = undo_stack;
        self.redo_stack = redo_stack;
        Ok(())
    }

    /// Pop the newest undo entry and hand it to `callback` in undoing mode.
    ///
    /// Returns `Ok(None)` when there is nothing to undo.
    pub fn perform_undo<R, F>(&mut self, callback: F) -> Result<Option<R>>
    where
        F: FnOnce(&mut Self, WrappedOperation<M>) -> Result<R>,
    {
        let Some(operation) = self.undo_stack.pop_back() else {
            return Ok(None);
        };

        tracing::debug!("undo: {}", operation);
        self.run(UndoMode::Undoing, operation, callback).map(Some)
    }

    /// Pop the newest redo entry and hand it to `callback` in redoing mode
    pub fn perform_redo<R, F>(&mut self, callback: F) -> Result<Option<R>>
    where
        F: FnOnce(&mut Self, WrappedOperation<M>) -> Result<R>,
    {
        let Some(operation) = self.redo_stack.pop_back() else {
            return Ok(None);
        };

        tracing::debug!("redo: {}", operation);
        self.run(UndoMode::Redoing, operation, callback).map(Some)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn is_undoing(&self) -> bool {
        self.mode == UndoMode::Undoing
    }

    pub fn is_redoing(&self) -> bool {
        self.mode == UndoMode::Redoing
    }

    pub fn is_idle(&self) -> bool {
        self.mode == UndoMode::Idle
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Forget all history. The manager stays usable.
    pub fn dispose(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.mode = UndoMode::Idle;
        self.compose_allowed = true;
    }

    fn run<R, F>(&mut self, mode: UndoMode, operation: WrappedOperation<M>, callback: F) -> Result<R>
    where
        F: FnOnce(&mut Self, WrappedOperation<M>) -> Result<R>,
    {
        self.mode = mode;
        let result = callback(self, operation);
        self.mode = UndoMode::Idle;
        result
    }
}

impl Default for UndoManager<OperationMeta> {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            mode: UndoMode::Idle,
            compose_allowed: true,
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
        }
    }
}

fn push_bounded<M>(stack: &mut VecDeque<WrappedOperation<M>>, operation: WrappedOperation<M>, max: usize) {
    stack.push_back(operation);
    while stack.len() > max {
        stack.pop_front();
    }
}

fn transform_stack<M: OperationMetadata>(
    stack: &VecDeque<WrappedOperation<M>>,
    operation: &WrappedOperation<M>,
) -> Result<VecDeque<WrappedOperation<M>>> {
    let mut transformed = VecDeque::with_capacity(stack.len());
    let mut remote = operation.clone();

    for entry in stack.iter().rev() {
        let (entry, next) = entry.transform(&remote)?;
        if !entry.is_noop() {
            transformed.push_front(entry);
        }
        remote = next;
    }

    Ok(transformed)
}
